use crate::{
    config::Config,
    context::BitContext,
    counter::Counter,
    error::Result,
    hash_table::{combine, finalize, HashTable},
    logistic::stretch,
    mixer::Mixer,
    predictor::{MixerShape, Model},
};

/// Payload of a context seen for the first time: one observation of
/// each bit value, an even estimate.
const SEED: Counter = Counter::new(1, 1);

/// Mixer input that is always present, letting each row learn a bias.
const BIAS: i32 = 256;

/// Predicts from the bit counts of order-n contexts, one hashed lookup
/// per order and bit. Contexts are the last n whole bytes plus the bits
/// seen so far of the current byte.
pub struct ContextModel {
    orders:  Vec<u8>,            // Context orders
    hist:    u64,                // Last 8 whole bytes
    cxts:    Vec<u64>,           // Hash of each order's byte context
    slots:   Vec<u64>,           // Hash of each order's bit context this bit
    ht:      HashTable<Counter>, // Bit counts of every context
    limit:   u32,                // Counter halving limit
}
impl ContextModel {
    pub fn new(cfg: &Config) -> Result<ContextModel> {
        cfg.validate()?;
        let mut cm = ContextModel {
            orders:  cfg.orders.clone(),
            hist:    0,
            cxts:    vec![0; cfg.orders.len()],
            slots:   vec![0; cfg.orders.len()],
            ht:      HashTable::new(cfg.table_bytes(), SEED),
            limit:   cfg.counter_limit,
        };
        cm.update_cxts();
        Ok(cm)
    }

    // Hash the last n bytes for every order n.
    fn update_cxts(&mut self) {
        for (cxt, &order) in self.cxts.iter_mut().zip(self.orders.iter()) {
            let mask = u64::MAX >> (64 - 8 * u32::from(order));
            *cxt = combine(finalize(self.hist & mask), u64::from(order));
        }
    }
}
impl Model for ContextModel {
    fn shape(&self) -> MixerShape {
        MixerShape {
            inputs:  2 * self.orders.len() + 1,
            sets:    vec![self.orders.len() + 1, 256],
        }
    }

    fn predict(&mut self, cx: &BitContext, mxr: &mut Mixer) {
        let mut known = 0;
        for (slot, &cxt) in self.slots.iter_mut().zip(self.cxts.iter()) {
            *slot = combine(cxt, u64::from(cx.c0));

            // Contexts without evidence are not created until update
            let p = match self.ht.lookup(*slot) {
                Some(counter) => {
                    known += 1;
                    i32::from(counter.p())
                }
                None => 2048,
            };
            mxr.add(stretch(p));
            mxr.add((p - 2048) >> 2);
        }
        mxr.add(BIAS);

        mxr.set(known, self.orders.len() + 1);
        mxr.set(cx.c0, 256);
    }

    fn update(&mut self, cx: &BitContext, bit: u8) {
        for &slot in self.slots.iter() {
            self.ht.touch(slot).update_limited(bit, self.limit);
        }

        if cx.bits == 7 { // Last bit of a byte
            let byte = ((cx.c0 << 1) | u32::from(bit)) & 0xFF;
            self.hist = (self.hist << 8) | u64::from(byte);
            self.update_cxts();
        }
    }

    fn evictions(&self) -> u64 {
        self.ht.evictions()
    }
}
