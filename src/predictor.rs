use crate::{
    apm::{Apm, InterpolatedApm},
    config::Config,
    constant::{PROB_MAX, PROB_MIN},
    context::BitContext,
    error::Result,
    mixer::Mixer,
};

/// Number of inputs a model adds to the mixer and the sizes of the
/// context sets it selects, in the order it selects them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MixerShape {
    pub inputs:  usize,
    pub sets:    Vec<usize>,
}

/// A source of predictions. For every bit, predict() is called once
/// before the bit is coded and update() once after, with the same
/// BitContext both times.
pub trait Model {
    fn shape(&self) -> MixerShape;

    /// Add inputs to the mixer and select its contexts.
    fn predict(&mut self, cx: &BitContext, mxr: &mut Mixer);

    /// Learn the bit that was just coded.
    fn update(&mut self, cx: &BitContext, bit: u8);

    /// Hash table entries replaced so far.
    fn evictions(&self) -> u64 {
        0
    }
}

/// Two models run one after the other, a before b in both phases.
impl<A: Model, B: Model> Model for (A, B) {
    fn shape(&self) -> MixerShape {
        let (a, b) = (self.0.shape(), self.1.shape());
        MixerShape {
            inputs:  a.inputs + b.inputs,
            sets:    a.sets.into_iter().chain(b.sets).collect(),
        }
    }

    fn predict(&mut self, cx: &BitContext, mxr: &mut Mixer) {
        self.0.predict(cx, mxr);
        self.1.predict(cx, mxr);
    }

    fn update(&mut self, cx: &BitContext, bit: u8) {
        self.0.update(cx, bit);
        self.1.update(cx, bit);
    }

    fn evictions(&self) -> u64 {
        self.0.evictions() + self.1.evictions()
    }
}

// Predictor -------------------------------------------------------------------------------------------------------------------- Predictor

/// Drives one bit at a time through model, mixer and both APM stages.
/// p() runs the prediction phase; update() runs the update phase over the
/// same components in the same order and then advances the context.
pub struct Predictor<M> {
    cx:       BitContext,      // Position in the stream
    model:    M,               // Supplies mixer inputs and contexts
    mxr:      Mixer,           // For weighted averaging of independent predictions
    apm1:     Apm,             // Refines mixer output by partial byte
    apm2:     InterpolatedApm, // Refines mixer output by partial and previous byte
    pr:       u16,             // Final prediction
    pending:  bool,            // A prediction awaits its update
}
impl<M: Model> Predictor<M> {
    pub fn new(model: M, cfg: &Config) -> Result<Predictor<M>> {
        cfg.validate()?;
        let shape = model.shape();
        Ok(Predictor {
            cx:       BitContext::new(),
            mxr:      Mixer::new(shape.inputs, &shape.sets, cfg.mixer, cfg.final_mixer),
            apm1:     Apm::new(256, cfg.apm_limit),
            apm2:     InterpolatedApm::new(1 << 16, cfg.apm_rate),
            pr:       2048,
            pending:  false,
            model,
        })
    }

    /// Probability (1..=4095) that the next bit is a 1.
    pub fn p(&mut self) -> u16 {
        debug_assert!(!self.pending, "p() called twice for one bit");
        self.model.predict(&self.cx, &mut self.mxr);

        // Mix
        let pr = self.mxr.p() as u16;

        // 2 SSE stages
        let pr1 = self.apm1.refine(pr, self.cx.c0);
        let pr2 = self.apm2.p(pr, self.cx.c0 | u32::from(self.cx.c1()) << 8);
        let pr = (u32::from(pr) + u32::from(pr1) + 2 * u32::from(pr2) + 2) >> 2;

        self.pr = (pr as u16).clamp(PROB_MIN, PROB_MAX);
        self.pending = true;
        self.pr
    }

    /// Update every component with the coded bit.
    pub fn update(&mut self, bit: u8) {
        debug_assert!(self.pending, "update() called without a prediction");
        debug_assert!(bit == 0 || bit == 1);
        self.model.update(&self.cx, bit);
        self.mxr.update(bit);
        self.apm1.update(bit);
        self.apm2.update(bit);
        self.cx.update(bit);
        self.pending = false;
    }

    pub fn context(&self) -> &BitContext {
        &self.cx
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}
// ----------------------------------------------------------------------------------------------------------------------------------------
