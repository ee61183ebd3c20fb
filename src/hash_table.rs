//! # Hash Table
//!
//! Maps context hashes to small per-context payloads (counters, recent
//! positions). The table is a flat arena of buckets; a bucket holds
//! BUCKET_SLOTS entries, each tagged with a 16 bit checksum.
//!
//! Given a 64 bit hash h of the context, the low bits select a bucket and
//! the top 16 bits are the checksum. When a context is looked up, the
//! checksum is compared with every entry of the bucket, and if there is
//! no match an empty entry is claimed or, in a full bucket, the entry
//! with the lowest priority is cleared and the new checksum is stored.
//! Different contexts therefore collide on buckets all the time but are
//! only confused when both the bucket and the checksum agree.

use std::mem::size_of;

/// Entries per bucket.
pub const BUCKET_SLOTS: usize = 4;

/// Bits of the hash used for the checksum.
const CHECKSUM_SHIFT: u32 = 48;

/// A payload stored in a HashTable.
pub trait Slot: Copy {
    /// Replacement priority. The lowest priority entry of a full bucket
    /// is evicted first.
    fn priority(&self) -> u64;
}

#[derive(Clone, Copy)]
struct Bucket<T> {
    checks:  [Option<u16>; BUCKET_SLOTS],
    slots:   [T; BUCKET_SLOTS],
}
impl<T: Slot> Bucket<T> {
    fn new(seed: T) -> Bucket<T> {
        Bucket {
            checks: [None; BUCKET_SLOTS],
            slots:  [seed; BUCKET_SLOTS],
        }
    }

    fn find(&self, chksum: u16) -> Option<usize> {
        self.checks.iter().position(|&c| c == Some(chksum))
    }

    /// Index of the entry to replace: the first empty entry if there is
    /// one, otherwise the lowest priority entry.
    fn victim(&self) -> (usize, bool) {
        if let Some(i) = self.checks.iter().position(|c| c.is_none()) {
            return (i, false);
        }
        let mut i = 0;
        for j in 1..BUCKET_SLOTS {
            if self.slots[j].priority() < self.slots[i].priority() {
                i = j;
            }
        }
        (i, true)
    }
}

pub struct HashTable<T> {
    buckets:    Vec<Bucket<T>>, // Arena of buckets
    mask:       usize,          // Bucket count - 1
    seed:       T,              // Payload of a newly claimed entry
    evictions:  u64,            // Occupied entries replaced so far
}
impl<T: Slot> HashTable<T> {
    /// Create a new HashTable using at most `bytes` bytes of buckets.
    /// The bucket count is the largest power of two that fits.
    pub fn new(bytes: usize, seed: T) -> HashTable<T> {
        let bucket_size = size_of::<Bucket<T>>();
        assert!(bytes >= bucket_size, "hash table needs room for at least one bucket");
        let count = bytes / bucket_size;
        let count = 1 << (usize::BITS - 1 - count.leading_zeros());
        HashTable::with_buckets(count, seed)
    }

    /// Create a new HashTable with exactly `count` buckets.
    pub fn with_buckets(count: usize, seed: T) -> HashTable<T> {
        assert!(count.is_power_of_two());
        HashTable {
            buckets:    vec![Bucket::new(seed); count],
            mask:       count - 1,
            seed,
            evictions:  0,
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    fn locate(&self, hash: u64) -> (usize, u16) {
        ((hash as usize) & self.mask, (hash >> CHECKSUM_SHIFT) as u16)
    }

    /// Find the payload stored for `hash` without claiming an entry.
    pub fn lookup(&self, hash: u64) -> Option<&T> {
        let (i, chksum) = self.locate(hash);
        let bucket = &self.buckets[i];
        bucket.find(chksum).map(|j| &bucket.slots[j])
    }

    /// Find the payload stored for `hash`, claiming (and seeding) an
    /// entry if the context is not present.
    pub fn touch(&mut self, hash: u64) -> &mut T {
        let (i, chksum) = self.locate(hash);
        let seed = self.seed;
        let bucket = &mut self.buckets[i];

        let j = match bucket.find(chksum) {
            Some(j) => j,
            None => {
                let (j, evicted) = bucket.victim();
                if evicted { self.evictions += 1; }
                bucket.checks[j] = Some(chksum);
                bucket.slots[j]  = seed;
                j
            }
        };
        &mut bucket.slots[j]
    }

    /// Forget every stored context.
    pub fn clear(&mut self) {
        let seed = self.seed;
        for bucket in self.buckets.iter_mut() {
            *bucket = Bucket::new(seed);
        }
        self.evictions = 0;
    }
}

/// Number of positions kept per context.
pub const POSITIONS: usize = 3;

/// The most recent positions at which a context was seen, newest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecentPositions {
    pos:  [u32; POSITIONS],
    len:  u8,
}
impl RecentPositions {
    /// Insert pos at the front, discarding the oldest position when full.
    pub fn add(&mut self, pos: u32) {
        self.pos.copy_within(0..POSITIONS - 1, 1);
        self.pos[0] = pos;
        if (self.len as usize) < POSITIONS { self.len += 1; }
    }

    pub fn latest(&self) -> Option<u32> {
        self.iter().next()
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stored positions, newest first.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.pos[..self.len as usize].iter().copied()
    }
}
impl Slot for RecentPositions {
    /// Recently touched contexts are kept longer.
    fn priority(&self) -> u64 {
        self.latest().map_or(0, |p| u64::from(p) + 1)
    }
}

/// Bijective mixing of a raw context value, spreading nearby contexts
/// over both the bucket bits and the checksum bits.
pub fn finalize(mut h: u64) -> u64 {
    h = h.wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_right(29);
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^ (h >> 32)
}

/// Combine a context hash with a further value (an order, a partial
/// byte) into a new hash.
pub fn combine(h: u64, x: u64) -> u64 {
    finalize(h.wrapping_add(x.wrapping_mul(0xD6E8_FEB8_6659_FD93)))
}
