//! Open-addressing integer map used on the anti-replay hot path.

/// Slot key marking an empty cell.
const EMPTY_KEY: u32 = u32::MAX;

/// Minimal open-addressing hash table mapping 32-bit keys to 64-bit values.
///
/// Power-of-two sized with linear probing. This structure exists to keep the
/// anti-replay timestamp lookup free of general-purpose map overhead.
///
/// The valid key domain excludes [`u32::MAX`], which is reserved as the
/// empty-slot sentinel. Callers guarantee this by constructing composite keys
/// from bounded non-negative components.
#[derive(Clone, Debug)]
pub struct IntMap {
    keys: Vec<u32>,
    values: Vec<u64>,
    mask: usize,
    size: usize,
    resize_at: usize,
    load_factor: f32,
}

impl IntMap {
    /// Creates a map with at least `capacity` slots.
    ///
    /// Capacity is rounded up to the next power of two. The map grows by
    /// doubling and a full rehash once occupancy crosses
    /// `capacity * load_factor`.
    ///
    /// # Panics
    ///
    /// Panics if `load_factor` is outside `(0, 1)`.
    pub fn new(capacity: usize, load_factor: f32) -> Self {
        assert!(
            load_factor > 0.0 && load_factor < 1.0,
            "load factor must be between 0 and 1"
        );
        let cap = capacity.max(2).next_power_of_two();
        Self {
            keys: vec![EMPTY_KEY; cap],
            values: vec![0; cap],
            mask: cap - 1,
            size: 0,
            resize_at: (cap as f32 * load_factor) as usize,
            load_factor,
        }
    }

    /// Returns the value stored under `key`, or `default` when absent.
    pub fn get_or_default(&self, key: u32, default: u64) -> u64 {
        let mut idx = Self::mix(key) as usize & self.mask;
        loop {
            let k = self.keys[idx];
            if k == EMPTY_KEY {
                return default;
            }
            if k == key {
                return self.values[idx];
            }
            idx = (idx + 1) & self.mask;
        }
    }

    /// Inserts or overwrites the value stored under `key`.
    pub fn put(&mut self, key: u32, value: u64) {
        let mut idx = Self::mix(key) as usize & self.mask;
        loop {
            let k = self.keys[idx];
            if k == EMPTY_KEY {
                self.keys[idx] = key;
                self.values[idx] = value;
                self.size += 1;
                if self.size >= self.resize_at {
                    self.rehash(self.keys.len() << 1);
                }
                return;
            }
            if k == key {
                self.values[idx] = value;
                return;
            }
            idx = (idx + 1) & self.mask;
        }
    }

    /// Number of occupied slots.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the map has no entries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn rehash(&mut self, new_capacity: usize) {
        let cap = new_capacity.next_power_of_two();
        let old_keys = std::mem::replace(&mut self.keys, vec![EMPTY_KEY; cap]);
        let old_values = std::mem::replace(&mut self.values, vec![0; cap]);

        self.mask = cap - 1;
        self.resize_at = (cap as f32 * self.load_factor) as usize;
        self.size = 0;

        for (key, value) in old_keys.into_iter().zip(old_values) {
            if key != EMPTY_KEY {
                self.put(key, value);
            }
        }
    }

    #[inline(always)]
    fn mix(key: u32) -> u32 {
        let h = key.wrapping_mul(0x9E37_79B9);
        h ^ (h >> 16)
    }
}

///////////////////////////////////////////////////////////////////////////////
//                                  Tests                                    //
///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_put_basics() {
        let mut map = IntMap::new(16, 0.75);

        assert_eq!(map.get_or_default(7, u64::MAX), u64::MAX);

        map.put(7, 42);
        assert_eq!(map.get_or_default(7, 0), 42);
        assert_eq!(map.len(), 1);

        map.put(7, 43);
        assert_eq!(map.get_or_default(7, 0), 43);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn grows_past_load_factor() {
        let mut map = IntMap::new(2, 0.5);

        for key in 0..1000u32 {
            map.put(key, u64::from(key) * 3);
        }

        assert_eq!(map.len(), 1000);
        for key in 0..1000u32 {
            assert_eq!(map.get_or_default(key, u64::MAX), u64::from(key) * 3);
        }
    }

    #[test]
    fn colliding_keys_probe_linearly() {
        let mut map = IntMap::new(4, 0.9);

        // Keys that collide modulo a small capacity still resolve.
        map.put(1, 10);
        map.put(5, 50);
        map.put(9, 90);

        assert_eq!(map.get_or_default(1, 0), 10);
        assert_eq!(map.get_or_default(5, 0), 50);
        assert_eq!(map.get_or_default(9, 0), 90);
    }

    #[test]
    #[should_panic(expected = "load factor")]
    fn rejects_zero_load_factor() {
        IntMap::new(16, 0.0);
    }

    #[test]
    #[should_panic(expected = "load factor")]
    fn rejects_full_load_factor() {
        IntMap::new(16, 1.0);
    }
}
