//! Random streams for trials

/// Source of uniform draws in `[0, 1)`.
///
/// The pull engine only ever asks for uniform floats, so tests can script
/// exact outcomes by feeding fixed values.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// Fast RNG wrapper for better performance
#[derive(Clone)]
pub struct FastRng {
    inner: fastrand::Rng,
}

impl FastRng {
    #[inline(always)]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: fastrand::Rng::with_seed(seed),
        }
    }
}

impl RandomSource for FastRng {
    #[inline(always)]
    fn next_f64(&mut self) -> f64 {
        self.inner.f64()
    }
}

/// Which of the two trials in a pair a stream belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Budgeted,
    Unbounded,
}

/// Private seed for trial `index` of a batch.
///
/// SplitMix64 finalizer over (base, index, stream) so neighbouring indices and
/// the two streams of a pair never share a state.
pub fn trial_seed(base: u64, index: u64, stream: Stream) -> u64 {
    let salt = match stream {
        Stream::Budgeted => 0x243f_6a88_85a3_08d3,
        Stream::Unbounded => 0x1319_8a2e_0370_7344,
    };
    let mut z = base
        .wrapping_add(index.wrapping_mul(0x9e37_79b9_7f4a_7c15))
        .wrapping_add(salt);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Replays a fixed list of draws, then repeats the last one
#[cfg(test)]
pub struct ScriptedRng {
    values: Vec<f64>,
    pos: usize,
}

#[cfg(test)]
impl ScriptedRng {
    pub fn new(values: &[f64]) -> Self {
        assert!(!values.is_empty());
        Self {
            values: values.to_vec(),
            pos: 0,
        }
    }

    /// Number of draws consumed so far
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRng {
    fn next_f64(&mut self) -> f64 {
        let idx = self.pos.min(self.values.len() - 1);
        self.pos += 1;
        self.values[idx]
    }
}
