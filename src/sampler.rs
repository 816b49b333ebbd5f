use rand::{thread_rng, Rng};

/// Decides whether a random event falls within a probability threshold.
pub trait Sampler {
    /// Returns `true` with probability `threshold`.
    ///
    /// Thresholds `>= 1` always sample in; thresholds `<= 0` never do.
    fn sample_random(&self, threshold: f32) -> bool;
}

/// [`Sampler`] backed by the thread-local random number generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSampler;

impl Sampler for DefaultSampler {
    fn sample_random(&self, threshold: f32) -> bool {
        if threshold >= 1.0 {
            return true;
        }
        if threshold <= 0.0 {
            return false;
        }
        thread_rng().gen::<f32>() < threshold
    }
}

impl<T: Fn(f32) -> bool> Sampler for T {
    fn sample_random(&self, threshold: f32) -> bool {
        self(threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultSampler, Sampler};

    #[test]
    fn non_positive_threshold_never_samples() {
        for threshold in [0.0, -0.5, -1.0, f32::MIN] {
            assert!((0..100).all(|_| !DefaultSampler.sample_random(threshold)));
        }
    }

    #[test]
    fn threshold_of_one_or_more_always_samples() {
        for threshold in [1.0, 1.5, f32::MAX] {
            assert!((0..100).all(|_| DefaultSampler.sample_random(threshold)));
        }
    }

    #[test]
    fn sampling_rate_converges_to_threshold() {
        let draws = 100_000;
        let hits = (0..draws)
            .filter(|_| DefaultSampler.sample_random(0.5))
            .count();

        let rate = hits as f64 / draws as f64;
        assert!((rate - 0.5).abs() < 0.02, "observed rate {rate}");
    }

    #[test]
    fn closures_are_samplers() {
        let always = |_threshold: f32| true;
        assert!(always.sample_random(0.0));
    }
}
