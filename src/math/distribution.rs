// Copyright @yucwang 2026

use super::constants::Float;

/// Discrete distribution over `n` weighted entries, sampled by inverting
/// the cumulative sum.
#[derive(Debug, Clone)]
pub struct Distribution1D {
    pmf: Vec<Float>,
    cdf: Vec<Float>,
}

impl Distribution1D {
    /// Falls back to uniform weights when the weights do not sum to a
    /// positive finite value.
    pub fn new(weights: &[Float]) -> Self {
        let n = weights.len();
        if n == 0 {
            return Self { pmf: Vec::new(), cdf: vec![0.0] };
        }

        let sanitized: Vec<Float> = weights
            .iter()
            .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
            .collect();
        let total: Float = sanitized.iter().sum();
        let pmf: Vec<Float> = if total > 0.0 && total.is_finite() {
            sanitized.iter().map(|w| w / total).collect()
        } else {
            vec![1.0 / n as Float; n]
        };

        let mut cdf = Vec::with_capacity(n + 1);
        cdf.push(0.0);
        let mut acc = 0.0;
        for p in &pmf {
            acc += p;
            cdf.push(acc);
        }
        cdf[n] = 1.0;

        Self { pmf, cdf }
    }

    pub fn len(&self) -> usize {
        self.pmf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pmf.is_empty()
    }

    pub fn pmf(&self, index: usize) -> Float {
        self.pmf.get(index).copied().unwrap_or(0.0)
    }

    /// Returns the chosen index and its probability. Entries of zero
    /// probability are never chosen.
    pub fn sample(&self, u: Float) -> Option<(usize, Float)> {
        if self.pmf.is_empty() {
            return None;
        }

        let n = self.pmf.len();
        // First cdf entry strictly above u, minus one.
        let upper = self.cdf.partition_point(|c| *c <= u);
        let mut index = upper.saturating_sub(1).min(n - 1);
        while self.pmf[index] == 0.0 && index + 1 < n {
            index += 1;
        }
        while self.pmf[index] == 0.0 && index > 0 {
            index -= 1;
        }

        Some((index, self.pmf[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_follows_weights() {
        let dist = Distribution1D::new(&[1.0, 0.0, 3.0]);
        assert_eq!(dist.sample(0.1), Some((0, 0.25)));
        assert_eq!(dist.sample(0.3), Some((2, 0.75)));
        assert_eq!(dist.sample(0.99999), Some((2, 0.75)));
        assert_eq!(dist.pmf(1), 0.0);
    }

    #[test]
    fn test_degenerate_weights_become_uniform() {
        let dist = Distribution1D::new(&[0.0, 0.0]);
        assert_eq!(dist.pmf(0), 0.5);
        assert_eq!(dist.pmf(1), 0.5);
        assert!(Distribution1D::new(&[]).sample(0.5).is_none());
    }
}
