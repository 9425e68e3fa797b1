// Copyright @yucwang 2026

use crate::core::error::ConfigError;
use crate::math::constants::Float;
use crate::math::spectrum::RGBSpectrum;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RussianRouletteMethod {
    /// Constant continuation probability.
    Fixed(Float),
    /// `luminance(metric) / delta`.
    Proportional(Float),
}

impl RussianRouletteMethod {
    /// Parses `fixed` or `proportional`. `parameter` is the probability or
    /// the delta respectively.
    pub fn parse(key: &str, name: &str, parameter: Float) -> Result<Self, ConfigError> {
        match name {
            "fixed" => {
                if !(0.0..=1.0).contains(&parameter) {
                    return Err(ConfigError::invalid(key, &parameter.to_string(), "probability must lie in [0, 1]"));
                }
                Ok(RussianRouletteMethod::Fixed(parameter))
            }
            "proportional" => {
                if !(parameter > 0.0 && parameter.is_finite()) {
                    return Err(ConfigError::invalid(key, &parameter.to_string(), "delta must be positive"));
                }
                Ok(RussianRouletteMethod::Proportional(parameter))
            }
            _ => Err(ConfigError::unknown(key, name)),
        }
    }
}

/// Stateless termination policy of the path tracer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RussianRouletteState {
    start_index: usize,
    method: RussianRouletteMethod,
    max_probability: Float,
}

impl Default for RussianRouletteState {
    fn default() -> Self {
        Self { start_index: 3, method: RussianRouletteMethod::Proportional(1.0), max_probability: 0.95 }
    }
}

impl RussianRouletteState {
    pub fn new(start_index: usize,
               method: RussianRouletteMethod,
               max_probability: Float) -> Result<Self, ConfigError> {
        if !(max_probability > 0.0 && max_probability <= 1.0) {
            return Err(ConfigError::invalid("integrator.rr_max_probability",
                                            &max_probability.to_string(),
                                            "must lie in (0, 1]"));
        }
        Ok(Self { start_index, method, max_probability })
    }

    /// A policy that never terminates a path.
    pub fn disabled() -> Self {
        Self { start_index: usize::MAX, method: RussianRouletteMethod::Fixed(1.0), max_probability: 1.0 }
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn method(&self) -> RussianRouletteMethod {
        self.method
    }

    /// Probability in `[0, 1]` of tracing edge `edge_index`. Callers treat 0
    /// as termination and never divide by it.
    pub fn continue_probability(&self, edge_index: usize, metric: &RGBSpectrum) -> Float {
        if edge_index < self.start_index {
            return 1.0;
        }

        let p = match self.method {
            RussianRouletteMethod::Fixed(p) => p,
            RussianRouletteMethod::Proportional(delta) => {
                let ratio = metric.luminance() / delta;
                if ratio.is_nan() {
                    0.0
                } else {
                    ratio.min(self.max_probability)
                }
            }
        };

        if p.is_nan() {
            0.0
        } else {
            p.clamp(0.0, 1.0)
        }
    }
}
