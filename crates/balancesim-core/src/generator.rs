//! Synthetic load-sequence generation.
//!
//! Samples request load values from one of a small set of statistical
//! distributions. The random source is always passed in explicitly, so a
//! seeded [`ChaCha8Rng`] reproduces the same sequence on every machine.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, LogNormal, Normal, Uniform};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("Invalid {distribution} parameters: {reason}")]
    InvalidParameters {
        distribution: &'static str,
        reason: String,
    },
    #[error("Unknown distribution: {0}")]
    UnknownDistribution(String),
}

/// Distribution a load sequence is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadDistribution {
    Normal { mean: f64, std: f64 },
    /// Parameters are those of the underlying normal distribution.
    LogNormal { mu: f64, sigma: f64 },
    Exponential { scale: f64 },
    Uniform { low: f64, high: f64 },
}

impl LoadDistribution {
    /// Distribution of the given kind with its default parameters.
    pub fn from_name(kind: &str) -> Result<Self, GeneratorError> {
        match kind {
            "normal" => Ok(Self::Normal {
                mean: 1.0,
                std: 0.5,
            }),
            "log_normal" | "lognormal" => Ok(Self::LogNormal {
                mu: 0.0,
                sigma: 0.5,
            }),
            "exponential" => Ok(Self::Exponential { scale: 1.0 }),
            "uniform" => Ok(Self::Uniform {
                low: 0.5,
                high: 1.5,
            }),
            other => Err(GeneratorError::UnknownDistribution(other.to_string())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Normal { .. } => "normal",
            Self::LogNormal { .. } => "log_normal",
            Self::Exponential { .. } => "exponential",
            Self::Uniform { .. } => "uniform",
        }
    }

    /// Display name used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal { .. } => "Normal Distribution",
            Self::LogNormal { .. } => "Lognormal Distribution",
            Self::Exponential { .. } => "Exponential Distribution",
            Self::Uniform { .. } => "Uniform Distribution",
        }
    }

    /// Parameters as `name=value` pairs, e.g. `low=0.5, high=1.5`.
    pub fn parameters(&self) -> String {
        match *self {
            Self::Normal { mean, std } => format!("mean={}, std={}", mean, std),
            Self::LogNormal { mu, sigma } => format!("mu={}, sigma={}", mu, sigma),
            Self::Exponential { scale } => format!("scale={}", scale),
            Self::Uniform { low, high } => format!("low={}, high={}", low, high),
        }
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        let invalid = |reason: &str| GeneratorError::InvalidParameters {
            distribution: self.kind(),
            reason: reason.to_string(),
        };
        match *self {
            Self::Normal { mean, std } => {
                if !mean.is_finite() || !std.is_finite() || std < 0.0 {
                    return Err(invalid("mean must be finite and std finite and >= 0"));
                }
            }
            Self::LogNormal { mu, sigma } => {
                if !mu.is_finite() || !sigma.is_finite() || sigma < 0.0 {
                    return Err(invalid("mu must be finite and sigma finite and >= 0"));
                }
            }
            Self::Exponential { scale } => {
                if !scale.is_finite() || scale <= 0.0 {
                    return Err(invalid("scale must be finite and > 0"));
                }
            }
            Self::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low >= high {
                    return Err(invalid("bounds must be finite with low < high"));
                }
                // The sampler scales by `high - low`, which must not overflow.
                if !(high - low).is_finite() {
                    return Err(invalid("range high - low overflows"));
                }
            }
        }
        Ok(())
    }
}

/// Seeded random source used by the driver.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Draw `n` load values from `distribution`.
///
/// Normal samples may be negative; they are returned unchanged.
pub fn generate_loads<R: Rng + ?Sized>(
    distribution: &LoadDistribution,
    n: usize,
    rng: &mut R,
) -> Result<Vec<f64>, GeneratorError> {
    distribution.validate()?;
    let invalid = |e: String| GeneratorError::InvalidParameters {
        distribution: distribution.kind(),
        reason: e,
    };

    let loads = match *distribution {
        LoadDistribution::Normal { mean, std } => {
            let d = Normal::new(mean, std).map_err(|e| invalid(e.to_string()))?;
            (0..n).map(|_| d.sample(rng)).collect()
        }
        LoadDistribution::LogNormal { mu, sigma } => {
            let d = LogNormal::new(mu, sigma).map_err(|e| invalid(e.to_string()))?;
            (0..n).map(|_| d.sample(rng)).collect()
        }
        LoadDistribution::Exponential { scale } => {
            let d = Exp::new(1.0 / scale).map_err(|e| invalid(e.to_string()))?;
            (0..n).map(|_| d.sample(rng)).collect()
        }
        LoadDistribution::Uniform { low, high } => {
            let d = Uniform::new(low, high);
            (0..n).map(|_| d.sample(rng)).collect()
        }
    };
    Ok(loads)
}

/// Summary statistics of a generated load sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// Values below zero, which the dispatch core rejects.
    pub negative_count: usize,
}

impl DistributionStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                count: 0,
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
                negative_count: 0,
            };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Self {
            count: values.len(),
            mean,
            std: variance.sqrt(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            negative_count: values.iter().filter(|&&v| v < 0.0).count(),
        }
    }
}
