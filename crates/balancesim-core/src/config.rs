//! TOML configuration parsing for BalanceSim.
//!
//! Defines the configuration schema for simulation runs: the worker pool,
//! the policies to compare, the load distributions to draw from and the run
//! parameters.

use crate::engine::InvalidLoadAction;
use crate::generator::LoadDistribution;
use balancesim_policies::{available_policies, Policy, PolicyError, PolicyKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub simulation: SimulationSection,
    pub cluster: ClusterSection,
    #[serde(default)]
    pub policies: PoliciesSection,
    #[serde(default = "default_distributions")]
    pub distributions: Vec<LoadDistribution>,
}

/// General simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSection {
    /// Human-readable name for this simulation.
    #[serde(default = "default_sim_name")]
    pub name: String,
    /// Seed for the load generator.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Number of repetitions of every (distribution, policy) pair.
    #[serde(default = "default_num_runs")]
    pub num_runs: u32,
    /// Load values drawn per distribution per run.
    #[serde(default = "default_num_requests")]
    pub num_requests: usize,
    /// What the driver does with negative or non-finite load values.
    #[serde(default)]
    pub on_invalid_load: InvalidLoadAction,
    /// Keep the per-assignment history in run reports.
    #[serde(default)]
    pub record_history: bool,
}

fn default_sim_name() -> String {
    "simulation".to_string()
}

fn default_seed() -> u64 {
    42
}

fn default_num_runs() -> u32 {
    5
}

fn default_num_requests() -> usize {
    1000
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            name: default_sim_name(),
            seed: default_seed(),
            num_runs: default_num_runs(),
            num_requests: default_num_requests(),
            on_invalid_load: InvalidLoadAction::default(),
            record_history: false,
        }
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSection {
    /// Number of workers.
    pub num_workers: usize,
    /// Per-worker weights for weighted round-robin.
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
}

/// Which policies take part in a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoliciesSection {
    #[serde(default = "default_enabled_policies")]
    pub enabled: Vec<String>,
}

fn default_enabled_policies() -> Vec<String> {
    available_policies().into_iter().map(String::from).collect()
}

impl Default for PoliciesSection {
    fn default() -> Self {
        Self {
            enabled: default_enabled_policies(),
        }
    }
}

fn default_distributions() -> Vec<LoadDistribution> {
    vec![
        LoadDistribution::Normal {
            mean: 1.0,
            std: 0.5,
        },
        LoadDistribution::Exponential { scale: 1.0 },
        LoadDistribution::Uniform {
            low: 0.5,
            high: 1.5,
        },
    ]
}

impl SimConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration consistency.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.cluster.num_workers == 0 {
            return Err(ConfigError::Validation(
                "num_workers must be > 0".to_string(),
            ));
        }
        if self.simulation.num_runs == 0 {
            return Err(ConfigError::Validation("num_runs must be > 0".to_string()));
        }
        if self.simulation.num_requests == 0 {
            return Err(ConfigError::Validation(
                "num_requests must be > 0".to_string(),
            ));
        }
        if self.policies.enabled.is_empty() {
            return Err(ConfigError::Validation(
                "at least one policy must be enabled".to_string(),
            ));
        }
        if self.distributions.is_empty() {
            return Err(ConfigError::Validation(
                "at least one distribution must be configured".to_string(),
            ));
        }
        for dist in &self.distributions {
            dist.validate()
                .map_err(|e| ConfigError::Validation(e.to_string()))?;
        }
        // Building every enabled policy checks names, weight count and sign.
        self.build_policies()?;
        Ok(())
    }

    /// Parsed kinds of the enabled policies, in configured order.
    pub fn policy_kinds(&self) -> Result<Vec<PolicyKind>, ConfigError> {
        self.policies
            .enabled
            .iter()
            .map(|name| {
                PolicyKind::from_name(name).ok_or_else(|| {
                    ConfigError::Validation(format!(
                        "Unknown policy: {}. Available: {:?}",
                        name,
                        available_policies()
                    ))
                })
            })
            .collect()
    }

    /// Report label for each configured distribution, in configured order.
    ///
    /// A kind configured once keeps its plain label. Kinds configured more
    /// than once carry their parameters, and exact duplicates are further
    /// suffixed with their 1-based position, so every entry gets its own row.
    pub fn distribution_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .distributions
            .iter()
            .map(|dist| {
                let same_kind = self
                    .distributions
                    .iter()
                    .filter(|other| other.kind() == dist.kind())
                    .count();
                if same_kind > 1 {
                    format!("{} ({})", dist.label(), dist.parameters())
                } else {
                    dist.label().to_string()
                }
            })
            .collect();

        for idx in 1..labels.len() {
            if labels[..idx].contains(&labels[idx]) {
                labels[idx] = format!("{} #{}", labels[idx], idx + 1);
            }
        }
        labels
    }

    /// Construct one fresh instance of `kind` for this cluster.
    pub fn build_policy(&self, kind: PolicyKind) -> Result<Policy, PolicyError> {
        kind.build(self.cluster.num_workers, self.cluster.weights.as_deref())
    }

    /// Construct every enabled policy.
    pub fn build_policies(&self) -> Result<Vec<Policy>, ConfigError> {
        self.policy_kinds()?
            .into_iter()
            .map(|kind| {
                self.build_policy(kind)
                    .map_err(|e| ConfigError::Validation(e.to_string()))
            })
            .collect()
    }
}
