use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};

/// Generation and runtime parameters for the inference engine.
///
/// Field order is the on-disk order of the persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    /// Context window size in tokens.
    pub context_size: u32,
    /// Number of CPU threads the engine may use.
    pub threads: u32,
    /// Prompt processing batch size.
    pub batch_size: u32,
    /// Upper bound on generated tokens per reply.
    pub max_tokens: u32,
    /// Sampling temperature, in `[0, 2]`.
    pub temperature: f64,
    /// Nucleus sampling mass, in `(0, 1]`.
    pub top_p: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            context_size: 2048,
            threads: 4,
            batch_size: 512,
            max_tokens: 1024,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

impl Configuration {
    /// Applies every key present in `overrides`, keeping the rest.
    #[must_use]
    pub fn merge(&self, overrides: &PartialConfiguration) -> Self {
        Self {
            context_size: overrides.context_size.unwrap_or(self.context_size),
            threads: overrides.threads.unwrap_or(self.threads),
            batch_size: overrides.batch_size.unwrap_or(self.batch_size),
            max_tokens: overrides.max_tokens.unwrap_or(self.max_tokens),
            temperature: overrides.temperature.unwrap_or(self.temperature),
            top_p: overrides.top_p.unwrap_or(self.top_p),
        }
    }

    /// Checks every key against its allowed range.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("context_size", self.context_size),
            ("threads", self.threads),
            ("batch_size", self.batch_size),
            ("max_tokens", self.max_tokens),
        ];
        if let Some((key, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ChatError::ConfigInvalid(format!("{key} must be positive")));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ChatError::ConfigInvalid(format!(
                "temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }

        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(ChatError::ConfigInvalid(format!(
                "top_p must be greater than 0 and at most 1, got {}",
                self.top_p
            )));
        }

        Ok(())
    }
}

/// A sparse set of configuration keys, as read from disk or given as
/// per-prompt overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

impl PartialConfiguration {
    /// Returns `true` if no key is set.
    pub const fn is_empty(&self) -> bool {
        self.context_size.is_none()
            && self.threads.is_none()
            && self.batch_size.is_none()
            && self.max_tokens.is_none()
            && self.temperature.is_none()
            && self.top_p.is_none()
    }
}

impl From<Configuration> for PartialConfiguration {
    fn from(config: Configuration) -> Self {
        Self {
            context_size: Some(config.context_size),
            threads: Some(config.threads),
            batch_size: Some(config.batch_size),
            max_tokens: Some(config.max_tokens),
            temperature: Some(config.temperature),
            top_p: Some(config.top_p),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert_eq!(config.context_size, 2048);
        assert_eq!(config.threads, 4);
        assert_eq!(config.batch_size, 512);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.top_p, 0.9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_single_key() {
        let overrides = PartialConfiguration {
            temperature: Some(0.2),
            ..PartialConfiguration::default()
        };

        let merged = Configuration::default().merge(&overrides);

        assert_eq!(
            merged,
            Configuration {
                temperature: 0.2,
                ..Configuration::default()
            }
        );
    }

    #[test]
    fn test_merge_empty_keeps_everything() {
        let current = Configuration {
            threads: 8,
            top_p: 0.5,
            ..Configuration::default()
        };

        assert_eq!(current.merge(&PartialConfiguration::default()), current);
    }

    #[test]
    fn test_merge_full_replaces_everything() {
        let target = Configuration {
            context_size: 4096,
            threads: 2,
            batch_size: 256,
            max_tokens: 64,
            temperature: 1.5,
            top_p: 1.0,
        };

        let merged = Configuration::default().merge(&PartialConfiguration::from(target));
        assert_eq!(merged, target);
    }

    #[test]
    fn test_validate_rejects_zero_integers() {
        let config = Configuration {
            batch_size: 0,
            ..Configuration::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_validate_temperature_bounds() {
        let hot = Configuration {
            temperature: 2.5,
            ..Configuration::default()
        };
        assert!(hot.validate().is_err());

        let greedy = Configuration {
            temperature: 0.0,
            ..Configuration::default()
        };
        assert!(greedy.validate().is_ok());
    }

    #[test]
    fn test_validate_top_p_bounds() {
        let zero = Configuration {
            top_p: 0.0,
            ..Configuration::default()
        };
        assert!(zero.validate().is_err());

        let one = Configuration {
            top_p: 1.0,
            ..Configuration::default()
        };
        assert!(one.validate().is_ok());
    }

    #[test]
    fn test_partial_is_empty() {
        assert!(PartialConfiguration::default().is_empty());
        assert!(!PartialConfiguration::from(Configuration::default()).is_empty());
    }

    #[test]
    fn test_partial_rejects_unknown_keys() {
        let result = toml::from_str::<PartialConfiguration>("seed = 42\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_parses_subset() {
        let partial: PartialConfiguration = toml::from_str("threads = 12\n").unwrap();
        assert_eq!(partial.threads, Some(12));
        assert!(partial.temperature.is_none());
    }
}
