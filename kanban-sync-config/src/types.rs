use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Complete kanban-sync configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub ordering: OrderingConfig,
    pub realtime: RealtimeConfig,
    pub client: ClientConfig,
}

impl SyncConfig {
    /// Reject values the engine cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        self.ordering.validate()?;
        self.realtime.validate()
    }
}

/// Order key generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    /// Distance between keys when appending or renumbering
    pub spacing: f64,
    /// Gaps at or below this size count as exhausted and trigger renormalization
    pub min_gap: f64,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            spacing: 1.0,
            min_gap: 1e-9,
        }
    }
}

impl OrderingConfig {
    fn validate(&self) -> ConfigResult<()> {
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(ConfigError::validation(format!(
                "ordering.spacing must be a positive number, got {}",
                self.spacing
            )));
        }
        if !self.min_gap.is_finite() || self.min_gap < 0.0 || self.min_gap >= self.spacing {
            return Err(ConfigError::validation(format!(
                "ordering.min_gap must be in [0, spacing), got {}",
                self.min_gap
            )));
        }
        Ok(())
    }
}

/// Realtime bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Events buffered per channel before slow subscribers start lagging
    pub channel_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

impl RealtimeConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::validation(
                "realtime.channel_capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Client-side cache behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Reload invalidated views from the authority right away
    pub refetch_on_invalidate: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            refetch_on_invalidate: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ordering.spacing, 1.0);
        assert!(config.client.refetch_on_invalidate);
    }

    #[test]
    fn test_rejects_non_positive_spacing() {
        let mut config = SyncConfig::default();
        config.ordering.spacing = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_rejects_min_gap_above_spacing() {
        let mut config = SyncConfig::default();
        config.ordering.min_gap = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let mut config = SyncConfig::default();
        config.realtime.channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: SyncConfig =
            serde_json::from_str(r#"{"ordering": {"spacing": 16.0}}"#).unwrap();
        assert_eq!(config.ordering.spacing, 16.0);
        assert_eq!(config.ordering.min_gap, 1e-9);
        assert_eq!(config.realtime.channel_capacity, 256);
    }
}
