use std::env;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use time::Duration;

pub const DEFAULT_EVENT_MINUTES_VAR: &str = "PLANNR_DEFAULT_EVENT_MINUTES";
pub const SLOT_GRANULARITY_VAR: &str = "PLANNR_SLOT_GRANULARITY_MINUTES";
pub const HORIZON_DAYS_VAR: &str = "PLANNR_HORIZON_DAYS";
pub const MAX_SUGGESTIONS_VAR: &str = "PLANNR_MAX_SUGGESTIONS";

/// Tunables of the scheduling assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Assumed length of events that have no end time.
    pub default_event_minutes: u32,
    /// Distance between two candidate slot starts.
    pub slot_granularity_minutes: u32,
    /// Number of days searched, starting with the reference day.
    pub horizon_days: u32,
    /// Number of slots returned by a search.
    pub max_suggestions: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            default_event_minutes: 60,
            slot_granularity_minutes: 30,
            horizon_days: 7,
            max_suggestions: 5,
        }
    }
}

impl SchedulerConfig {
    /// Defaults overridden by any `PLANNR_*` env vars that are set.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overridden by the values `lookup` finds.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(SchedulerConfig {
            default_event_minutes: positive(&lookup, DEFAULT_EVENT_MINUTES_VAR)?
                .unwrap_or(defaults.default_event_minutes),
            slot_granularity_minutes: positive(&lookup, SLOT_GRANULARITY_VAR)?
                .unwrap_or(defaults.slot_granularity_minutes),
            horizon_days: positive(&lookup, HORIZON_DAYS_VAR)?.unwrap_or(defaults.horizon_days),
            max_suggestions: positive(&lookup, MAX_SUGGESTIONS_VAR)?
                .unwrap_or(defaults.max_suggestions),
        })
    }

    pub fn default_event_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.default_event_minutes))
    }

    pub fn slot_granularity(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_granularity_minutes.max(1)))
    }
}

fn positive<T>(lookup: impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr + Default + PartialOrd,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let value: T = raw
        .trim()
        .parse()
        .with_context(|| format!("`{name}` must be a positive integer, got `{raw}`"))?;
    if value <= T::default() {
        bail!("`{name}` must be a positive integer, got `{raw}`");
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{HORIZON_DAYS_VAR, MAX_SUGGESTIONS_VAR, SLOT_GRANULARITY_VAR, SchedulerConfig};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = SchedulerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SchedulerConfig::default());
        assert_eq!(config.default_event_duration(), time::Duration::hours(1));
        assert_eq!(config.slot_granularity(), time::Duration::minutes(30));
    }

    #[test]
    fn overrides() {
        let config = SchedulerConfig::from_lookup(lookup(&[
            (HORIZON_DAYS_VAR, "14"),
            (MAX_SUGGESTIONS_VAR, " 3 "),
        ]))
        .unwrap();
        assert_eq!(config.horizon_days, 14);
        assert_eq!(config.max_suggestions, 3);
        assert_eq!(config.slot_granularity_minutes, 30);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(SchedulerConfig::from_lookup(lookup(&[(SLOT_GRANULARITY_VAR, "0")])).is_err());
        let err = SchedulerConfig::from_lookup(lookup(&[(HORIZON_DAYS_VAR, "week")])).unwrap_err();
        assert!(err.to_string().contains(HORIZON_DAYS_VAR));
    }
}
