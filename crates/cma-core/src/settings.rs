use chrono::Duration;

/// Messages serializing to this many bytes or more are offloaded.
pub const DEFAULT_OFFLOAD_THRESHOLD_BYTES: usize = 10_000;

/// Number of execution-history events requested when discovering the task.
pub const DEFAULT_HISTORY_WINDOW: u32 = 40;

/// Lifetime of an offloaded message body.
pub const DEFAULT_REMOTE_TTL_DAYS: i64 = 7;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{name} must be a positive integer (got '{value}')")]
    Invalid { name: &'static str, value: String },
}

/// Operational knobs of the adapter.
///
/// Task behaviour is configured inside each message; these only tune the
/// adapter itself. Defaults reproduce the protocol constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterSettings {
    pub offload_threshold_bytes: usize,
    pub history_window: u32,
    pub remote_ttl: Duration,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            offload_threshold_bytes: DEFAULT_OFFLOAD_THRESHOLD_BYTES,
            history_window: DEFAULT_HISTORY_WINDOW,
            remote_ttl: Duration::days(DEFAULT_REMOTE_TTL_DAYS),
        }
    }
}

impl AdapterSettings {
    /// Load settings from environment variables with defaults.
    ///
    /// | Env Var                       | Default |
    /// |-------------------------------|---------|
    /// | `CMA_OFFLOAD_THRESHOLD_BYTES` | `10000` |
    /// | `CMA_HISTORY_WINDOW`          | `40`    |
    /// | `CMA_REMOTE_TTL_DAYS`         | `7`     |
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let offload_threshold_bytes = positive(&lookup, "CMA_OFFLOAD_THRESHOLD_BYTES")?
            .map_or(defaults.offload_threshold_bytes, |v| v as usize);
        let history_window =
            positive(&lookup, "CMA_HISTORY_WINDOW")?.unwrap_or(defaults.history_window);
        let remote_ttl = positive(&lookup, "CMA_REMOTE_TTL_DAYS")?
            .map_or(defaults.remote_ttl, |v| Duration::days(v as i64));

        Ok(Self {
            offload_threshold_bytes,
            history_window,
            remote_ttl,
        })
    }
}

fn positive<F>(lookup: &F, name: &'static str) -> Result<Option<u32>, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    match raw.trim().parse::<u32>() {
        Ok(v) if v > 0 => Ok(Some(v)),
        _ => Err(SettingsError::Invalid { name, value: raw }),
    }
}
