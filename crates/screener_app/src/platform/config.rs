//! Environment-driven settings for the shell.
//!
//! The stability threshold and poll interval are deployment-dependent
//! tunables, never hardcoded: backends with slow upload registration need a
//! longer stable run before a job may settle.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use engine_logging::engine_warn;
use screener_core::{SyncPolicy, DEFAULT_STABLE_TICKS};
use screener_engine::{BackendSettings, EngineSettings, DEFAULT_POLL_INTERVAL};

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub engine: EngineSettings,
    pub policy: SyncPolicy,
    pub state_dir: PathBuf,
    /// Explicit reload override from the platform, when set.
    pub force_cold_start: Option<bool>,
}

pub fn from_env() -> AppSettings {
    resolve(|key| std::env::var(key).ok())
}

fn resolve(var: impl Fn(&str) -> Option<String>) -> AppSettings {
    let mut backend = BackendSettings::default();
    if let Some(url) = var("SCREENER_API_URL") {
        backend.base_url = url;
    }
    if let Some(url) = var("SCREENER_WS_URL") {
        backend.ws_url = url;
    }

    let poll_interval = parsed(var("SCREENER_POLL_SECS"), "SCREENER_POLL_SECS")
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_POLL_INTERVAL);
    let stable_ticks =
        parsed(var("SCREENER_STABLE_TICKS"), "SCREENER_STABLE_TICKS").unwrap_or(DEFAULT_STABLE_TICKS);

    let state_dir = var("SCREENER_STATE_DIR").map(PathBuf::from).unwrap_or_else(|| {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".screener")
    });

    let force_cold_start = var("SCREENER_FRESH").map(|raw| raw != "0");

    AppSettings {
        engine: EngineSettings {
            backend,
            poll_interval,
        },
        policy: SyncPolicy { stable_ticks },
        state_dir,
        force_cold_start,
    }
}

fn parsed<T: FromStr>(raw: Option<String>, key: &str) -> Option<T> {
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            engine_warn!("Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}
