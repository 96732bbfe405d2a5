//! Configuration loading from environment variables.

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Default listing page size when `PAGE_SIZE` is unset.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// How listing totals are resolved for a filtered query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum CountMode {
    /// Ask the gateway for a predicate-scoped approximate count.
    #[default]
    Approximate,
    /// Count by scanning every matching record. Accurate and expensive.
    Exact,
}

/// Runtime configuration for JobDesk.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub page_size: usize,
    pub count_mode: CountMode,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    // Prefer explicit HOME if set (Unix, some Windows shells)
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE (standard)
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    // Fallback to current directory if available
    std::env::current_dir().ok()
}

/// Parse a `COUNT_MODE` value.
///
/// # Supported Values
/// - `approx`, `approximate` (case-insensitive)
/// - `exact`
///
/// # Returns
/// `Some(mode)` when the value is recognized, otherwise `None`.
pub fn parse_count_mode(value: &str) -> Option<CountMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "approx" | "approximate" => Some(CountMode::Approximate),
        "exact" => Some(CountMode::Exact),
        _ => None,
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("DB_PATH").map(expand_tilde).unwrap_or_else(|_| {
                let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
                let data_dir = home.join(".local").join("share").join("jobdesk");
                data_dir.join("db").to_string_lossy().to_string()
            }),
            page_size: env::var("PAGE_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|&size| size > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE),
            count_mode: env::var("COUNT_MODE")
                .ok()
                .and_then(|m| parse_count_mode(&m))
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_count_mode, CountMode};

    #[test]
    fn parse_count_mode_accepts_known_values() {
        for value in ["approx", "approximate", "APPROX", " Approximate "] {
            assert_eq!(
                parse_count_mode(value),
                Some(CountMode::Approximate),
                "value: {}",
                value
            );
        }
        assert_eq!(parse_count_mode("exact"), Some(CountMode::Exact));
        assert_eq!(parse_count_mode(" EXACT "), Some(CountMode::Exact));
    }

    #[test]
    fn parse_count_mode_rejects_unknown_values() {
        assert_eq!(parse_count_mode("estimated"), None);
        assert_eq!(parse_count_mode(""), None);
    }
}
