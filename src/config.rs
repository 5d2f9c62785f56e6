use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Environment variable naming the dataset when no CLI argument is given.
pub const DATA_ENV_VAR: &str = "HOTEL_DASHBOARD_DATA";
const DEFAULT_DATA_FILE: &str = "hotel_bookings.csv";

pub const COUNTRY_CAP_RANGE: RangeInclusive<usize> = 5..=20;
pub const DEFAULT_COUNTRY_CAP: usize = 10;

/// Start-up configuration, resolved once in `main`.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Dataset to open on start-up, if any.
    pub dataset_path: Option<PathBuf>,
    pub default_country_cap: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            default_country_cap: DEFAULT_COUNTRY_CAP,
        }
    }
}

impl DashboardConfig {
    /// First CLI argument, then `HOTEL_DASHBOARD_DATA`, then
    /// `hotel_bookings.csv` in the working directory if it exists.
    pub fn from_env() -> Self {
        let arg = std::env::args_os().nth(1).map(PathBuf::from);
        let env = std::env::var_os(DATA_ENV_VAR).map(PathBuf::from);
        Self::resolve(arg, env)
    }

    fn resolve(arg: Option<PathBuf>, env: Option<PathBuf>) -> Self {
        let dataset_path = arg.or(env).or_else(|| {
            let fallback = PathBuf::from(DEFAULT_DATA_FILE);
            fallback.exists().then_some(fallback)
        });
        Self {
            dataset_path,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_wins_over_env() {
        let cfg = DashboardConfig::resolve(Some("a.csv".into()), Some("b.csv".into()));
        assert_eq!(cfg.dataset_path, Some(PathBuf::from("a.csv")));
        assert_eq!(cfg.default_country_cap, DEFAULT_COUNTRY_CAP);
    }

    #[test]
    fn env_used_without_argument() {
        let cfg = DashboardConfig::resolve(None, Some("b.parquet".into()));
        assert_eq!(cfg.dataset_path, Some(PathBuf::from("b.parquet")));
    }

    #[test]
    fn default_cap_is_within_slider_range() {
        assert!(COUNTRY_CAP_RANGE.contains(&DEFAULT_COUNTRY_CAP));
    }
}
