//! Environment defaults.
//!
//! Precedence is CLI flag > environment > built-in default. The environment is
//! read once per run, after loading `.env` (if present) with `dotenvy`.
//!
//! Keys:
//! - `BIGO_SIZES`: comma-separated positive integers, e.g. `10,100,1000`
//! - `BIGO_REPEATS`: positive integer

use crate::domain::DEFAULT_SIZES;
use crate::error::AppError;

pub const ENV_SIZES: &str = "BIGO_SIZES";
pub const ENV_REPEATS: &str = "BIGO_REPEATS";

/// Values found in the environment; `None` when a key is unset or empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvDefaults {
    pub sizes: Option<Vec<usize>>,
    pub repeats: Option<usize>,
}

impl EnvDefaults {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read defaults through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let sizes = match non_empty(lookup(ENV_SIZES)) {
            Some(raw) => Some(
                parse_sizes(&raw).map_err(|e| AppError::new(2, format!("{ENV_SIZES}: {e}")))?,
            ),
            None => None,
        };
        let repeats = match non_empty(lookup(ENV_REPEATS)) {
            Some(raw) => Some(
                parse_positive(&raw).map_err(|e| AppError::new(2, format!("{ENV_REPEATS}: {e}")))?,
            ),
            None => None,
        };
        Ok(Self { sizes, repeats })
    }

    /// Sizes from the CLI, else the environment, else [`DEFAULT_SIZES`]; validated.
    pub fn resolve_sizes(&self, cli: Option<Vec<usize>>) -> Result<Vec<usize>, AppError> {
        let sizes = cli
            .or_else(|| self.sizes.clone())
            .unwrap_or_else(|| DEFAULT_SIZES.to_vec());
        check_sizes(&sizes)?;
        Ok(sizes)
    }

    pub fn resolve_repeats(&self, cli: Option<usize>) -> Result<usize, AppError> {
        let repeats = cli.or(self.repeats).unwrap_or(1);
        if repeats == 0 {
            return Err(AppError::new(2, "--repeats must be at least 1"));
        }
        Ok(repeats)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a comma-separated size list.
pub fn parse_sizes(raw: &str) -> Result<Vec<usize>, String> {
    raw.split(',').map(parse_positive).collect()
}

fn parse_positive(raw: &str) -> Result<usize, String> {
    let trimmed = raw.trim();
    match trimmed.parse::<usize>() {
        Ok(0) => Err("values must be positive".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{trimmed}' is not a positive integer")),
    }
}

/// Sizes must be non-empty, positive and non-decreasing. Repeated sizes are
/// allowed (they add observations) but logged.
pub fn check_sizes(sizes: &[usize]) -> Result<(), AppError> {
    if sizes.is_empty() {
        return Err(AppError::new(2, "at least one input size is required"));
    }
    if let Some(i) = sizes.iter().position(|&n| n == 0) {
        return Err(AppError::new(2, format!("input size #{} must be positive", i + 1)));
    }
    for w in sizes.windows(2) {
        if w[1] < w[0] {
            return Err(AppError::new(
                2,
                format!("input sizes must be non-decreasing ({} follows {})", w[1], w[0]),
            ));
        }
        if w[1] == w[0] {
            tracing::warn!(size = w[0], "duplicate input size");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn unset_environment_uses_builtin_defaults() {
        let env = EnvDefaults::from_lookup(lookup(&[])).unwrap();
        assert_eq!(env, EnvDefaults::default());
        assert_eq!(env.resolve_sizes(None).unwrap(), DEFAULT_SIZES.to_vec());
        assert_eq!(env.resolve_repeats(None).unwrap(), 1);
    }

    #[test]
    fn cli_beats_environment() {
        let env = EnvDefaults::from_lookup(lookup(&[(ENV_SIZES, "5, 50,500"), (ENV_REPEATS, "3")])).unwrap();
        assert_eq!(env.resolve_sizes(None).unwrap(), vec![5, 50, 500]);
        assert_eq!(env.resolve_sizes(Some(vec![1, 2])).unwrap(), vec![1, 2]);
        assert_eq!(env.resolve_repeats(None).unwrap(), 3);
        assert_eq!(env.resolve_repeats(Some(7)).unwrap(), 7);
    }

    #[test]
    fn malformed_environment_is_a_config_error() {
        let err = EnvDefaults::from_lookup(lookup(&[(ENV_SIZES, "10,abc")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("BIGO_SIZES"));

        let err = EnvDefaults::from_lookup(lookup(&[(ENV_REPEATS, "0")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn size_ordering_rules() {
        assert!(check_sizes(&[1, 1, 2]).is_ok());
        assert!(check_sizes(&[]).is_err());
        assert!(check_sizes(&[0, 1]).is_err());
        let err = check_sizes(&[10, 5]).unwrap_err();
        assert!(err.to_string().contains("non-decreasing"));
    }
}
