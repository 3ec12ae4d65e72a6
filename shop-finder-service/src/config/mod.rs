use crate::services::extractor::ExtractionMode;
use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Default outbound timeout for a single generation call.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Deserialize)]
pub struct ShopFinderConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub extraction: ExtractionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    pub api_key: Secret<String>,
    /// Model for shop lookups (e.g., gemini-2.0-flash)
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
    /// Ask the model for schema-constrained JSON instead of free text.
    pub structured_output: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionSettings {
    pub mode: ExtractionMode,
}

impl ShopFinderConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let api_key = get_env("GOOGLE_API_KEY", None, is_prod)?;
        if api_key.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GOOGLE_API_KEY is set but empty"
            )));
        }

        Ok(ShopFinderConfig {
            common: common_config,
            gemini: GeminiSettings {
                api_key: Secret::new(api_key),
                model: get_env("GEMINI_MODEL", Some("gemini-2.0-flash"), is_prod)?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), is_prod)?,
                timeout_secs: parse_env(
                    "GEMINI_TIMEOUT_SECS",
                    &DEFAULT_TIMEOUT_SECS.to_string(),
                    is_prod,
                )?,
                structured_output: parse_env("GEMINI_STRUCTURED_OUTPUT", "true", is_prod)?,
            },
            extraction: ExtractionSettings {
                mode: get_env("EXTRACTION_MODE", Some("balanced"), is_prod)?
                    .parse()
                    .map_err(AppError::ConfigError)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: &str, is_prod: bool) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(key, Some(default), is_prod)?;
    raw.trim().parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_falls_back_to_default() {
        let value = get_env("SHOP_FINDER_TEST_UNSET_KEY", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn test_get_env_required_without_default() {
        let err = get_env("SHOP_FINDER_TEST_UNSET_KEY", None, false).unwrap_err();
        assert!(err.to_string().contains("SHOP_FINDER_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_get_env_prod_ignores_default() {
        let err = get_env("SHOP_FINDER_TEST_UNSET_KEY", Some("fallback"), true).unwrap_err();
        assert!(err.to_string().contains("required in production"));
    }

    #[test]
    fn test_parse_env_uses_default() {
        let secs: u64 = parse_env("SHOP_FINDER_TEST_UNSET_TIMEOUT", "60", false).unwrap();
        assert_eq!(secs, 60);
        let flag: bool = parse_env("SHOP_FINDER_TEST_UNSET_FLAG", "true", false).unwrap();
        assert!(flag);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        let err = parse_env::<u64>("SHOP_FINDER_TEST_UNSET_TIMEOUT", "soon", false).unwrap_err();
        assert!(err.to_string().contains("invalid value"));
    }
}
