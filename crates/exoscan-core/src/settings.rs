use std::{collections::HashMap, fmt, str::FromStr};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::input::ManualField;
use crate::model::ModelKind;

/// How the manual-entry form is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ManualStrategy {
    /// POST the fields to the prediction endpoint.
    #[default]
    Remote,
    /// Score locally with the placeholder heuristic.
    Heuristic,
}

impl ManualStrategy {
    /// Fields that must be filled before this strategy can run.
    pub fn required_fields(self) -> &'static [ManualField] {
        match self {
            Self::Remote => &ManualField::REMOTE,
            Self::Heuristic => &ManualField::HEURISTIC,
        }
    }
}

impl fmt::Display for ManualStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Remote => "remote",
            Self::Heuristic => "heuristic",
        })
    }
}

impl FromStr for ManualStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "heuristic" | "local" => Ok(Self::Heuristic),
            other => anyhow::bail!("unknown manual strategy `{other}` (expected remote or heuristic)"),
        }
    }
}

impl TryFrom<String> for ManualStrategy {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Runtime configuration of the scanner controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    /// Base URL the predict path is appended to.
    pub endpoint: String,
    pub predict_path: String,
    /// Model tab selected at startup.
    pub model: ModelKind,
    pub manual_strategy: ManualStrategy,
    /// Request timeout; unset means the request may hang indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            predict_path: Self::DEFAULT_PREDICT_PATH.to_string(),
            model: ModelKind::default(),
            manual_strategy: ManualStrategy::default(),
            timeout_secs: None,
        }
    }
}

impl ScannerSettings {
    pub const DEFAULT_ENDPOINT: &'static str = "http://127.0.0.1:8000";
    pub const DEFAULT_PREDICT_PATH: &'static str = "/api/predict";

    pub const ENDPOINT_ENV: &'static str = "EXOSCAN_ENDPOINT";
    pub const PREDICT_PATH_ENV: &'static str = "EXOSCAN_PREDICT_PATH";
    pub const MODEL_ENV: &'static str = "EXOSCAN_MODEL";
    pub const STRATEGY_ENV: &'static str = "EXOSCAN_MANUAL_STRATEGY";
    pub const TIMEOUT_ENV: &'static str = "EXOSCAN_TIMEOUT_SECS";

    /// Load settings from environment variables.
    ///
    /// * `EXOSCAN_ENDPOINT`: base URL (default: `http://127.0.0.1:8000`).
    /// * `EXOSCAN_PREDICT_PATH`: prediction route (default: `/api/predict`).
    /// * `EXOSCAN_MODEL`: initial model id (default: `logistic`).
    /// * `EXOSCAN_MANUAL_STRATEGY`: `remote` or `heuristic` (default: `remote`).
    /// * `EXOSCAN_TIMEOUT_SECS`: optional request timeout.
    pub fn from_env() -> Result<Self> {
        Self::from_map(std::env::vars().collect())
    }

    fn from_map(vars: HashMap<String, String>) -> Result<Self> {
        let non_blank = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();
        let model = match non_blank(Self::MODEL_ENV) {
            Some(raw) => raw
                .parse::<ModelKind>()
                .with_context(|| format!("invalid {}", Self::MODEL_ENV))?,
            None => defaults.model,
        };
        let manual_strategy = match non_blank(Self::STRATEGY_ENV) {
            Some(raw) => raw
                .parse::<ManualStrategy>()
                .with_context(|| format!("invalid {}", Self::STRATEGY_ENV))?,
            None => defaults.manual_strategy,
        };
        let timeout_secs = non_blank(Self::TIMEOUT_ENV).and_then(|v| v.parse::<u64>().ok());

        Ok(Self {
            endpoint: non_blank(Self::ENDPOINT_ENV).unwrap_or(defaults.endpoint),
            predict_path: non_blank(Self::PREDICT_PATH_ENV).unwrap_or(defaults.predict_path),
            model,
            manual_strategy,
            timeout_secs,
        })
    }

    /// Full prediction URL.
    pub fn predict_url(&self) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.predict_path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn with_env_lock<F: FnOnce()>(func: F) {
        let _guard = ENV_LOCK.lock().unwrap();
        func();
    }

    fn clear_env() {
        for key in [
            ScannerSettings::ENDPOINT_ENV,
            ScannerSettings::PREDICT_PATH_ENV,
            ScannerSettings::MODEL_ENV,
            ScannerSettings::STRATEGY_ENV,
            ScannerSettings::TIMEOUT_ENV,
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn defaults_without_env() {
        with_env_lock(|| {
            clear_env();
            let settings = ScannerSettings::from_env().expect("should load settings");
            assert_eq!(settings, ScannerSettings::default());
            assert_eq!(settings.predict_url(), "http://127.0.0.1:8000/api/predict");
        });
    }

    #[test]
    fn reads_overrides() {
        with_env_lock(|| {
            clear_env();
            env::set_var(ScannerSettings::ENDPOINT_ENV, "http://scanner.local/");
            env::set_var(ScannerSettings::MODEL_ENV, "lightgbm");
            env::set_var(ScannerSettings::STRATEGY_ENV, "Heuristic");
            env::set_var(ScannerSettings::TIMEOUT_ENV, "15");
            let settings = ScannerSettings::from_env().expect("should parse overrides");
            assert_eq!(settings.model, ModelKind::LightGbm);
            assert_eq!(settings.manual_strategy, ManualStrategy::Heuristic);
            assert_eq!(settings.timeout_secs, Some(15));
            assert_eq!(settings.predict_url(), "http://scanner.local/api/predict");
            clear_env();
        });
    }

    #[test]
    fn rejects_unknown_model() {
        with_env_lock(|| {
            clear_env();
            env::set_var(ScannerSettings::MODEL_ENV, "svm");
            let err = ScannerSettings::from_env().expect_err("unknown model should error");
            assert!(format!("{err:#}").contains(ScannerSettings::MODEL_ENV));
            clear_env();
        });
    }

    #[test]
    fn file_values_accept_env_spellings() {
        let settings: ScannerSettings = serde_json::from_str(
            r#"{"model": "LightGBM", "manual_strategy": "Local", "timeout_secs": 3}"#,
        )
        .unwrap();
        assert_eq!(settings.model, ModelKind::LightGbm);
        assert_eq!(settings.manual_strategy, ManualStrategy::Heuristic);
        assert_eq!(settings.endpoint, ScannerSettings::DEFAULT_ENDPOINT);
        assert!(serde_json::from_str::<ManualStrategy>("\"batch\"").is_err());
    }

    #[test]
    fn strategy_picks_required_fields() {
        assert_eq!(ManualStrategy::Remote.required_fields().len(), 7);
        assert!(ManualStrategy::Heuristic
            .required_fields()
            .contains(&ManualField::KoiCount));
    }
}
