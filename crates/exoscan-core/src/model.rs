use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classifier the remote endpoint should score with, selected through the model tabs.
///
/// Deserialization goes through [`FromStr`], so settings files and environment
/// variables accept the same spellings as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ModelKind {
    #[default]
    #[serde(rename = "logistic")]
    Logistic,
    #[serde(rename = "random-forest")]
    RandomForest,
    #[serde(rename = "gradient-boosting")]
    GradientBoosting,
    #[serde(rename = "lightgbm")]
    LightGbm,
}

impl ModelKind {
    /// Tab order.
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Logistic,
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
        ModelKind::LightGbm,
    ];

    /// Wire identifier sent as `model_name`.
    pub fn id(self) -> &'static str {
        match self {
            Self::Logistic => "logistic",
            Self::RandomForest => "random-forest",
            Self::GradientBoosting => "gradient-boosting",
            Self::LightGbm => "lightgbm",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Logistic => "Logistic Regression",
            Self::RandomForest => "Random Forest",
            Self::GradientBoosting => "Gradient Boosting",
            Self::LightGbm => "LightGBM",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown model `{0}` (expected one of: logistic, random-forest, gradient-boosting, lightgbm)")]
pub struct UnknownModel(pub String);

impl FromStr for ModelKind {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|model| model.id() == needle)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

impl TryFrom<String> for ModelKind {
    type Error = UnknownModel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_logistic() {
        assert_eq!(ModelKind::default(), ModelKind::Logistic);
    }

    #[test]
    fn parses_ids_case_insensitively() {
        assert_eq!("LightGBM".parse::<ModelKind>(), Ok(ModelKind::LightGbm));
        assert_eq!(
            " random-forest ".parse::<ModelKind>(),
            Ok(ModelKind::RandomForest)
        );
        let err = "svm".parse::<ModelKind>().unwrap_err();
        assert!(err.to_string().contains("svm"));
    }

    #[test]
    fn serde_uses_wire_ids() {
        for model in ModelKind::ALL {
            let encoded = serde_json::to_string(&model).unwrap();
            assert_eq!(encoded, format!("\"{}\"", model.id()));
            assert_eq!(serde_json::from_str::<ModelKind>(&encoded).unwrap(), model);
        }
    }

    #[test]
    fn deserializes_like_from_str() {
        let model: ModelKind = serde_json::from_str("\" LightGBM \"").unwrap();
        assert_eq!(model, ModelKind::LightGbm);
        let err = serde_json::from_str::<ModelKind>("\"svm\"").unwrap_err();
        assert!(err.to_string().contains("unknown model `svm`"));
    }
}
