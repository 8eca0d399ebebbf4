//! Prediction dispatch: the remote endpoint client and the local placeholder scorer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::ManualRecord;
use crate::model::ModelKind;
use crate::presenter::ResultPayload;

pub mod heuristic;
pub mod remote;

pub use heuristic::HeuristicPredictor;
pub use remote::RemotePredictor;

/// Score and verdict returned for one manual entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Confidence on a 0–100 scale.
    pub confidence: f64,
    #[serde(default)]
    pub is_exoplanet: Option<bool>,
    /// Opaque label from the classifier.
    #[serde(default)]
    pub prediction: Option<serde_json::Value>,
    /// `[not exoplanet, exoplanet]`.
    #[serde(default)]
    pub probabilities: Option<Vec<f64>>,
}

impl Prediction {
    pub fn from_score(confidence: f64) -> Self {
        Self {
            confidence,
            is_exoplanet: None,
            prediction: None,
            probabilities: None,
        }
    }

    pub fn into_payload(self, model: ModelKind) -> ResultPayload {
        ResultPayload {
            is_exoplanet: self.is_exoplanet,
            prediction: self.prediction,
            probabilities: self.probabilities,
            ..ResultPayload::new(self.confidence, model)
        }
    }
}

pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Failed to connect to backend. Please make sure the server is running.";
pub const UNKNOWN_REMOTE_ERROR: &str = "Unknown error occurred";

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The endpoint answered with a non-success status.
    #[error("prediction endpoint rejected the request ({status}): {message}")]
    RemoteRejected { status: u16, message: String },
    /// No response at all.
    #[error("failed to reach prediction endpoint at {url}")]
    TransportFailure {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// A success status whose body is not a prediction.
    #[error("prediction endpoint returned an unreadable body: {0}")]
    InvalidResponse(String),
}

impl DispatchError {
    /// Text shown in the result panel.
    pub fn user_message(&self) -> String {
        match self {
            Self::RemoteRejected { message, .. } => format!("Error: {message}"),
            Self::TransportFailure { .. } => TRANSPORT_FAILURE_MESSAGE.to_string(),
            Self::InvalidResponse(_) => format!("Error: {UNKNOWN_REMOTE_ERROR}"),
        }
    }
}

/// Scores a validated manual entry with the selected model.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(
        &self,
        model: ModelKind,
        record: &ManualRecord,
    ) -> Result<Prediction, DispatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_tolerates_missing_optional_fields() {
        let prediction: Prediction = serde_json::from_str(r#"{"confidence": 42}"#).unwrap();
        assert_eq!(prediction, Prediction::from_score(42.0));
    }

    #[test]
    fn payload_clamps_confidence() {
        let payload = Prediction {
            confidence: 130.0,
            is_exoplanet: Some(true),
            prediction: Some(serde_json::json!(1)),
            probabilities: Some(vec![0.0, 1.0]),
        }
        .into_payload(ModelKind::GradientBoosting);
        assert_eq!(payload.score, 100.0);
        assert_eq!(payload.model, ModelKind::GradientBoosting);
        assert_eq!(payload.probability_pair(), Some((0.0, 1.0)));
    }

    #[test]
    fn user_messages_match_panel_text() {
        let rejected = DispatchError::RemoteRejected {
            status: 400,
            message: "Unknown model name: svm".into(),
        };
        assert_eq!(rejected.user_message(), "Error: Unknown model name: svm");
        let invalid = DispatchError::InvalidResponse("eof".into());
        assert_eq!(invalid.user_message(), "Error: Unknown error occurred");
    }
}
