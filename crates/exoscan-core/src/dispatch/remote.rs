use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{DispatchError, Prediction, Predictor, UNKNOWN_REMOTE_ERROR};
use crate::input::ManualRecord;
use crate::model::ModelKind;
use crate::settings::ScannerSettings;

/// Single-shot JSON client for the prediction endpoint. No retries.
#[derive(Debug, Clone)]
pub struct RemotePredictor {
    http: Client,
    url: String,
}

impl RemotePredictor {
    pub fn new(settings: &ScannerSettings) -> Result<Self> {
        let mut builder = Client::builder().user_agent("exoscan/0.1");
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .context("failed to build prediction HTTP client")?;
        Ok(Self {
            http,
            url: settings.predict_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_failure(&self, source: reqwest::Error) -> DispatchError {
        error!(url = %self.url, error = %source, "prediction request failed");
        DispatchError::TransportFailure {
            url: self.url.clone(),
            source,
        }
    }
}

#[async_trait]
impl Predictor for RemotePredictor {
    #[instrument(name = "remote_predict", skip(self, record), fields(model = model.id()))]
    async fn predict(
        &self,
        model: ModelKind,
        record: &ManualRecord,
    ) -> Result<Prediction, DispatchError> {
        let payload = PredictRequest {
            model_name: model,
            record,
        };
        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| self.transport_failure(err))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_failure(err))?;
        debug!(status, bytes = body.len(), "prediction response received");
        interpret_response(status, &body)
    }
}

/// Map a status and raw body onto a prediction or a rejection.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<Prediction, DispatchError> {
    if (200..300).contains(&status) {
        return serde_json::from_slice(body)
            .map_err(|err| DispatchError::InvalidResponse(err.to_string()));
    }
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_REMOTE_ERROR.to_string());
    Err(DispatchError::RemoteRejected { status, message })
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    model_name: ModelKind,
    #[serde(flatten)]
    record: &'a ManualRecord,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}
