use std::fmt::Write;

use colored::Colorize;
use serde::Serialize;

use crate::gauge::clamp_score;
use crate::model::ModelKind;

/// Format styles supported by the result panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    VeryLow,
    Low,
    Moderate,
    High,
}

impl ConfidenceBand {
    /// Bands start at 40, 60 and 80.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::High
        } else if score >= 60.0 {
            Self::Moderate
        } else if score >= 40.0 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High Confidence",
            Self::Moderate => "Moderate Confidence",
            Self::Low => "Low Confidence",
            Self::VeryLow => "Very Low Confidence",
        }
    }

    /// Narrative for the band. Anything but a positive verdict reads as negative.
    pub fn message(self, is_exoplanet: Option<bool>) -> &'static str {
        let positive = is_exoplanet.unwrap_or(false);
        match (self, positive) {
            (Self::High, true) => {
                "This object shows strong characteristics of an exoplanet candidate."
            }
            (Self::High, false) => "This object is very unlikely to be an exoplanet.",
            (Self::Moderate, true) => "This object shows moderate characteristics of an exoplanet candidate. Further observation recommended.",
            (Self::Moderate, false) => "This object shows low probability of being an exoplanet.",
            (Self::Low, true) => "This object shows weak characteristics of an exoplanet candidate. Additional data needed.",
            (Self::Low, false) => "This object is unlikely to be an exoplanet candidate.",
            (Self::VeryLow, true) => "Very weak exoplanet characteristics detected.",
            (Self::VeryLow, false) => {
                "This object is very unlikely to be an exoplanet candidate."
            }
        }
    }
}

/// Metadata of an analyzed upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub rows: usize,
}

/// Everything the result panel shows for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPayload {
    pub score: f64,
    pub model: ModelKind,
    pub is_exoplanet: Option<bool>,
    pub prediction: Option<serde_json::Value>,
    pub probabilities: Option<Vec<f64>>,
    pub file: Option<FileSummary>,
}

impl ResultPayload {
    /// Build a payload, clamping `score` into `[0, 100]`.
    pub fn new(score: f64, model: ModelKind) -> Self {
        Self {
            score: clamp_score(score),
            model,
            is_exoplanet: None,
            prediction: None,
            probabilities: None,
            file: None,
        }
    }

    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::from_score(self.score)
    }

    pub fn verdict_label(&self) -> Option<&'static str> {
        self.is_exoplanet.map(|yes| {
            if yes {
                "EXOPLANET CANDIDATE"
            } else {
                "NOT AN EXOPLANET"
            }
        })
    }

    /// `(not exoplanet, exoplanet)` when exactly two probabilities were returned.
    pub fn probability_pair(&self) -> Option<(f64, f64)> {
        match self.probabilities.as_deref() {
            Some([not, yes]) => Some((*not, *yes)),
            _ => None,
        }
    }
}

/// Content the result panel can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    /// Transient progress line, e.g. while a request is in flight.
    Status(String),
    Result(Box<ResultPayload>),
    Error(String),
}

/// Renders panel content as text.
#[derive(Debug, Clone, Copy)]
pub struct Presenter {
    format: OutputFormat,
    color: bool,
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new(OutputFormat::Human, true)
    }
}

impl Presenter {
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn render(&self, content: &PanelContent) -> anyhow::Result<String> {
        match (content, self.format) {
            (PanelContent::Result(payload), OutputFormat::Human) => self.render_human(payload),
            (PanelContent::Result(payload), OutputFormat::Json) => Ok(serde_json::to_string_pretty(
                &JsonResult::from(&**payload),
            )?),
            (PanelContent::Status(text), OutputFormat::Human) => Ok(format!("{text}\n")),
            (PanelContent::Error(text), OutputFormat::Human) => {
                Ok(format!("{}\n", self.paint(text, false)))
            }
            (PanelContent::Status(text), OutputFormat::Json) => {
                Ok(serde_json::to_string_pretty(&serde_json::json!({ "status": text }))?)
            }
            (PanelContent::Error(text), OutputFormat::Json) => {
                Ok(serde_json::to_string_pretty(&serde_json::json!({ "error": text }))?)
            }
        }
    }

    fn render_human(&self, payload: &ResultPayload) -> anyhow::Result<String> {
        let band = payload.band();
        let mut out = String::new();
        writeln!(out, "Model Used: {}", payload.model.display_name())?;
        if let (Some(label), Some(positive)) = (payload.verdict_label(), payload.is_exoplanet) {
            writeln!(out, "Result: {}", self.paint(label, positive))?;
        }
        writeln!(out, "Classification: {}", band.label())?;
        writeln!(out, "Confidence Score: {}/100", format_score(payload.score))?;
        if let Some((not, yes)) = payload.probability_pair() {
            writeln!(
                out,
                "Probabilities: Not Exoplanet: {:.1}%, Exoplanet: {:.1}%",
                not * 100.0,
                yes * 100.0
            )?;
        }
        writeln!(out)?;
        writeln!(out, "{}", band.message(payload.is_exoplanet))?;

        if let Some(file) = &payload.file {
            writeln!(out)?;
            writeln!(out, "File: {}", file.name)?;
            writeln!(out, "Rows Processed: {}", file.rows)?;
        }
        Ok(out)
    }

    fn paint(&self, text: &str, positive: bool) -> String {
        if !self.color {
            return text.to_string();
        }
        if positive {
            text.green().bold().to_string()
        } else {
            text.red().bold().to_string()
        }
    }
}

/// Whole scores print bare, anything else with one decimal.
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.1}")
    }
}

#[derive(Debug, Serialize)]
struct JsonResult<'a> {
    model: ModelKind,
    model_name: &'static str,
    score: f64,
    classification: ConfidenceBand,
    verdict: Option<&'static str>,
    is_exoplanet: Option<bool>,
    prediction: Option<&'a serde_json::Value>,
    probabilities: Option<&'a [f64]>,
    message: &'static str,
    file: Option<&'a FileSummary>,
}

impl<'a> From<&'a ResultPayload> for JsonResult<'a> {
    fn from(payload: &'a ResultPayload) -> Self {
        let band = payload.band();
        Self {
            model: payload.model,
            model_name: payload.model.display_name(),
            score: payload.score,
            classification: band,
            verdict: payload.verdict_label(),
            is_exoplanet: payload.is_exoplanet,
            prediction: payload.prediction.as_ref(),
            probabilities: payload.probabilities.as_deref(),
            message: band.message(payload.is_exoplanet),
            file: payload.file.as_ref(),
        }
    }
}
