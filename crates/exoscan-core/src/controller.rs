use std::sync::Arc;

use anyhow::Result as AnyResult;
use tracing::{debug, info, instrument};

use crate::dispatch::{HeuristicPredictor, Predictor, RemotePredictor};
use crate::error::ScannerError;
use crate::gauge::{GaugeAnimator, GaugeSurface};
use crate::input::{count_rows, validate_manual_fields, FileCandidate, InputManager, ManualEntry};
use crate::model::ModelKind;
use crate::presenter::{FileSummary, PanelContent, ResultPayload};
use crate::settings::{ManualStrategy, ScannerSettings};
use crate::views::Views;

/// Which analyze action produced the current panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    File,
    Manual,
}

/// UI phase. Errors reuse `ResultShown`; there is no separate error phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FileStaged,
    FieldsComplete,
    Analyzing(Source),
    ResultShown(Source),
}

/// Mutable UI state, written only through the controller's handlers.
#[derive(Debug)]
pub struct ScannerState {
    pub selected_model: ModelKind,
    pub inputs: InputManager,
    pub phase: Phase,
}

impl ScannerState {
    fn new(model: ModelKind) -> Self {
        Self {
            selected_model: model,
            inputs: InputManager::new(),
            phase: Phase::Idle,
        }
    }
}

/// Event handlers behind the scanner page.
pub struct ScannerController<S: GaugeSurface + 'static> {
    state: ScannerState,
    strategy: ManualStrategy,
    views: Views,
    gauge: GaugeAnimator<S>,
    remote: Arc<dyn Predictor>,
    heuristic: Arc<HeuristicPredictor>,
    animate: bool,
}

impl<S: GaugeSurface + 'static> ScannerController<S> {
    /// Controller talking to the endpoint named in `settings`.
    pub fn new(settings: &ScannerSettings, views: Views, surface: S) -> AnyResult<Self> {
        let remote = Arc::new(RemotePredictor::new(settings)?);
        Ok(Self::with_predictors(
            settings,
            views,
            GaugeAnimator::new(surface),
            remote,
            Arc::new(HeuristicPredictor::new()),
        ))
    }

    pub fn with_predictors(
        settings: &ScannerSettings,
        mut views: Views,
        gauge: GaugeAnimator<S>,
        remote: Arc<dyn Predictor>,
        heuristic: Arc<HeuristicPredictor>,
    ) -> Self {
        let state = ScannerState::new(settings.model);
        views.tabs.set_active(state.selected_model);
        views.file.set_mode(&state.inputs.display_mode());
        Self {
            state,
            strategy: settings.manual_strategy,
            views,
            gauge,
            remote,
            heuristic,
            animate: true,
        }
    }

    /// Sweep the gauge on results (default) or jump straight to the value.
    pub fn set_animate(&mut self, animate: bool) {
        self.animate = animate;
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    pub fn strategy(&self) -> ManualStrategy {
        self.strategy
    }

    pub fn gauge(&self) -> &GaugeAnimator<S> {
        &self.gauge
    }

    /// Wait until the gauge has finished its sweep.
    pub async fn gauge_finished(&mut self) {
        self.gauge.finished().await;
    }

    /// Model tab clicked.
    pub fn select_model(&mut self, model: ModelKind) {
        debug!(model = model.id(), "model selected");
        self.state.selected_model = model;
        self.views.tabs.set_active(model);
    }

    /// File picked or dropped.
    pub fn select_file(&mut self, candidate: FileCandidate) -> Result<(), ScannerError> {
        if let Err(err) = self.state.inputs.select_file(candidate).map(|_| ()) {
            return Err(self.fail(err.into()));
        }
        self.views.file.set_mode(&self.state.inputs.display_mode());
        self.transition(Phase::FileStaged);
        Ok(())
    }

    /// Remove button clicked.
    pub fn clear_file(&mut self) {
        self.state.inputs.clear_file();
        self.views.file.set_mode(&self.state.inputs.display_mode());
        if self.state.phase == Phase::FileStaged {
            self.transition(Phase::Idle);
        }
    }

    /// Manual form edited. Returns whether the form is complete for the active strategy.
    pub fn update_fields(&mut self, entry: &ManualEntry) -> bool {
        let complete = validate_manual_fields(entry, self.strategy.required_fields()).is_ok();
        match (complete, self.state.phase) {
            (true, Phase::Idle | Phase::ResultShown(_)) => self.transition(Phase::FieldsComplete),
            (false, Phase::FieldsComplete) => self.transition(Phase::Idle),
            _ => {}
        }
        complete
    }

    /// "Analyze file" clicked. Does nothing when no file is staged.
    #[instrument(name = "analyze_file", skip(self))]
    pub async fn analyze_file(&mut self) -> Result<Option<ResultPayload>, ScannerError> {
        let Some(file) = self.state.inputs.staged().cloned() else {
            return Ok(None);
        };
        self.transition(Phase::Analyzing(Source::File));
        self.views
            .results
            .show(PanelContent::Status("Analyzing CSV data...".into()));

        let bytes = match tokio::fs::read(&file.path).await {
            Ok(bytes) => bytes,
            Err(source) => {
                self.state.inputs.clear_file();
                self.views.file.set_mode(&self.state.inputs.display_mode());
                self.transition(Phase::Idle);
                return Err(self.fail(ScannerError::ReadFailed {
                    path: file.path,
                    source,
                }));
            }
        };
        let rows = count_rows(&String::from_utf8_lossy(&bytes));
        let score = self.heuristic.file_score();
        info!(file = %file.name, rows, score, "file analyzed");

        let payload = ResultPayload {
            file: Some(FileSummary {
                name: file.name,
                rows,
            }),
            ..ResultPayload::new(score, self.state.selected_model)
        };
        self.show_result(&payload, Source::File);
        Ok(Some(payload))
    }

    /// "Analyze" clicked on the manual form.
    #[instrument(name = "analyze_manual", skip(self, entry), fields(strategy = %self.strategy))]
    pub async fn analyze_manual(
        &mut self,
        entry: &ManualEntry,
    ) -> Result<ResultPayload, ScannerError> {
        let record = validate_manual_fields(entry, self.strategy.required_fields())
            .map_err(|err| self.fail(err.into()))?;

        let model = self.state.selected_model;
        self.transition(Phase::Analyzing(Source::Manual));
        self.views.results.show(PanelContent::Status(format!(
            "Analyzing data with {}...",
            model.display_name()
        )));

        let outcome = match self.strategy {
            ManualStrategy::Remote => self.remote.predict(model, &record).await,
            ManualStrategy::Heuristic => self.heuristic.predict(model, &record).await,
        };
        match outcome {
            Ok(prediction) => {
                let payload = prediction.into_payload(model);
                self.show_result(&payload, Source::Manual);
                Ok(payload)
            }
            Err(err) => {
                self.transition(Phase::ResultShown(Source::Manual));
                Err(self.fail(err.into()))
            }
        }
    }

    fn show_result(&mut self, payload: &ResultPayload, source: Source) {
        if self.animate {
            self.gauge.animate(payload.score);
        } else {
            self.gauge.draw_now(payload.score);
        }
        self.views
            .results
            .show(PanelContent::Result(Box::new(payload.clone())));
        self.transition(Phase::ResultShown(source));
    }

    fn fail(&mut self, err: ScannerError) -> ScannerError {
        debug!(error = %err, "showing error in result panel");
        self.views
            .results
            .show(PanelContent::Error(err.user_message()));
        err
    }

    fn transition(&mut self, next: Phase) {
        if self.state.phase != next {
            debug!(from = ?self.state.phase, to = ?next, "phase change");
            self.state.phase = next;
        }
    }
}
