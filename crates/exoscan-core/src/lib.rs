pub mod controller;
pub mod dispatch;
pub mod error;
pub mod gauge;
pub mod input;
pub mod model;
pub mod presenter;
pub mod settings;
pub mod views;

pub use controller::{Phase, ScannerController, ScannerState, Source};
pub use dispatch::{DispatchError, HeuristicPredictor, Prediction, Predictor, RemotePredictor};
pub use error::ScannerError;
pub use gauge::{ArcStroke, ColorBand, GaugeAnimator, GaugeFrame, GaugeSurface};
pub use input::{
    DisplayMode, FileCandidate, InputError, InputManager, ManualEntry, ManualField, ManualRecord,
};
pub use model::{ModelKind, UnknownModel};
pub use presenter::{
    ConfidenceBand, FileSummary, OutputFormat, PanelContent, Presenter, ResultPayload,
};
pub use settings::{ManualStrategy, ScannerSettings};
pub use views::{FilePanel, ModelTabs, ResultPanel, Views};
