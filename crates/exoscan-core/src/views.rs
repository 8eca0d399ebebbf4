//! Controls the controller drives. A front end hands implementations in at construction.

use crate::input::DisplayMode;
use crate::model::ModelKind;
use crate::presenter::PanelContent;

/// The result block under the gauge.
pub trait ResultPanel: Send {
    fn show(&mut self, content: PanelContent);
}

/// Drop zone, file info row and the "analyze file" button.
pub trait FilePanel: Send {
    fn set_mode(&mut self, mode: &DisplayMode);
}

/// Model tab strip plus the "selected model" caption.
pub trait ModelTabs: Send {
    fn set_active(&mut self, model: ModelKind);
}

/// The set of controls besides the gauge.
pub struct Views {
    pub results: Box<dyn ResultPanel>,
    pub file: Box<dyn FilePanel>,
    pub tabs: Box<dyn ModelTabs>,
}
