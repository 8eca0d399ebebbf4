//! Terminal implementations of the scanner controls.

use std::io::{self, Write};

use colored::Colorize;
use exoscan_core::{
    gauge::{ArcStroke, StrokeStyle},
    DisplayMode, FilePanel, ModelKind, ModelTabs, OutputFormat, PanelContent, Presenter,
    ResultPanel,
};
use tracing::{debug, warn};

const BAR_WIDTH: usize = 30;

/// Prints panel content to stdout.
pub struct TerminalPanel {
    presenter: Presenter,
}

impl TerminalPanel {
    pub fn new(presenter: Presenter) -> Self {
        Self { presenter }
    }
}

impl ResultPanel for TerminalPanel {
    fn show(&mut self, content: PanelContent) {
        // progress lines would break machine-readable output
        if self.presenter.format() == OutputFormat::Json && matches!(content, PanelContent::Status(_))
        {
            return;
        }
        match self.presenter.render(&content) {
            Ok(text) => {
                let json = self.presenter.format() == OutputFormat::Json;
                if let Err(err) = write_panel(&mut io::stdout().lock(), &text, json) {
                    warn!(error = %err, "failed to write result panel to stdout");
                }
            }
            Err(err) => warn!(error = %err, "failed to render result panel"),
        }
    }
}

fn write_panel<W: Write>(out: &mut W, text: &str, json: bool) -> io::Result<()> {
    write!(out, "{text}")?;
    if json {
        writeln!(out)?;
    }
    out.flush()
}

/// Reports the staged upload.
pub struct TerminalFiles {
    quiet: bool,
}

impl TerminalFiles {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl FilePanel for TerminalFiles {
    fn set_mode(&mut self, mode: &DisplayMode) {
        match mode {
            DisplayMode::FileStaged { label } if !self.quiet => println!("Staged {label}"),
            DisplayMode::FileStaged { label } => debug!(%label, "file staged"),
            DisplayMode::NoFile => debug!("no file staged"),
        }
    }
}

pub struct TerminalTabs;

impl ModelTabs for TerminalTabs {
    fn set_active(&mut self, model: ModelKind) {
        debug!(model = model.id(), name = model.display_name(), "active model tab");
    }
}

/// Draws the meter as a single self-overwriting bar on stderr.
pub struct TerminalGauge {
    enabled: bool,
    color: bool,
    sweep: f64,
    tint: Option<&'static str>,
}

impl TerminalGauge {
    pub fn new(enabled: bool, color: bool) -> Self {
        Self {
            enabled,
            color,
            sweep: 0.0,
            tint: None,
        }
    }
}

impl exoscan_core::GaugeSurface for TerminalGauge {
    fn clear_rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {
        self.sweep = 0.0;
        self.tint = None;
    }

    fn stroke_arc(&mut self, arc: &ArcStroke) {
        // the track is solid; only the value arc carries a gradient
        if let StrokeStyle::Gradient(gradient) = &arc.style {
            self.sweep = arc.sweep();
            self.tint = gradient.stops.first().map(|(_, color)| *color);
        }
    }

    fn set_readout(&mut self, value: u32) {
        if !self.enabled {
            return;
        }
        let bar = render_bar(self.sweep, self.tint, value, self.color);
        let mut err = io::stderr().lock();
        let _ = write!(err, "\r{bar}");
        let _ = err.flush();
    }
}

/// `[██████░░░░]  42` with the filled part tinted by `tint` (a `#rrggbb` colour).
pub fn render_bar(sweep: f64, tint: Option<&str>, readout: u32, color: bool) -> String {
    let filled = ((sweep.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    let mut head = "█".repeat(filled);
    if color {
        if let Some((r, g, b)) = tint.and_then(parse_hex) {
            head = head.truecolor(r, g, b).to_string();
        }
    }
    let tail = "░".repeat(BAR_WIDTH - filled);
    format!("[{head}{tail}] {readout:>3}")
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        let bar = render_bar(0.5, None, 50, false);
        assert_eq!(bar.matches('█').count(), 15);
        assert_eq!(bar.matches('░').count(), 15);
        assert!(bar.ends_with(" 50"));
        assert_eq!(render_bar(1.0, None, 100, false).matches('░').count(), 0);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn panel_writes_surface_errors() {
        let mut buf = Vec::new();
        write_panel(&mut buf, "{}", true).unwrap();
        assert_eq!(buf, b"{}\n");

        let err = write_panel(&mut ClosedPipe, "Model Used: LightGBM\n", false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn parses_stop_colors() {
        assert_eq!(parse_hex("#22c55e"), Some((0x22, 0xc5, 0x5e)));
        assert_eq!(parse_hex("rgba(255, 255, 255, 0.1)"), None);
        assert_eq!(parse_hex("#fff"), None);
    }
}
