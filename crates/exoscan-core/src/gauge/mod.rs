//! Semicircular confidence meter.
//!
//! The meter is a fixed-geometry arc over the lower half of a circle: angle `π`
//! maps to a score of 0 and `2π` to 100. Every frame strokes a faint background
//! track over the full span, then the value arc in a colour band picked by the
//! score. Drawing goes through [`GaugeSurface`] so the same frames can feed a
//! browser canvas, a terminal, or a recorder in tests.

use std::f64::consts::PI;

use serde::Serialize;

pub mod animation;

pub use animation::{animation_steps, GaugeAnimator, ANIMATION_STEPS, TICK_INTERVAL};

pub const CANVAS_WIDTH: f64 = 300.0;
pub const CANVAS_HEIGHT: f64 = 160.0;
pub const CENTER_X: f64 = 150.0;
pub const CENTER_Y: f64 = 150.0;
pub const RADIUS: f64 = 120.0;
pub const LINE_WIDTH: f64 = 20.0;
pub const START_ANGLE: f64 = PI;
pub const END_ANGLE: f64 = 2.0 * PI;
pub const TRACK_COLOR: &str = "rgba(255, 255, 255, 0.1)";

/// Horizontal span the value gradient is laid over, independent of the arc extent.
pub const GRADIENT_SPAN: (f64, f64) = (0.0, CANVAS_WIDTH);

/// Colour band of the value arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBand {
    /// Below 40: red to orange.
    Red,
    /// 40 up to 70: amber to yellow.
    Amber,
    /// 70 and above: green.
    Green,
}

impl ColorBand {
    pub fn from_value(value: f64) -> Self {
        if value < 40.0 {
            Self::Red
        } else if value < 70.0 {
            Self::Amber
        } else {
            Self::Green
        }
    }

    /// Gradient endpoints, left then right.
    pub fn stops(self) -> (&'static str, &'static str) {
        match self {
            Self::Red => ("#ef4444", "#f97316"),
            Self::Amber => ("#f59e0b", "#eab308"),
            Self::Green => ("#22c55e", "#10b981"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearGradient {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub stops: Vec<(f64, &'static str)>,
}

impl LinearGradient {
    fn for_band(band: ColorBand) -> Self {
        let (from, to) = band.stops();
        Self {
            x0: GRADIENT_SPAN.0,
            y0: 0.0,
            x1: GRADIENT_SPAN.1,
            y1: 0.0,
            stops: vec![(0.0, from), (1.0, to)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeStyle {
    Solid(&'static str),
    Gradient(LinearGradient),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    Butt,
    Round,
}

/// One stroked arc, in canvas coordinates and radians.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcStroke {
    pub center: (f64, f64),
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub line_width: f64,
    pub style: StrokeStyle,
    pub cap: LineCap,
}

impl ArcStroke {
    /// Fraction of the half circle this arc covers.
    pub fn sweep(&self) -> f64 {
        ((self.end_angle - self.start_angle) / (END_ANGLE - START_ANGLE)).clamp(0.0, 1.0)
    }
}

/// Everything needed to paint the meter for a single value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeFrame {
    pub value: f64,
    pub band: ColorBand,
    pub track: ArcStroke,
    pub value_arc: ArcStroke,
    /// Integer shown under the meter.
    pub readout: u32,
}

impl GaugeFrame {
    /// Lay out a frame for `value`, clamped to `[0, 100]`.
    pub fn for_value(value: f64) -> Self {
        let value = clamp_score(value);
        let band = ColorBand::from_value(value);
        let track = ArcStroke {
            center: (CENTER_X, CENTER_Y),
            radius: RADIUS,
            start_angle: START_ANGLE,
            end_angle: END_ANGLE,
            line_width: LINE_WIDTH,
            style: StrokeStyle::Solid(TRACK_COLOR),
            cap: LineCap::Butt,
        };
        let value_arc = ArcStroke {
            end_angle: value_angle(value),
            style: StrokeStyle::Gradient(LinearGradient::for_band(band)),
            cap: LineCap::Round,
            ..track.clone()
        };
        Self {
            value,
            band,
            track,
            value_arc,
            readout: value.round() as u32,
        }
    }
}

/// Angle at which the value arc ends.
pub fn value_angle(value: f64) -> f64 {
    START_ANGLE + (END_ANGLE - START_ANGLE) * (value / 100.0)
}

/// Clamp any score into the meter range. NaN reads as zero.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// Drawing target for the meter, e.g. a 2D canvas context plus the readout label.
pub trait GaugeSurface: Send {
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn stroke_arc(&mut self, arc: &ArcStroke);

    fn set_readout(&mut self, value: u32);
}

/// Paint one frame: clear, track, value arc, readout.
pub fn draw_gauge<S: GaugeSurface + ?Sized>(surface: &mut S, value: f64) -> GaugeFrame {
    let frame = GaugeFrame::for_value(value);
    surface.clear_rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);
    surface.stroke_arc(&frame.track);
    surface.stroke_arc(&frame.value_arc);
    surface.set_readout(frame.readout);
    frame
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawOp {
        Clear,
        Arc(ArcStroke),
        Readout(u32),
    }

    /// Surface that records every call.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub ops: Vec<DrawOp>,
    }

    impl RecordingSurface {
        pub fn readouts(&self) -> Vec<u32> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Readout(v) => Some(*v),
                    _ => None,
                })
                .collect()
        }
    }

    impl GaugeSurface for RecordingSurface {
        fn clear_rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {
            self.ops.push(DrawOp::Clear);
        }

        fn stroke_arc(&mut self, arc: &ArcStroke) {
            self.ops.push(DrawOp::Arc(arc.clone()));
        }

        fn set_readout(&mut self, value: u32) {
            self.ops.push(DrawOp::Readout(value));
        }
    }
}
