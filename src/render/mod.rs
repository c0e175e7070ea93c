//! Output of path geometry as canvas-style drawing commands and SVG path data.

pub mod svg;

pub use svg::svg_number;

use crate::math::Point2;

/// Receiver of canvas-style path drawing calls.
///
/// Angles and the `anticlockwise` flag follow the canvas `arc()` and
/// `ellipse()` conventions.
pub trait PathSink {
    fn move_to(&mut self, point: &Point2);

    fn line_to(&mut self, point: &Point2);

    fn quadratic_curve_to(&mut self, control: &Point2, end: &Point2);

    fn bezier_curve_to(&mut self, control1: &Point2, control2: &Point2, end: &Point2);

    fn arc(
        &mut self,
        center: &Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    );

    #[allow(clippy::too_many_arguments)]
    fn ellipse(
        &mut self,
        center: &Point2,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    );

    fn close_path(&mut self);
}

/// A single recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum PathCommand {
    MoveTo(Point2),
    LineTo(Point2),
    QuadraticCurveTo {
        control: Point2,
        end: Point2,
    },
    BezierCurveTo {
        control1: Point2,
        control2: Point2,
        end: Point2,
    },
    Arc {
        center: Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    },
    Ellipse {
        center: Point2,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    },
    ClosePath,
}

/// A [`PathSink`] that stores every call in order.
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    commands: Vec<PathCommand>,
}

impl CommandRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded commands.
    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Consumes the recorder, returning the commands.
    #[must_use]
    pub fn into_commands(self) -> Vec<PathCommand> {
        self.commands
    }
}

impl PathSink for CommandRecorder {
    fn move_to(&mut self, point: &Point2) {
        self.commands.push(PathCommand::MoveTo(*point));
    }

    fn line_to(&mut self, point: &Point2) {
        self.commands.push(PathCommand::LineTo(*point));
    }

    fn quadratic_curve_to(&mut self, control: &Point2, end: &Point2) {
        self.commands.push(PathCommand::QuadraticCurveTo {
            control: *control,
            end: *end,
        });
    }

    fn bezier_curve_to(&mut self, control1: &Point2, control2: &Point2, end: &Point2) {
        self.commands.push(PathCommand::BezierCurveTo {
            control1: *control1,
            control2: *control2,
            end: *end,
        });
    }

    fn arc(
        &mut self,
        center: &Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) {
        self.commands.push(PathCommand::Arc {
            center: *center,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        });
    }

    fn ellipse(
        &mut self,
        center: &Point2,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) {
        self.commands.push(PathCommand::Ellipse {
            center: *center,
            radius_x,
            radius_y,
            rotation,
            start_angle,
            end_angle,
            anticlockwise,
        });
    }

    fn close_path(&mut self) {
        self.commands.push(PathCommand::ClosePath);
    }
}
