//! The 2D drawing capability set.
//!
//! The operation set mirrors what guest programs are allowed to issue:
//! style setters, fill/stroke shapes, path construction, transforms, and
//! context lifecycle. Every operation is side-effecting only and returns
//! nothing, so it stays cheap to invoke once per guest-drawn primitive.

use serde::Serialize;

/// The drawing capability set exposed to the guest.
///
/// Implementations mutate whatever backing store they own (a raster target,
/// a display list, a test recording). None of the operations may fail: a
/// surface that cannot honor an operation drops it silently.
pub trait Context2D: Send {
    // Style setters
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_fill_style(&mut self, style: &str);
    fn set_stroke_style(&mut self, style: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_font(&mut self, font: &str);

    // Fill/stroke operations
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill(&mut self);
    fn stroke(&mut self);

    // Path construction
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    fn clip(&mut self);

    // Transforms
    fn rotate(&mut self, angle: f64);
    fn scale(&mut self, x: f64, y: f64);
    fn translate(&mut self, x: f64, y: f64);
    #[allow(clippy::too_many_arguments)]
    fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64);
    #[allow(clippy::too_many_arguments)]
    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64);
    fn reset_transform(&mut self);

    // Context lifecycle
    fn save(&mut self);
    fn restore(&mut self);
    fn reset(&mut self);
}

/// A recorded drawing command.
///
/// One variant per [`Context2D`] operation, in issue order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    GlobalAlpha { alpha: f64 },
    FillStyle { style: String },
    StrokeStyle { style: String },
    LineWidth { width: f64 },
    Font { font: String },
    FillText { text: String, x: f64, y: f64 },
    FillRect { x: f64, y: f64, width: f64, height: f64 },
    StrokeRect { x: f64, y: f64, width: f64, height: f64 },
    Fill,
    Stroke,
    BeginPath,
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    ClosePath,
    Clip,
    Rotate { angle: f64 },
    Scale { x: f64, y: f64 },
    Translate { x: f64, y: f64 },
    Transform { a: f64, b: f64, c: f64, d: f64, e: f64, f: f64 },
    SetTransform { a: f64, b: f64, c: f64, d: f64, e: f64, f: f64 },
    ResetTransform,
    Save,
    Restore,
    Reset,
}

/// A surface that records every command it receives.
///
/// Used as the reference implementation in tests and by the CLI to dump
/// what a guest program drew.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands recorded so far, in issue order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the surface empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

impl Context2D for RecordingSurface {
    fn set_global_alpha(&mut self, alpha: f64) {
        self.push(DrawCommand::GlobalAlpha { alpha });
    }

    fn set_fill_style(&mut self, style: &str) {
        self.push(DrawCommand::FillStyle { style: style.to_string() });
    }

    fn set_stroke_style(&mut self, style: &str) {
        self.push(DrawCommand::StrokeStyle { style: style.to_string() });
    }

    fn set_line_width(&mut self, width: f64) {
        self.push(DrawCommand::LineWidth { width });
    }

    fn set_font(&mut self, font: &str) {
        self.push(DrawCommand::Font { font: font.to_string() });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.push(DrawCommand::FillText { text: text.to_string(), x, y });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawCommand::FillRect { x, y, width, height });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawCommand::StrokeRect { x, y, width, height });
    }

    fn fill(&mut self) {
        self.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.push(DrawCommand::Stroke);
    }

    fn begin_path(&mut self) {
        self.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::LineTo { x, y });
    }

    fn close_path(&mut self) {
        self.push(DrawCommand::ClosePath);
    }

    fn clip(&mut self) {
        self.push(DrawCommand::Clip);
    }

    fn rotate(&mut self, angle: f64) {
        self.push(DrawCommand::Rotate { angle });
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::Scale { x, y });
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::Translate { x, y });
    }

    fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.push(DrawCommand::Transform { a, b, c, d, e, f });
    }

    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.push(DrawCommand::SetTransform { a, b, c, d, e, f });
    }

    fn reset_transform(&mut self) {
        self.push(DrawCommand::ResetTransform);
    }

    fn save(&mut self) {
        self.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.push(DrawCommand::Restore);
    }

    fn reset(&mut self) {
        self.push(DrawCommand::Reset);
    }
}
