//! Styled text runs and colours.

use crate::render::font_metrics::{get_metrics, Font};

/// An RGB fill colour with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as `rg` operands in 0..=1, rounded to three decimals.
    pub fn components(self) -> [f32; 3] {
        [self.r, self.g, self.b].map(|c| (f32::from(c) / 255.0 * 1000.0).round() / 1000.0)
    }
}

/// One fragment of text with its complete style.
///
/// Every run carries its own font, size and colour, so nothing set for one run
/// leaks into the next.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font: Font,
    pub size: f32,
    pub color: Color,
    pub underline: bool,
}

impl TextRun {
    /// Regular-weight black text.
    pub fn plain(text: impl Into<String>, size: f32) -> Self {
        Self {
            text: text.into(),
            font: Font::Helvetica,
            size,
            color: Color::BLACK,
            underline: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.font = Font::HelveticaBold;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn underlined(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Same style, different text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    pub fn width(&self) -> f32 {
        get_metrics(self.font).measure_str(&self.text, self.size)
    }
}
