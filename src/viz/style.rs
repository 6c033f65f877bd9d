//! Explicit plot styling configuration
//!
//! Styling travels with each rendering call instead of living in process-wide
//! state, so callers can mix styles within one run.

use plotters::style::RGBColor;

/// Styling applied to every chart.
#[derive(Debug, Clone)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    /// Fill color for bars, lines and boxes.
    pub primary: RGBColor,
    /// Accent color for secondary series.
    pub accent: RGBColor,
    pub caption_size: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            primary: RGBColor(31, 119, 180),
            accent: RGBColor(255, 127, 14),
            caption_size: 24,
        }
    }
}
