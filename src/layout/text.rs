use crate::config::LayoutConfig;
use crate::text_metrics::TextMetrics;

use super::figure::Label;

pub(super) fn measure_label(text: &str, metrics: &TextMetrics) -> Label {
    let (width, height) = metrics.measure(text.trim());
    Label {
        text: text.trim().to_string(),
        width,
        height,
    }
}

/// Outer size of a rectangle-like shape around `label`.
pub(super) fn padded_size(label: &Label, config: &LayoutConfig) -> (f32, f32) {
    (label.width + config.margin_x, label.height + config.margin_y)
}

/// A diamond three label-lines tall, wide enough that the label fits the
/// rectangle inscribed at the label's height.
pub(super) fn diamond_size(label: &Label) -> (f32, f32) {
    let height = label.height * 3.0;
    let inner = height - label.height;
    if inner <= 0.0 {
        return (height, height);
    }
    let width = (label.width * height / inner).max(height);
    (width, height)
}

pub(super) fn terminal_radius(label: &Label, config: &LayoutConfig) -> f32 {
    (label.height + config.margin_x) / 2.0
}
