pub mod header_footer;
pub mod pagination;

pub use header_footer::layout_header_footer;
pub use pagination::{BreakAnalysis, check_child_fit, layout_document};

use crate::error::LayoutError;
use crate::flow::{FloatAlignment, FlowBlock};
use crate::text::Measure;

/// Horizontal position of floated content inside its container.
pub(crate) fn float_x(
    float: Option<FloatAlignment>,
    container_x: f32,
    container_width: f32,
    content_width: f32,
) -> f32 {
    match float {
        Some(FloatAlignment::Right) => container_x + (container_width - content_width).max(0.0),
        _ => container_x,
    }
}

pub(crate) fn kind_mismatch(block: &FlowBlock, measure: &Measure) -> LayoutError {
    LayoutError::MeasureKindMismatch(format!(
        "block '{}' is a {} but was measured as {}",
        block.id(),
        block.kind_name(),
        measure.kind_name()
    ))
}
