//! Measurement, line breaking, section analysis, and pagination of flow
//! documents into pages of positioned fragments.

pub mod algorithms;
pub mod cache;
pub mod config;
pub mod error;
pub mod flow;
pub mod measure;
pub mod output;
pub mod pm_range;
pub mod section;
pub mod text;

pub use self::algorithms::{layout_document, layout_header_footer};
pub use self::cache::{CacheStats, FontMetrics, FontMetricsCache, MeasurementCaches, TextWidthCache};
pub use self::config::LayoutConfig;
pub use self::error::LayoutError;
pub use self::flow::{
    FloatAlignment, FlowBlock, FlowDocument, ListMarker, ParagraphAttrs, ParagraphBlock, Run,
    TextRun,
};
pub use self::measure::{FaceMeasurer, FixedAdvanceMeasurer, FontSignature, TextMeasurer};
pub use self::output::{Fragment, FragmentKind, HeaderFooterLayout, Layout, Page};
pub use self::pm_range::{PmRange, compute_fragment_pm_range, compute_line_pm_range};
pub use self::section::{
    PageConfig, SectionBreakType, SectionProperties, SectionRange, SectionSignature,
    analyze_section_ranges, create_section_break_block, extract_body_section,
    extract_section_data, insert_section_breaks,
};
pub use self::text::{Line, Measure, MeasureContext, measure_block, measure_document};

// Re-export geometry types used in the output from base to prevent type mismatches
pub use folio_types::{BlockId, Rect, Size};

#[cfg(test)]
mod pagination_test;
#[cfg(test)]
mod section_test;
#[cfg(test)]
mod test_utils;
