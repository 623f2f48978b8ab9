use crate::cache::MeasurementCaches;
use crate::config::LayoutConfig;
use crate::flow::{FlowBlock, ParagraphBlock, Run, TextRun};
use crate::measure::{FixedAdvanceMeasurer, FontSignature, GlyphBounds, MeasureError, TextMeasurer};
use crate::section::{ColumnConfig, PageConfig, PageMargins};
use crate::text::{Measure, MeasureContext, ParagraphMeasure, measure_block, measure_paragraph};
use folio_types::Size;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 10px test font. With the default fixed measurer every character is 5px
/// wide and every line 10px tall.
pub fn test_font() -> FontSignature {
    FontSignature::new("Test", 10.0)
}

/// A measurer fixture owning its caches and configuration.
pub struct Harness {
    pub config: LayoutConfig,
    pub caches: MeasurementCaches,
    pub measurer: FixedAdvanceMeasurer,
}

impl Harness {
    pub fn new() -> Self {
        let config = LayoutConfig {
            default_font: test_font(),
            ..LayoutConfig::default()
        };
        Self {
            caches: MeasurementCaches::new(&config),
            config,
            measurer: FixedAdvanceMeasurer::default(),
        }
    }

    pub fn ctx(&self) -> MeasureContext<'_> {
        MeasureContext::new(&self.caches, &self.measurer, &self.config)
    }

    pub fn paragraph(&self, block: &ParagraphBlock, width: f32) -> ParagraphMeasure {
        measure_paragraph(block, width, &self.ctx()).unwrap()
    }

    pub fn measure_all(&self, blocks: &[FlowBlock], width: f32) -> Vec<Measure> {
        blocks
            .iter()
            .map(|b| measure_block(b, width, &self.ctx()).unwrap())
            .collect()
    }
}

pub fn text_run(text: &str, src_start: usize) -> Run {
    Run::Text(TextRun {
        text: text.to_string(),
        src_start: Some(src_start),
        ..Default::default()
    })
}

/// A paragraph with one text run starting at document position 1.
pub fn create_paragraph(id: &str, text: &str) -> ParagraphBlock {
    ParagraphBlock::new(id, vec![text_run(text, 1)])
}

/// `lines` lines of 10px each at width 100 (every word fills a line).
pub fn paragraph_of_lines(id: &str, lines: usize) -> FlowBlock {
    let text = vec!["aaaaaaaaaaaaaaaaaaaa"; lines].join(" ");
    FlowBlock::Paragraph(create_paragraph(id, &text))
}

/// A page whose single column is `width` × `height` with no margins.
pub fn page_config(width: f32, height: f32) -> PageConfig {
    PageConfig {
        page_size: Size::new(width, height),
        margins: PageMargins {
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
            left: 0.0,
            header: 0.0,
            footer: 0.0,
        },
        columns: ColumnConfig { count: 1, gap: 0.0 },
    }
}

/// Counts calls and fails on demand.
#[derive(Default)]
pub struct CountingMeasurer {
    pub calls: AtomicUsize,
    pub fail: bool,
    pub zero_bounds: bool,
}

impl CountingMeasurer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextMeasurer for CountingMeasurer {
    fn measure_width(&self, text: &str, font: &FontSignature) -> Result<f32, MeasureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MeasureError::Unavailable("offline".into()));
        }
        FixedAdvanceMeasurer::default().measure_width(text, font)
    }

    fn glyph_bounds(
        &self,
        text: &str,
        font: &FontSignature,
    ) -> Result<Option<GlyphBounds>, MeasureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MeasureError::Unavailable("offline".into()));
        }
        if self.zero_bounds {
            return Ok(Some(GlyphBounds {
                ascent: 0.0,
                descent: 0.0,
            }));
        }
        FixedAdvanceMeasurer::default().glyph_bounds(text, font)
    }
}
