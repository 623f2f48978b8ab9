// src/session.rs
//!
//! A [`LayoutSession`] owns everything that lives as long as one loaded
//! document: the style context, both measurement caches, the numbering
//! counters, the SDT memo, and the version tracker. A layout pass runs the
//! whole pipeline:
//!
//! ```text
//! FlowDocument ─> styles ─> numbering ─> sections ─> measure ─> paginate ─> headers/footers
//! ```

use crate::error::Result;
use crate::version::{
    DocumentVersion, LayoutEvent, LayoutEventBus, LayoutEventSender, VersionTracker,
};
use folio_layout::{
    FixedAdvanceMeasurer, FlowBlock, FlowDocument, FontSignature, HeaderFooterLayout, Layout,
    LayoutConfig, ListMarker, Measure, MeasureContext, MeasurementCaches, Page, ParagraphBlock,
    TextMeasurer, analyze_section_ranges, insert_section_breaks, layout_document,
    layout_header_footer, measure_block, measure_document,
};
use folio_style::{
    CounterOptions, NumberingCounters, NumberingStyle, ResolveOptions, RunProperties,
    SdtMetadataCache, StyleContext, format_marker, level_formats, resolve_numbering,
    resolve_style, resolve_table_cell_style,
};
use folio_types::units::{half_points_to_pt, pt_to_px};
use itertools::Itertools;
use std::collections::HashMap;
use std::sync::Arc;

/// The result of one layout pass, tagged with the document version it was
/// computed against.
#[derive(Debug, Clone)]
pub struct LayoutPass {
    pub version: DocumentVersion,
    pub layout: Layout,
    /// Blocks as paginated: styles applied, markers set, section breaks inserted.
    pub blocks: Vec<FlowBlock>,
    /// `measures[i]` is the measure of `blocks[i]`.
    pub measures: Vec<Measure>,
}

pub struct LayoutSession {
    config: LayoutConfig,
    styles: StyleContext,
    caches: MeasurementCaches,
    counters: NumberingCounters,
    sdt_cache: SdtMetadataCache,
    measurer: Arc<dyn TextMeasurer>,
    version: DocumentVersion,
    tracker: VersionTracker,
    events: LayoutEventBus,
}

impl LayoutSession {
    pub fn new(config: LayoutConfig, styles: StyleContext, measurer: Arc<dyn TextMeasurer>) -> Self {
        let caches = MeasurementCaches::new(&config);
        let counters = NumberingCounters::from_context(&styles, CounterOptions::default());
        Self {
            config,
            styles,
            caches,
            counters,
            sdt_cache: SdtMetadataCache::new(),
            measurer,
            version: DocumentVersion::default(),
            tracker: VersionTracker::new(),
            events: LayoutEventBus::new(),
        }
    }

    /// Builds a session from JSON configuration and style context.
    pub fn from_json(
        config_json: &str,
        styles_json: &str,
        measurer: Arc<dyn TextMeasurer>,
    ) -> Result<Self> {
        let config: LayoutConfig = serde_json::from_str(config_json)?;
        let styles: StyleContext = serde_json::from_str(styles_json)?;
        Ok(Self::new(config, styles, measurer))
    }

    /// Switches to a newly loaded document's style context. Numbering counters
    /// and the SDT memo belong to the old document and are dropped; font caches
    /// are kept.
    pub fn reload(&mut self, styles: StyleContext) {
        self.counters.reset();
        self.counters.load_context(&styles);
        self.sdt_cache.clear();
        self.styles = styles;
        log::debug!("Session reloaded; numbering counters and SDT cache cleared");
    }

    pub fn clear_font_caches(&self) {
        self.caches.clear();
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn styles(&self) -> &StyleContext {
        &self.styles
    }

    pub fn caches(&self) -> &MeasurementCaches {
        &self.caches
    }

    pub fn sdt_cache(&self) -> &SdtMetadataCache {
        &self.sdt_cache
    }

    pub fn version(&self) -> DocumentVersion {
        self.version
    }

    /// Records a document edit and returns the new version.
    pub fn note_edit(&mut self) -> DocumentVersion {
        let version = self.version.bump();
        self.events.publish(LayoutEvent::invalidated(version));
        version
    }

    /// Sender for layout passes completed elsewhere.
    pub fn event_sender(&self) -> LayoutEventSender {
        self.events.sender()
    }

    /// The tracker after folding in every pending event.
    pub fn tracker(&mut self) -> &VersionTracker {
        self.events.drain_into(&mut self.tracker);
        &self.tracker
    }

    pub fn is_stale(&mut self) -> bool {
        self.tracker().is_stale()
    }

    /// Lays out `doc` as of `version` and reports the completion to the tracker.
    pub fn layout(&mut self, doc: &FlowDocument, version: DocumentVersion) -> Result<LayoutPass> {
        let mut blocks = doc.blocks.clone();
        self.apply_styles(&mut blocks);
        self.apply_numbering(&mut blocks)?;
        collapse_contextual_spacing(&mut blocks);

        let ranges = analyze_section_ranges(&blocks, doc.body_section.as_ref());
        let initial = ranges
            .first()
            .map(|range| range.signature.page)
            .unwrap_or_default();
        let blocks = insert_section_breaks(blocks, &ranges);

        let ctx = MeasureContext::new(&self.caches, self.measurer.as_ref(), &self.config);
        let measures = measure_document(&blocks, &initial, &ctx)?;
        let mut layout = layout_document(&blocks, &measures, &initial)?;

        let header_refs = layout
            .pages
            .iter()
            .filter_map(|page| page.header_ref.clone().map(|id| (id, content_width(page))))
            .unique_by(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        layout.headers = self.layout_regions(&doc.headers, header_refs)?;

        let footer_refs = layout
            .pages
            .iter()
            .filter_map(|page| page.footer_ref.clone().map(|id| (id, content_width(page))))
            .unique_by(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        layout.footers = self.layout_regions(&doc.footers, footer_refs)?;

        log::debug!(
            "Layout {} finished: {} blocks on {} page(s)",
            version,
            blocks.len(),
            layout.page_count()
        );
        self.events.publish(LayoutEvent::ready(version));
        self.events.drain_into(&mut self.tracker);

        Ok(LayoutPass {
            version,
            layout,
            blocks,
            measures,
        })
    }

    fn resolve_options(&self) -> ResolveOptions<'_> {
        ResolveOptions {
            sdt_cache: Some(&self.sdt_cache),
            skip_sdt: false,
        }
    }

    fn style_paragraph(&self, paragraph: &mut ParagraphBlock) {
        if let Some(node) = &paragraph.style {
            let computed = resolve_style(node, &self.styles, self.resolve_options());
            paragraph.attrs.apply_computed(&computed);
        } else if let Some(sdt) = &paragraph.attrs.sdt {
            paragraph.attrs.sdt_metadata = Some(self.sdt_cache.resolve(sdt));
        }
    }

    fn apply_styles(&self, blocks: &mut [FlowBlock]) {
        for block in blocks {
            match block {
                FlowBlock::Paragraph(paragraph) => self.style_paragraph(paragraph),
                FlowBlock::List(list) => {
                    for item in &mut list.items {
                        self.style_paragraph(item);
                    }
                }
                FlowBlock::Table(table) => {
                    for cell in table.rows.iter_mut().flat_map(|row| row.cells.iter_mut()) {
                        let cell_style = cell
                            .style
                            .as_ref()
                            .map(|node| resolve_table_cell_style(node, &self.styles));
                        for paragraph in &mut cell.paragraphs {
                            match &cell_style {
                                Some(computed) if paragraph.style.is_none() => {
                                    paragraph.attrs.fill_unset(computed)
                                }
                                _ => self.style_paragraph(paragraph),
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Computes list markers in document order, including paragraphs inside
    /// list items and table cells.
    ///
    /// Counters are keyed by the paragraph's document position. Keys must grow
    /// in document order, so a paragraph without a position (or with one that
    /// went backwards) takes the key right after its predecessor.
    fn apply_numbering(&mut self, blocks: &mut [FlowBlock]) -> Result<()> {
        self.counters.clear();
        let mut next_key = 0usize;
        for block in blocks {
            let paragraphs: Vec<&mut ParagraphBlock> = match block {
                FlowBlock::Paragraph(paragraph) => vec![paragraph],
                FlowBlock::List(list) => list.items.iter_mut().collect(),
                FlowBlock::Table(table) => table
                    .rows
                    .iter_mut()
                    .flat_map(|row| row.cells.iter_mut())
                    .flat_map(|cell| cell.paragraphs.iter_mut())
                    .collect(),
                _ => continue,
            };
            for paragraph in paragraphs {
                let position = paragraph
                    .src_start()
                    .map_or(next_key, |src| src.max(next_key));
                next_key = position + 1;
                self.number_paragraph(paragraph, position as i64)?;
            }
        }
        Ok(())
    }

    fn number_paragraph(&mut self, paragraph: &mut ParagraphBlock, position: i64) -> Result<()> {
        let Some(reference) = paragraph.attrs.numbering.filter(|r| r.num_id != 0) else {
            return Ok(());
        };
        let Some(numbering) = resolve_numbering(reference.num_id, reference.level, &self.styles)
        else {
            log::debug!(
                "Paragraph '{}' references unknown numbering {}/{}",
                paragraph.id,
                reference.num_id,
                reference.level
            );
            return Ok(());
        };

        let path = self.counters.calculate_path(
            numbering.num_id,
            numbering.level,
            position,
            numbering.abstract_id,
        )?;
        if let Some(&value) = path.last() {
            self.counters.record_counter(
                numbering.num_id,
                numbering.level,
                position,
                value,
                numbering.abstract_id,
            )?;
        }

        let formats = level_formats(numbering.num_id, numbering.level, &self.styles);
        let text = format_marker(&numbering.text, &path, &formats);
        if paragraph.style.is_none() {
            apply_numbering_indent(paragraph, &numbering);
        }
        if text.is_empty() {
            paragraph.attrs.marker = None;
            return Ok(());
        }
        let base = paragraph.attrs.font.as_ref().unwrap_or(&self.config.default_font);
        let font = numbering.run.as_ref().map(|run| marker_font(base, run));
        paragraph.attrs.marker = Some(ListMarker {
            text,
            suffix: numbering.suffix,
            font,
        });
        Ok(())
    }

    /// Lays out each referenced header or footer at the content width of the
    /// first page that shows it.
    fn layout_regions(
        &self,
        sources: &HashMap<String, Vec<FlowBlock>>,
        refs: Vec<(String, f32)>,
    ) -> Result<HashMap<String, HeaderFooterLayout>> {
        let ctx = MeasureContext::new(&self.caches, self.measurer.as_ref(), &self.config);
        let mut regions = HashMap::new();
        for (id, width) in refs {
            let Some(source) = sources.get(&id) else {
                log::warn!("Header/footer '{}' is referenced but not defined", id);
                continue;
            };
            let mut blocks = source.clone();
            self.apply_styles(&mut blocks);
            collapse_contextual_spacing(&mut blocks);
            let measures = blocks
                .iter()
                .map(|block| measure_block(block, width, &ctx))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            regions.insert(id, layout_header_footer(&blocks, &measures, width)?);
        }
        Ok(regions)
    }
}

fn content_width(page: &Page) -> f32 {
    (page.size.width - page.margins.left - page.margins.right).max(0.0)
}

/// Drops the spacing between adjacent paragraphs of the same style when
/// either side asks for contextual spacing. Only top-level paragraph runs and
/// the items of one list count as adjacent.
fn collapse_contextual_spacing(blocks: &mut [FlowBlock]) {
    {
        let groups = blocks
            .iter_mut()
            .chunk_by(|block| matches!(block, FlowBlock::Paragraph(_)));
        for (is_paragraph, group) in &groups {
            if !is_paragraph {
                continue;
            }
            let mut run: Vec<&mut ParagraphBlock> = group
                .filter_map(|block| match block {
                    FlowBlock::Paragraph(paragraph) => Some(paragraph),
                    _ => None,
                })
                .collect();
            collapse_adjacent(&mut run);
        }
    }

    for block in blocks.iter_mut() {
        if let FlowBlock::List(list) = block {
            let mut items: Vec<&mut ParagraphBlock> = list.items.iter_mut().collect();
            collapse_adjacent(&mut items);
        }
    }
}

fn collapse_adjacent(paragraphs: &mut [&mut ParagraphBlock]) {
    for idx in 1..paragraphs.len() {
        let (head, tail) = paragraphs.split_at_mut(idx);
        let prev = &mut head[idx - 1].attrs;
        let next = &mut tail[0].attrs;
        if prev.style_id.is_none() || prev.style_id != next.style_id {
            continue;
        }
        if prev.contextual_spacing {
            prev.spacing.after = 0.0;
        }
        if next.contextual_spacing {
            next.spacing.before = 0.0;
        }
    }
}

fn apply_numbering_indent(paragraph: &mut ParagraphBlock, numbering: &NumberingStyle) {
    let indent = &mut paragraph.attrs.indent;
    if numbering.indent_left > 0.0 {
        indent.left = numbering.indent_left;
    }
    if numbering.indent_hanging > 0.0 {
        indent.hanging = numbering.indent_hanging;
        indent.first_line = 0.0;
    }
}

/// The paragraph font with the numbering level's run properties on top.
fn marker_font(base: &FontSignature, run: &RunProperties) -> FontSignature {
    let family = run.font_family.clone().unwrap_or_else(|| base.family.clone());
    let size = run
        .size
        .map(|half_points| pt_to_px(half_points_to_pt(half_points)))
        .filter(|size| *size > 0.0)
        .unwrap_or(base.size);
    FontSignature::new(family, size)
        .bold(run.bold.unwrap_or(base.bold))
        .italic(run.italic.unwrap_or(base.italic))
}

impl Default for LayoutSession {
    fn default() -> Self {
        Self::new(
            LayoutConfig::default(),
            StyleContext::default(),
            Arc::new(FixedAdvanceMeasurer::default()),
        )
    }
}

impl std::fmt::Debug for LayoutSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutSession")
            .field("version", &self.version)
            .field("tracker", &self.tracker)
            .field("font_metrics", &self.caches.font_metrics_stats())
            .field("text_widths", &self.caches.text_width_stats())
            .finish_non_exhaustive()
    }
}
