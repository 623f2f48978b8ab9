//! Page and column flow over measured blocks.

use super::{float_x, kind_mismatch};
use crate::error::LayoutError;
use crate::flow::{FloatAlignment, FlowBlock, ParagraphBlock, SectionBreakBlock};
use crate::output::{Fragment, FragmentKind, Layout, Page};
use crate::pm_range::{PmRange, compute_fragment_pm_range};
use crate::section::{PageConfig, SectionBreakType, SectionSignature};
use crate::text::{ListMeasure, Measure, ParagraphMeasure, TableMeasure};
use folio_style::format_number;
use folio_types::{BlockId, Rect};
use std::collections::HashMap;

// Use a small epsilon to handle floating point inaccuracies
const EPSILON: f32 = 0.01;

pub struct BreakAnalysis {
    pub should_break: bool,
    pub remaining_height: f32,
}

/// Checks whether a child fits in the remaining space of a column.
///
/// * `cursor_y`: The current Y position relative to the top of the column.
/// * `child_height`: The required height for the child.
/// * `bounds`: The bounds of the current column.
pub fn check_child_fit(cursor_y: f32, child_height: f32, bounds: Rect) -> BreakAnalysis {
    let available = (bounds.height - cursor_y).max(0.0);
    BreakAnalysis {
        should_break: child_height > available + EPSILON,
        remaining_height: available,
    }
}

/// A block cut into the units pagination may separate: lines, rows, or items.
struct Slices {
    heights: Vec<f32>,
    top_inset: f32,
    bottom_inset: f32,
    keep_together: bool,
    /// Never leave a single slice of the block alone at a column top or bottom.
    widow_control: bool,
}

impl Slices {
    fn total(&self) -> f32 {
        self.top_inset + self.heights.iter().sum::<f32>() + self.bottom_inset
    }
}

struct SliceInfo {
    kind: FragmentKind,
    /// Fragment width; the column width when `None`.
    width: Option<f32>,
    /// Width a float alignment positions against.
    float_width: f32,
    pm_range: Option<PmRange>,
}

struct Paginator {
    section: SectionSignature,
    section_index: usize,
    first_of_section: bool,
    restart: Option<i64>,
    pages: Vec<Page>,
    open: bool,
    column: usize,
    cursor_y: f32,
    column_has_content: bool,
}

impl Paginator {
    fn new(page: &PageConfig) -> Self {
        let section = SectionSignature {
            page: *page,
            orientation: page.orientation(),
            ..SectionSignature::default()
        };
        Self {
            restart: section.page_numbering.start,
            section,
            section_index: 0,
            first_of_section: true,
            pages: Vec::new(),
            open: false,
            column: 0,
            cursor_y: 0.0,
            column_has_content: false,
        }
    }

    fn column_bounds(&self) -> Rect {
        let page = &self.section.page;
        Rect::new(
            page.column_x(self.column),
            page.margins.top,
            page.column_width(),
            page.content_height(),
        )
    }

    fn current_page_has_content(&self) -> bool {
        self.open && self.pages.last().is_some_and(Page::has_content)
    }

    /// The printed number of the next page (or of the open page, when it is
    /// being rebuilt). A pending section restart wins.
    fn next_page_number(&mut self) -> i64 {
        let previous = if self.open {
            self.pages.len().checked_sub(2)
        } else {
            self.pages.len().checked_sub(1)
        };
        let previous = previous.and_then(|idx| self.pages.get(idx)).map(|p| p.page_number);
        self.restart.take().unwrap_or_else(|| previous.map_or(1, |n| n + 1))
    }

    fn build_page(&self, number: usize, page_number: i64, first_of_section: bool) -> Page {
        let section = &self.section;
        Page {
            number,
            page_number,
            number_text: format_number(page_number, section.page_numbering.format),
            size: section.page.page_size,
            orientation: section.orientation,
            margins: section.page.margins,
            columns: section.page.columns,
            fragments: Vec::new(),
            section_index: self.section_index,
            header_ref: section
                .header_refs
                .select(first_of_section, section.title_page, page_number)
                .cloned(),
            footer_ref: section
                .footer_refs
                .select(first_of_section, section.title_page, page_number)
                .cloned(),
            vertical_align: section.vertical_align,
            blank: false,
        }
    }

    fn reset_cursor(&mut self) {
        self.column = 0;
        self.cursor_y = 0.0;
        self.column_has_content = false;
    }

    fn open_page(&mut self) {
        let first = std::mem::take(&mut self.first_of_section);
        let page_number = self.next_page_number();
        let page = self.build_page(self.pages.len() + 1, page_number, first);
        log::trace!(
            "Opening page {} (printed '{}', section {})",
            page.number,
            page.number_text,
            page.section_index
        );
        self.pages.push(page);
        self.open = true;
        self.reset_cursor();
    }

    fn close_page(&mut self) {
        self.open = false;
    }

    fn ensure_page(&mut self) {
        if !self.open {
            self.open_page();
        }
    }

    /// Rebuilds the open, still empty page for the current section.
    fn reconfigure_page(&mut self) {
        let first = std::mem::take(&mut self.first_of_section);
        let page_number = self.next_page_number();
        let Some(last) = self.pages.len().checked_sub(1) else {
            return;
        };
        let page = self.build_page(last + 1, page_number, first);
        log::trace!("Reconfiguring empty page {} for section {}", page.number, page.section_index);
        self.pages[last] = page;
        self.reset_cursor();
    }

    fn advance_column(&mut self) {
        if self.column + 1 < self.section.page.columns.count.max(1) as usize {
            self.column += 1;
            self.cursor_y = 0.0;
            self.column_has_content = false;
        } else {
            self.close_page();
            self.open_page();
        }
    }

    fn apply_section_break(&mut self, section_break: &SectionBreakBlock) {
        self.section = section_break.signature.clone();
        self.section_index = section_break.section_index;

        if section_break.page_boundary {
            self.first_of_section = true;
            self.restart = self.section.page_numbering.start;
            if self.current_page_has_content() {
                self.close_page();
            }
            if self.open {
                self.reconfigure_page();
            } else {
                self.open_page();
            }
            self.satisfy_parity();
        } else if section_break.column_break {
            if self.column_has_content {
                self.advance_column();
            }
        } else if !self.current_page_has_content() {
            self.first_of_section = true;
            self.restart = self.section.page_numbering.start;
            if self.open {
                self.reconfigure_page();
            }
        }
    }

    /// Even/odd section starts turn a wrongly numbered first page into a
    /// blank page and start the section on the next one.
    fn satisfy_parity(&mut self) {
        let wants_even = match self.section.break_type {
            SectionBreakType::EvenPage => true,
            SectionBreakType::OddPage => false,
            _ => return,
        };
        let Some(page) = self.pages.last_mut() else {
            return;
        };
        if (page.page_number % 2 == 0) == wants_even {
            return;
        }
        page.blank = true;
        log::debug!(
            "Inserted blank page {} before section {}",
            page.number,
            self.section_index
        );
        self.first_of_section = true;
        self.close_page();
        self.open_page();
    }

    fn page_break(&mut self) {
        self.ensure_page();
        self.close_page();
    }

    /// Places `slices` in document order, splitting between slices at column
    /// ends. A slice taller than a fresh column is placed anyway and
    /// overflows.
    fn place_sliced(
        &mut self,
        id: &BlockId,
        slices: &Slices,
        float: Option<FloatAlignment>,
        describe: impl Fn(usize, usize) -> SliceInfo,
    ) {
        self.ensure_page();
        let count = slices.heights.len();
        if count == 0 {
            log::debug!("Block '{}' has nothing to place", id);
            return;
        }

        if slices.keep_together && self.column_has_content {
            let bounds = self.column_bounds();
            let total = slices.total();
            if check_child_fit(self.cursor_y, total, bounds).should_break
                && total <= bounds.height + EPSILON
            {
                self.advance_column();
            }
        }

        let mut from = 0;
        while from < count {
            let bounds = self.column_bounds();
            let mut height = if from == 0 { slices.top_inset } else { 0.0 };
            let mut to = from;
            while to < count
                && !check_child_fit(self.cursor_y, height + slices.heights[to], bounds).should_break
            {
                height += slices.heights[to];
                to += 1;
            }

            if to == from {
                if self.column_has_content {
                    self.advance_column();
                    continue;
                }
                log::warn!(
                    "Block '{}' is taller than its column ({:.2} > {:.2}); placing it anyway",
                    id,
                    height + slices.heights[from],
                    bounds.height
                );
                height += slices.heights[from];
                to += 1;
            } else if slices.widow_control && to < count {
                let orphan = from == 0 && to == 1;
                let widow = count - to == 1;
                let min_kept = if from == 0 { 2 } else { 1 };
                if widow && to - from > min_kept {
                    to -= 1;
                    height -= slices.heights[to];
                } else if (orphan || widow) && from == 0 && self.column_has_content {
                    log::trace!("Moving '{}' to the next column to avoid a lone line", id);
                    self.advance_column();
                    continue;
                }
            }
            if to == count {
                height += slices.bottom_inset;
            }

            let info = describe(from, to);
            let fragment = Fragment {
                block_id: id.clone(),
                kind: info.kind,
                x: float_x(float, bounds.x, bounds.width, info.float_width),
                y: bounds.y + self.cursor_y,
                width: info.width.unwrap_or(bounds.width),
                height,
                column: self.column,
                pm_range: info.pm_range,
                continues_from_prev: from > 0,
                continues_on_next: to < count,
            };
            if let Some(page) = self.pages.last_mut() {
                page.fragments.push(fragment);
            }
            self.cursor_y += height;
            self.column_has_content = true;

            from = to;
            if from < count {
                self.advance_column();
            }
        }
    }

    /// Places a paragraph. `next_first` is the height of the first slice of
    /// the following block, which a keep-with-next paragraph must share a
    /// column with.
    fn place_paragraph(
        &mut self,
        block: &FlowBlock,
        paragraph: &ParagraphBlock,
        measure: &ParagraphMeasure,
        next_first: Option<f32>,
    ) {
        if paragraph.attrs.page_break_before && self.current_page_has_content() {
            log::trace!("Paragraph '{}' breaks before itself", paragraph.id);
            self.close_page();
        }
        let slices = Slices {
            heights: measure.lines.iter().map(|l| l.line_height).collect(),
            top_inset: measure.top_inset,
            bottom_inset: measure.bottom_inset,
            keep_together: paragraph.attrs.keep_lines,
            widow_control: paragraph.attrs.widow_control,
        };

        self.ensure_page();
        if paragraph.attrs.keep_next
            && self.column_has_content
            && let Some(next) = next_first
        {
            let bounds = self.column_bounds();
            let total = slices.total();
            let together = total + next;
            if !check_child_fit(self.cursor_y, total, bounds).should_break
                && check_child_fit(self.cursor_y, together, bounds).should_break
                && together <= bounds.height + EPSILON
            {
                log::trace!("Paragraph '{}' moves to stay with the next block", paragraph.id);
                self.advance_column();
            }
        }

        self.place_sliced(&paragraph.id, &slices, paragraph.attrs.float_alignment, |from, to| SliceInfo {
            kind: FragmentKind::Paragraph {
                from_line: from,
                to_line: to,
            },
            width: None,
            float_width: measure.max_line_width(from, to),
            pm_range: compute_fragment_pm_range(block, &measure.lines, from, to),
        });
    }

    fn place_table(&mut self, id: &BlockId, measure: &TableMeasure) {
        let slices = Slices {
            heights: measure.rows.iter().map(|r| r.height).collect(),
            top_inset: 0.0,
            bottom_inset: 0.0,
            keep_together: false,
            widow_control: false,
        };
        self.place_sliced(id, &slices, None, |from, to| SliceInfo {
            kind: FragmentKind::Table {
                from_row: from,
                to_row: to,
            },
            width: Some(measure.total_width),
            float_width: measure.total_width,
            pm_range: None,
        });
    }

    fn place_list(&mut self, id: &BlockId, measure: &ListMeasure) {
        let slices = Slices {
            heights: measure.items.iter().map(|m| m.total_height).collect(),
            top_inset: 0.0,
            bottom_inset: 0.0,
            keep_together: false,
            widow_control: false,
        };
        self.place_sliced(id, &slices, None, |from, to| SliceInfo {
            kind: FragmentKind::List {
                from_item: from,
                to_item: to,
            },
            width: None,
            float_width: 0.0,
            pm_range: None,
        });
    }

    fn finish(mut self) -> Layout {
        if self.pages.is_empty() {
            self.open_page();
        }
        let page_size = self
            .pages
            .first()
            .map_or(self.section.page.page_size, |p| p.size);
        log::debug!("Laid out {} page(s)", self.pages.len());
        Layout {
            page_size,
            pages: self.pages,
            headers: HashMap::new(),
            footers: HashMap::new(),
        }
    }
}

/// Flows measured blocks onto pages.
///
/// `measures[i]` must be the measure of `blocks[i]`. `page_config` applies
/// until the first section break block. A new page starts at an explicit page
/// break, before a paragraph flagged page-break-before (unless the page is
/// still empty), at a section boundary, and when a column runs out of height.
pub fn layout_document(
    blocks: &[FlowBlock],
    measures: &[Measure],
    page_config: &PageConfig,
) -> Result<Layout, LayoutError> {
    if blocks.len() != measures.len() {
        return Err(LayoutError::MeasureMismatch {
            blocks: blocks.len(),
            measures: measures.len(),
        });
    }

    let mut paginator = Paginator::new(page_config);
    for (idx, (block, measure)) in blocks.iter().zip(measures).enumerate() {
        match (block, measure) {
            (FlowBlock::SectionBreak(section_break), Measure::SectionBreak) => {
                paginator.apply_section_break(section_break)
            }
            (FlowBlock::PageBreak(_), Measure::PageBreak) => paginator.page_break(),
            (FlowBlock::Paragraph(paragraph), Measure::Paragraph(m)) => {
                let next_first = blocks
                    .get(idx + 1)
                    .zip(measures.get(idx + 1))
                    .and_then(|(next, next_measure)| first_slice_height(next, next_measure));
                paginator.place_paragraph(block, paragraph, m, next_first)
            }
            (FlowBlock::Image(image), Measure::Image(m)) => {
                let slices = Slices {
                    heights: vec![m.height],
                    top_inset: 0.0,
                    bottom_inset: 0.0,
                    keep_together: true,
                    widow_control: false,
                };
                let pm_range = image.src_start.map(|start| PmRange {
                    start,
                    end: start + 1,
                });
                paginator.place_sliced(&image.id, &slices, image.float_alignment, |_, _| SliceInfo {
                    kind: FragmentKind::Image,
                    width: Some(m.width),
                    float_width: m.width,
                    pm_range,
                });
            }
            (FlowBlock::Table(table), Measure::Table(m)) => paginator.place_table(&table.id, m),
            (FlowBlock::List(list), Measure::List(m)) => paginator.place_list(&list.id, m),
            (block, measure) => return Err(kind_mismatch(block, measure)),
        }
    }

    Ok(paginator.finish())
}

/// Height of the smallest leading piece of a block that pagination would
/// place on its own. `None` when the block starts a new page anyway or has
/// nothing to place.
fn first_slice_height(block: &FlowBlock, measure: &Measure) -> Option<f32> {
    match (block, measure) {
        (FlowBlock::Paragraph(paragraph), Measure::Paragraph(m)) => {
            if paragraph.attrs.page_break_before {
                None
            } else if paragraph.attrs.keep_lines {
                Some(m.total_height)
            } else {
                m.lines.first().map(|line| m.top_inset + line.line_height)
            }
        }
        (_, Measure::Image(m)) => Some(m.height),
        (_, Measure::Table(m)) => m.rows.first().map(|row| row.height),
        (_, Measure::List(m)) => m.items.first().map(|item| item.total_height),
        _ => None,
    }
}
