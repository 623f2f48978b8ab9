use super::{float_x, kind_mismatch};
use crate::error::LayoutError;
use crate::flow::FlowBlock;
use crate::output::{Fragment, FragmentKind, HeaderFooterLayout};
use crate::pm_range::{PmRange, compute_fragment_pm_range};
use crate::text::Measure;

/// Stacks header or footer blocks top to bottom at `width`. Nothing is
/// paginated; float alignment positions each fragment within `width`.
pub fn layout_header_footer(
    blocks: &[FlowBlock],
    measures: &[Measure],
    width: f32,
) -> Result<HeaderFooterLayout, LayoutError> {
    if blocks.len() != measures.len() {
        return Err(LayoutError::MeasureMismatch {
            blocks: blocks.len(),
            measures: measures.len(),
        });
    }

    let mut fragments = Vec::new();
    let mut y = 0.0;
    for (block, measure) in blocks.iter().zip(measures) {
        let (kind, fragment_width, float_width, float, pm_range) = match (block, measure) {
            (FlowBlock::Paragraph(p), Measure::Paragraph(m)) => {
                let lines = m.lines.len();
                (
                    FragmentKind::Paragraph {
                        from_line: 0,
                        to_line: lines,
                    },
                    width,
                    m.max_line_width(0, lines),
                    p.attrs.float_alignment,
                    compute_fragment_pm_range(block, &m.lines, 0, lines),
                )
            }
            (FlowBlock::Image(img), Measure::Image(m)) => (
                FragmentKind::Image,
                m.width,
                m.width,
                img.float_alignment,
                img.src_start.map(|start| PmRange {
                    start,
                    end: start + 1,
                }),
            ),
            (FlowBlock::Table(_), Measure::Table(m)) => (
                FragmentKind::Table {
                    from_row: 0,
                    to_row: m.rows.len(),
                },
                m.total_width,
                m.total_width,
                None,
                None,
            ),
            (FlowBlock::List(_), Measure::List(m)) => (
                FragmentKind::List {
                    from_item: 0,
                    to_item: m.items.len(),
                },
                width,
                width,
                None,
                None,
            ),
            (FlowBlock::SectionBreak(_), Measure::SectionBreak)
            | (FlowBlock::PageBreak(_), Measure::PageBreak) => continue,
            (block, measure) => return Err(kind_mismatch(block, measure)),
        };

        let height = measure.total_height();
        fragments.push(Fragment {
            block_id: block.id().clone(),
            kind,
            x: float_x(float, 0.0, width, float_width),
            y,
            width: fragment_width,
            height,
            column: 0,
            pm_range,
            continues_from_prev: false,
            continues_on_next: false,
        });
        y += height;
    }

    Ok(HeaderFooterLayout {
        fragments,
        height: y,
    })
}
