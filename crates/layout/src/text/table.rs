use super::{CellMeasure, MeasureContext, RowMeasure, TableMeasure, measure_paragraph};
use crate::error::{LayoutError, check_dimension};
use crate::flow::TableBlock;

fn grid_columns(table: &TableBlock) -> usize {
    if !table.column_widths.is_empty() {
        return table.column_widths.len();
    }
    table
        .rows
        .iter()
        .map(|row| row.cells.iter().map(|c| c.grid_span.unwrap_or(1).max(1)).sum::<usize>())
        .max()
        .unwrap_or(0)
}

/// Grid widths scaled down to fit, or an equal split when none are given.
fn resolve_column_widths(table: &TableBlock, content_width: f32) -> Result<Vec<f32>, LayoutError> {
    let count = grid_columns(table);
    if count == 0 {
        return Ok(Vec::new());
    }
    if table.column_widths.is_empty() {
        return Ok(vec![content_width / count as f32; count]);
    }

    let widths = table
        .column_widths
        .iter()
        .map(|w| check_dimension("columnWidth", *w))
        .collect::<Result<Vec<_>, _>>()?;
    let total: f32 = widths.iter().sum();
    if total > content_width && total > 0.0 {
        let scale = content_width / total;
        Ok(widths.into_iter().map(|w| w * scale).collect())
    } else {
        Ok(widths)
    }
}

pub fn measure_table(
    table: &TableBlock,
    content_width: f32,
    ctx: &MeasureContext<'_>,
) -> Result<TableMeasure, LayoutError> {
    let column_widths = resolve_column_widths(table, content_width)?;
    let padding = check_dimension("cellPadding", table.cell_padding)?;

    let mut rows = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let mut column = 0;
        let mut x = 0.0;
        let mut cells = Vec::with_capacity(row.cells.len());
        for cell in &row.cells {
            let span = cell.grid_span.unwrap_or(1).max(1);
            let end = (column + span).min(column_widths.len());
            let width: f32 = column_widths.get(column..end).map_or(0.0, |w| w.iter().sum());
            let inner = (width - 2.0 * padding).max(0.0);

            let paragraphs = cell
                .paragraphs
                .iter()
                .map(|p| measure_paragraph(p, inner, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            let height = paragraphs.iter().map(|m| m.total_height).sum();

            cells.push(CellMeasure {
                x,
                width,
                height,
                paragraphs,
            });
            x += width;
            column = end;
        }
        let height = cells.iter().map(|c| c.height).fold(0.0, f32::max);
        rows.push(RowMeasure { height, cells });
    }

    let total_width = column_widths.iter().sum();
    let total_height = rows.iter().map(|r| r.height).sum();
    Ok(TableMeasure {
        column_widths,
        rows,
        total_width,
        total_height,
    })
}
