use crate::context::StyleContext;
use crate::resolver::{ComputedStyle, ResolveOptions, StyleNode, resolve_style};

/// Resolves the style of a paragraph inside a table cell.
///
/// Only document defaults are applied. The `table → row → cell → paragraph`
/// cascade is not implemented, so table, row, and cell properties on `_cell`
/// are ignored.
pub fn resolve_table_cell_style(_cell: &StyleNode, ctx: &StyleContext) -> ComputedStyle {
    let defaults_only = StyleNode::default();
    let bare = StyleContext {
        defaults: ctx.defaults.clone(),
        theme: ctx.theme.clone(),
        ..StyleContext::default()
    };
    resolve_style(
        &defaults_only,
        &bare,
        ResolveOptions {
            sdt_cache: None,
            skip_sdt: true,
        },
    )
}
