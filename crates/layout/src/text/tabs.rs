//! Tab stop lookup and alignment of the text that follows a tab.

use folio_style::resolver::ComputedTabStop;
use folio_style::{TabAlignment, TabLeader};

const TAB_EPSILON: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStop {
    pub position: f32,
    pub alignment: TabAlignment,
    pub leader: TabLeader,
}

/// The first stop strictly right of `x` (paragraph coordinates).
///
/// Explicit stops win; bar and clear stops never stop the cursor. A hanging
/// indent acts as an implicit start stop at `indent_left`. Past the last
/// explicit stop, stops repeat every `default_interval`.
pub fn next_tab_stop(
    stops: &[ComputedTabStop],
    x: f32,
    indent_left: f32,
    default_interval: f32,
) -> ResolvedStop {
    let explicit = stops
        .iter()
        .filter(|s| !matches!(s.alignment, TabAlignment::Bar | TabAlignment::Clear))
        .find(|s| s.position > x + TAB_EPSILON);

    if let Some(stop) = explicit {
        if indent_left > x + TAB_EPSILON && indent_left < stop.position {
            return start_stop(indent_left);
        }
        return ResolvedStop {
            position: stop.position,
            alignment: stop.alignment,
            leader: stop.leader,
        };
    }

    if indent_left > x + TAB_EPSILON {
        return start_stop(indent_left);
    }

    let interval = if default_interval.is_finite() && default_interval > 0.0 {
        default_interval
    } else {
        48.0
    };
    let next = ((x + TAB_EPSILON) / interval).floor() + 1.0;
    start_stop(next * interval)
}

fn start_stop(position: f32) -> ResolvedStop {
    ResolvedStop {
        position,
        alignment: TabAlignment::Start,
        leader: TabLeader::None,
    }
}

/// A tab whose width depends on the text after it (end, center, decimal).
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTab {
    pub segment: usize,
    /// Line-relative x where the tab gap starts.
    pub start_x: f32,
    /// Line-relative stop position.
    pub stop_x: f32,
    pub alignment: TabAlignment,
    /// Width of the text placed after the tab so far.
    pub following_width: f32,
    /// Width of the following text up to the decimal separator, once seen.
    pub decimal_width: Option<f32>,
}

impl PendingTab {
    /// Width of the tab gap that puts the following text in place.
    pub fn resolve(&self) -> f32 {
        let text_start = match self.alignment {
            TabAlignment::End => self.stop_x - self.following_width,
            TabAlignment::Center => self.stop_x - self.following_width / 2.0,
            TabAlignment::Decimal => {
                self.stop_x - self.decimal_width.unwrap_or(self.following_width)
            }
            _ => self.stop_x,
        };
        (text_start - self.start_x).max(0.0)
    }
}
