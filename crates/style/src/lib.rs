pub mod border;
pub mod context;
pub mod counter;
pub mod numbering;
pub mod properties;
pub mod resolver;
pub mod sdt;
pub mod table;

#[cfg(test)]
mod counter_test;

pub use border::{Border, BorderStyle, RawBorder};
pub use context::{
    DocumentDefaults, LevelSuffix, NumberFormat, NumberingDefinition, NumberingLevel,
    StyleContext, StyleDefinition, StyleKind, Theme,
};
pub use counter::{CounterError, CounterOptions, LevelCounterConfig, NumberingCounters};
pub use numbering::{NumberingStyle, format_marker, format_number, level_formats, resolve_numbering};
pub use properties::{
    Justification, LineRule, NumberingReference, ParagraphProperties, RunProperties,
    TabAlignment, TabLeader, TabStop,
};
pub use resolver::{
    ComputedCharacter, ComputedParagraph, ComputedStyle, ComputedTabStop, LineSpacing,
    ResolveOptions, StyleNode, resolve_style,
};
pub use sdt::{SdtInput, SdtMetadata, SdtMetadataCache, SdtResolution, resolve_sdt_metadata};
pub use table::resolve_table_cell_style;
