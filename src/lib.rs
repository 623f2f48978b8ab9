//! folio: style resolution, text measurement, and pagination for
//! word-processing documents.
//!
//! The heavy lifting lives in the workspace crates; this crate ties them into
//! a [`LayoutSession`] and coordinates layout passes with document edits.
//!
//! ```no_run
//! use folio::{FlowDocument, LayoutSession};
//!
//! let mut session = LayoutSession::default();
//! let doc = FlowDocument::from_json(r#"{"blocks": []}"#)?;
//! let version = session.note_edit();
//! let pass = session.layout(&doc, version)?;
//! assert_eq!(pass.layout.page_count(), 1);
//! # Ok::<(), folio::FolioError>(())
//! ```

pub mod error;
pub mod session;
pub mod version;

pub use error::{FolioError, Result};
pub use session::{LayoutPass, LayoutSession};
pub use version::{
    DocumentVersion, LayoutEvent, LayoutEventBus, LayoutEventReceiver, LayoutEventSender,
    VersionTracker,
};

pub use folio_layout::{
    FixedAdvanceMeasurer, FlowBlock, FlowDocument, FontSignature, Fragment, FragmentKind, Layout,
    LayoutConfig, LayoutError, Page, PmRange, TextMeasurer,
};
pub use folio_style::{CounterError, StyleContext};
