//! Normalization of structured-content (SDT) metadata.
//!
//! Import adapters hand over SDT nodes as a loosely typed attribute bag. This
//! module turns the four supported node kinds into a fixed shape, coercing each
//! field or falling back to a default, and reports any other kind as
//! unsupported instead of failing.

use folio_types::Color;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// A raw SDT node: its kind name plus whatever attributes the importer found.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SdtInput {
    pub node_type: String,
    #[serde(default)]
    pub attrs: Map<String, Value>,
}

impl SdtInput {
    pub fn new(node_type: impl Into<String>, attrs: Value) -> Self {
        let attrs = match attrs {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            node_type: node_type.into(),
            attrs,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum SdtScope {
    #[default]
    Inline,
    Block,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum SdtLockMode {
    #[default]
    Unlocked,
    SdtLocked,
    ContentLocked,
    SdtContentLocked,
}

impl SdtLockMode {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("sdtLocked") => SdtLockMode::SdtLocked,
            Some("contentLocked") => SdtLockMode::ContentLocked,
            Some("sdtContentLocked") => SdtLockMode::SdtContentLocked,
            _ => SdtLockMode::Unlocked,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FieldAnnotationMetadata {
    pub field_id: String,
    pub field_type: String,
    pub display_label: String,
    pub default_display_label: String,
    pub alias: Option<String>,
    pub field_color: Option<Color>,
    pub text_color: Option<Color>,
    pub highlighted: bool,
    pub hidden: bool,
    pub font_family: Option<String>,
    /// Font size in points.
    pub font_size: Option<f32>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub hash: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StructuredContentMetadata {
    pub scope: SdtScope,
    pub id: Option<String>,
    pub tag: Option<String>,
    pub alias: Option<String>,
    pub lock_mode: SdtLockMode,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSectionMetadata {
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub section_type: Option<String>,
    pub is_locked: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocPartObjectMetadata {
    pub id: Option<String>,
    pub gallery: Option<String>,
    pub category: Option<String>,
    pub unique_id: Option<String>,
    pub instruction: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SdtMetadata {
    FieldAnnotation(FieldAnnotationMetadata),
    StructuredContent(StructuredContentMetadata),
    DocumentSection(DocumentSectionMetadata),
    DocPartObject(DocPartObjectMetadata),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SdtResolution {
    Supported(SdtMetadata),
    Unsupported { node_type: String },
}

impl SdtResolution {
    pub fn metadata(&self) -> Option<&SdtMetadata> {
        match self {
            SdtResolution::Supported(m) => Some(m),
            SdtResolution::Unsupported { .. } => None,
        }
    }
}

// --- Coercion helpers: each returns a safe value for malformed input. ---

fn coerce_string(attrs: &Map<String, Value>, key: &str) -> Option<String> {
    match attrs.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_bool(attrs: &Map<String, Value>, key: &str) -> bool {
    match attrs.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "on"),
        _ => false,
    }
}

fn coerce_number(attrs: &Map<String, Value>, key: &str) -> Option<f32> {
    let value = match attrs.get(key)? {
        Value::Number(n) => n.as_f64()? as f32,
        Value::String(s) => s.trim().trim_end_matches("pt").parse::<f32>().ok()?,
        _ => return None,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

fn coerce_color(attrs: &Map<String, Value>, key: &str) -> Option<Color> {
    coerce_string(attrs, key).and_then(|s| Color::from_ooxml(&s))
}

fn normalize_field_annotation(attrs: &Map<String, Value>) -> FieldAnnotationMetadata {
    let display_label = coerce_string(attrs, "displayLabel").unwrap_or_default();
    FieldAnnotationMetadata {
        field_id: coerce_string(attrs, "fieldId").unwrap_or_default(),
        field_type: coerce_string(attrs, "fieldType").unwrap_or_else(|| "text".to_string()),
        default_display_label: coerce_string(attrs, "defaultDisplayLabel")
            .unwrap_or_else(|| display_label.clone()),
        display_label,
        alias: coerce_string(attrs, "alias"),
        field_color: coerce_color(attrs, "fieldColor"),
        text_color: coerce_color(attrs, "textColor"),
        highlighted: attrs
            .get("highlighted")
            .map_or(true, |_| coerce_bool(attrs, "highlighted")),
        hidden: coerce_bool(attrs, "hidden"),
        font_family: coerce_string(attrs, "fontFamily"),
        font_size: coerce_number(attrs, "fontSize"),
        bold: coerce_bool(attrs, "bold"),
        italic: coerce_bool(attrs, "italic"),
        underline: coerce_bool(attrs, "underline"),
        hash: coerce_string(attrs, "hash"),
    }
}

fn normalize_structured_content(
    attrs: &Map<String, Value>,
    scope: SdtScope,
) -> StructuredContentMetadata {
    StructuredContentMetadata {
        scope,
        id: coerce_string(attrs, "id"),
        tag: coerce_string(attrs, "tag"),
        alias: coerce_string(attrs, "alias"),
        lock_mode: SdtLockMode::parse(coerce_string(attrs, "lockMode").as_deref()),
    }
}

fn normalize_document_section(attrs: &Map<String, Value>) -> DocumentSectionMetadata {
    DocumentSectionMetadata {
        id: coerce_string(attrs, "id"),
        title: coerce_string(attrs, "title").unwrap_or_default(),
        description: coerce_string(attrs, "description"),
        section_type: coerce_string(attrs, "sectionType"),
        is_locked: coerce_bool(attrs, "isLocked"),
    }
}

fn normalize_doc_part_object(attrs: &Map<String, Value>) -> DocPartObjectMetadata {
    DocPartObjectMetadata {
        id: coerce_string(attrs, "id"),
        gallery: coerce_string(attrs, "docPartGallery"),
        category: coerce_string(attrs, "docPartCategory"),
        unique_id: coerce_string(attrs, "docPartUnique").or_else(|| coerce_string(attrs, "uniqueId")),
        instruction: coerce_string(attrs, "instruction"),
    }
}

/// Normalizes an SDT node. Never fails; unknown kinds come back as `Unsupported`.
pub fn resolve_sdt_metadata(input: &SdtInput) -> SdtResolution {
    let attrs = &input.attrs;
    let metadata = match input.node_type.as_str() {
        "fieldAnnotation" => SdtMetadata::FieldAnnotation(normalize_field_annotation(attrs)),
        "structuredContent" => SdtMetadata::StructuredContent(normalize_structured_content(
            attrs,
            SdtScope::Inline,
        )),
        "structuredContentBlock" => SdtMetadata::StructuredContent(normalize_structured_content(
            attrs,
            SdtScope::Block,
        )),
        "documentSection" => SdtMetadata::DocumentSection(normalize_document_section(attrs)),
        "docPartObject" => SdtMetadata::DocPartObject(normalize_doc_part_object(attrs)),
        other => {
            return SdtResolution::Unsupported {
                node_type: other.to_string(),
            };
        }
    };
    SdtResolution::Supported(metadata)
}

/// Memoization key: a content hash when the node carries one, otherwise its id.
/// Nodes with neither are not cached.
pub fn sdt_cache_key(input: &SdtInput) -> Option<String> {
    let attrs = &input.attrs;
    if let Some(hash) = coerce_string(attrs, "hash") {
        return Some(format!("{}:hash:{}", input.node_type, hash));
    }
    coerce_string(attrs, "fieldId")
        .or_else(|| coerce_string(attrs, "id"))
        .map(|id| format!("{}:id:{}", input.node_type, id))
}

/// A clearable memo of normalized SDT metadata, owned by a layout session.
#[derive(Debug, Default)]
pub struct SdtMetadataCache {
    entries: Mutex<HashMap<String, SdtResolution>>,
}

impl SdtMetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached normalization of `input`, computing it on a miss.
    pub fn resolve(&self, input: &SdtInput) -> SdtResolution {
        let Some(key) = sdt_cache_key(input) else {
            return resolve_sdt_metadata(input);
        };

        if let Ok(entries) = self.entries.lock()
            && let Some(hit) = entries.get(&key)
        {
            return hit.clone();
        }

        let resolved = resolve_sdt_metadata(input);
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, resolved.clone());
        }
        resolved
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
