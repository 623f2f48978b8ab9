use super::{FontSignature, GlyphBounds, MeasureError, TextMeasurer};
use rustybuzz::{Feature, UnicodeBuffer};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};
use ttf_parser::Tag;

// Reuse the shaping buffer between calls on the same thread.
thread_local! {
    static SCRATCH_BUFFER: RefCell<Option<UnicodeBuffer>> = RefCell::new(Some(UnicodeBuffer::new()));
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct FaceKey {
    family: String,
    bold: bool,
    italic: bool,
}

impl FaceKey {
    fn new(family: &str, bold: bool, italic: bool) -> Self {
        Self {
            family: family.to_lowercase(),
            bold,
            italic,
        }
    }
}

/// Measures text by shaping it with `rustybuzz` against font bytes supplied
/// by the caller. No font discovery is performed: a family that was never
/// registered is reported as [`MeasureError::FontNotFound`].
#[derive(Default, Clone)]
pub struct FaceMeasurer {
    faces: Arc<RwLock<HashMap<FaceKey, Arc<Vec<u8>>>>>,
}

impl std::fmt::Debug for FaceMeasurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.faces.read().map(|faces| faces.len()).unwrap_or(0);
        f.debug_struct("FaceMeasurer").field("faces", &count).finish()
    }
}

impl FaceMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a face for one family/weight/slant combination.
    pub fn add_face(
        &self,
        family: &str,
        bold: bool,
        italic: bool,
        data: Arc<Vec<u8>>,
    ) -> Result<(), MeasureError> {
        if ttf_parser::Face::parse(&data, 0).is_err() {
            return Err(MeasureError::InvalidFontData(family.to_string()));
        }
        log::debug!(
            "Registering face '{}' (bold: {}, italic: {}, {} bytes)",
            family,
            bold,
            italic,
            data.len()
        );
        if let Ok(mut faces) = self.faces.write() {
            faces.insert(FaceKey::new(family, bold, italic), data);
        }
        Ok(())
    }

    /// Exact variant first, then the family's regular face.
    fn face_data(&self, font: &FontSignature) -> Result<Arc<Vec<u8>>, MeasureError> {
        let faces = self
            .faces
            .read()
            .map_err(|_| MeasureError::Unavailable("face registry poisoned".to_string()))?;
        faces
            .get(&FaceKey::new(&font.family, font.bold, font.italic))
            .or_else(|| faces.get(&FaceKey::new(&font.family, false, false)))
            .cloned()
            .ok_or_else(|| MeasureError::FontNotFound(font.family.clone()))
    }
}

fn shaping_features() -> &'static [Feature] {
    static FEATURES: OnceLock<Vec<Feature>> = OnceLock::new();
    FEATURES.get_or_init(|| {
        vec![
            Feature::new(Tag::from_bytes(b"liga"), 1, ..),
            Feature::new(Tag::from_bytes(b"kern"), 1, ..),
        ]
    })
}

impl TextMeasurer for FaceMeasurer {
    fn measure_width(&self, text: &str, font: &FontSignature) -> Result<f32, MeasureError> {
        if text.is_empty() {
            return Ok(0.0);
        }
        let data = self.face_data(font)?;
        let face = rustybuzz::Face::from_slice(&data, 0)
            .ok_or_else(|| MeasureError::InvalidFontData(font.family.clone()))?;
        let scale = font.size / face.units_per_em() as f32;

        let mut buffer =
            SCRATCH_BUFFER.with(|b| b.borrow_mut().take().unwrap_or_else(UnicodeBuffer::new));
        buffer.push_str(text);
        buffer.guess_segment_properties();

        let glyph_buffer = rustybuzz::shape(&face, shaping_features(), buffer);
        let width: f32 = glyph_buffer
            .glyph_positions()
            .iter()
            .map(|pos| pos.x_advance as f32 * scale)
            .sum();

        let recycled_buffer = glyph_buffer.clear();
        SCRATCH_BUFFER.with(|b| *b.borrow_mut() = Some(recycled_buffer));

        Ok(width)
    }

    fn glyph_bounds(
        &self,
        text: &str,
        font: &FontSignature,
    ) -> Result<Option<GlyphBounds>, MeasureError> {
        let data = self.face_data(font)?;
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|_| MeasureError::InvalidFontData(font.family.clone()))?;
        let scale = font.size / face.units_per_em() as f32;

        let mut y_max: Option<i16> = None;
        let mut y_min: Option<i16> = None;
        for bbox in text
            .chars()
            .filter_map(|c| face.glyph_index(c))
            .filter_map(|gid| face.glyph_bounding_box(gid))
        {
            y_max = Some(y_max.map_or(bbox.y_max, |m| m.max(bbox.y_max)));
            y_min = Some(y_min.map_or(bbox.y_min, |m| m.min(bbox.y_min)));
        }

        Ok(match (y_max, y_min) {
            (Some(top), Some(bottom)) => Some(GlyphBounds {
                ascent: f32::from(top).max(0.0) * scale,
                descent: (-f32::from(bottom)).max(0.0) * scale,
            }),
            _ => None,
        })
    }
}
