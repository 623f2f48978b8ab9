//! Bounded caches in front of the text measurement facility.
//!
//! [`FontMetricsCache`] evicts in insertion order (FIFO) and [`TextWidthCache`]
//! in recency order (LRU). Both are owned by a [`MeasurementCaches`] that a
//! layout session creates and clears explicitly; nothing here is global.

use crate::config::LayoutConfig;
use crate::measure::{FontSignature, TextMeasurer};
use lru::LruCache;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Probe string for vertical metrics: ascenders, descenders, and accented capitals.
pub const METRICS_PROBE: &str = "ÁÉÍÓÚÀÈÌÒÙÂÊÎÔÛÄËÏÖÜÇÑbdfhklgjpqy|";

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Vertical metrics of a font in pixels.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
}

impl FontMetrics {
    pub fn height(&self) -> f32 {
        self.ascent + self.descent
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct FontMetricsKey {
    family: String,
    size_bits: u32,
    bold: bool,
    italic: bool,
}

impl From<&FontSignature> for FontMetricsKey {
    fn from(font: &FontSignature) -> Self {
        Self {
            family: font.family.clone(),
            size_bits: font.size.to_bits(),
            bold: font.bold,
            italic: font.italic,
        }
    }
}

/// `(family, size, bold, italic) → ascent/descent`, FIFO-bounded.
#[derive(Debug)]
pub struct FontMetricsCache {
    capacity: usize,
    entries: HashMap<FontMetricsKey, FontMetrics>,
    order: VecDeque<FontMetricsKey>,
    ascent_ratio: f32,
    descent_ratio: f32,
    stats: CacheStats,
}

impl FontMetricsCache {
    pub fn new(capacity: usize) -> Self {
        let defaults = LayoutConfig::default();
        Self::with_fallback(capacity, defaults.fallback_ascent_ratio, defaults.fallback_descent_ratio)
    }

    pub fn with_fallback(capacity: usize, ascent_ratio: f32, descent_ratio: f32) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
            ascent_ratio,
            descent_ratio,
            stats: CacheStats::default(),
        }
    }

    fn fallback(&self, font: &FontSignature) -> FontMetrics {
        FontMetrics {
            ascent: font.size * self.ascent_ratio,
            descent: font.size * self.descent_ratio,
        }
    }

    /// Returns cached metrics or measures [`METRICS_PROBE`] with `measurer`.
    ///
    /// A missing or zero bounding box is answered with the size-proportional
    /// fallback and cached; a facility error is answered the same way but not cached.
    pub fn get_font_metrics(&mut self, font: &FontSignature, measurer: &dyn TextMeasurer) -> FontMetrics {
        let key = FontMetricsKey::from(font);
        if let Some(metrics) = self.entries.get(&key) {
            self.stats.hits += 1;
            return *metrics;
        }
        self.stats.misses += 1;

        let metrics = match measurer.glyph_bounds(METRICS_PROBE, font) {
            Ok(Some(bounds))
                if bounds.ascent.is_finite()
                    && bounds.descent.is_finite()
                    && bounds.ascent + bounds.descent > 0.0 =>
            {
                FontMetrics {
                    ascent: bounds.ascent.max(0.0),
                    descent: bounds.descent.max(0.0),
                }
            }
            Ok(_) => {
                log::debug!("No glyph bounds for '{}'; using proportional metrics", font);
                self.fallback(font)
            }
            Err(e) => {
                log::warn!("Font metrics unavailable for '{}': {}", font, e);
                return self.fallback(font);
            }
        };

        self.insert(key, metrics);
        metrics
    }

    fn insert(&mut self, key: FontMetricsKey, metrics: FontMetrics) {
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, metrics);
    }

    pub fn contains(&self, font: &FontSignature) -> bool {
        self.entries.contains_key(&FontMetricsKey::from(font))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct TextWidthKey {
    text: String,
    font: String,
    letter_spacing_bits: u32,
}

/// `(text, font, letterSpacing) → width`, LRU-bounded.
#[derive(Debug)]
pub struct TextWidthCache {
    entries: LruCache<TextWidthKey, f32>,
    max_text_length: usize,
    stats: CacheStats,
}

impl TextWidthCache {
    pub fn new(capacity: usize, max_text_length: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            max_text_length,
            stats: CacheStats::default(),
        }
    }

    /// Width of `text` plus `letter_spacing` between each pair of characters.
    ///
    /// Text beyond the length limit is cut off before measuring and before
    /// keying. A failed measurement yields `0.0` and leaves the cache untouched,
    /// so the next call measures again.
    pub fn measure_text_width(
        &mut self,
        text: &str,
        font: &FontSignature,
        letter_spacing: f32,
        measurer: &dyn TextMeasurer,
    ) -> f32 {
        let text = truncate_chars(text, self.max_text_length);
        let letter_spacing = if letter_spacing.is_finite() { letter_spacing } else { 0.0 };
        let key = TextWidthKey {
            text: text.to_string(),
            font: font.to_string(),
            letter_spacing_bits: letter_spacing.to_bits(),
        };

        if let Some(width) = self.entries.get(&key) {
            self.stats.hits += 1;
            return *width;
        }
        self.stats.misses += 1;

        let raw = match measurer.measure_width(text, font) {
            Ok(w) if w.is_finite() => w.max(0.0),
            Ok(w) => {
                log::warn!("Non-finite width {} for '{}' in '{}'", w, text, font);
                return 0.0;
            }
            Err(e) => {
                log::warn!("Text measurement failed for '{}': {}", font, e);
                return 0.0;
            }
        };

        let gaps = text.chars().count().saturating_sub(1) as f32;
        let width = raw + gaps * letter_spacing;

        if let Some((evicted, _)) = self.entries.push(key.clone(), width)
            && evicted != key
        {
            self.stats.evictions += 1;
        }
        width
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Owns both measurement caches for one layout session.
#[derive(Debug)]
pub struct MeasurementCaches {
    pub font_metrics: Mutex<FontMetricsCache>,
    pub text_widths: Mutex<TextWidthCache>,
}

impl Default for MeasurementCaches {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}

impl MeasurementCaches {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            font_metrics: Mutex::new(FontMetricsCache::with_fallback(
                config.font_metrics_capacity,
                config.fallback_ascent_ratio,
                config.fallback_descent_ratio,
            )),
            text_widths: Mutex::new(TextWidthCache::new(
                config.text_width_capacity,
                config.max_measured_text_length,
            )),
        }
    }

    pub fn font_metrics(&self, font: &FontSignature, measurer: &dyn TextMeasurer) -> FontMetrics {
        match self.font_metrics.lock() {
            Ok(mut cache) => cache.get_font_metrics(font, measurer),
            Err(poisoned) => poisoned.into_inner().get_font_metrics(font, measurer),
        }
    }

    pub fn text_width(
        &self,
        text: &str,
        font: &FontSignature,
        letter_spacing: f32,
        measurer: &dyn TextMeasurer,
    ) -> f32 {
        match self.text_widths.lock() {
            Ok(mut cache) => cache.measure_text_width(text, font, letter_spacing, measurer),
            Err(poisoned) => {
                poisoned
                    .into_inner()
                    .measure_text_width(text, font, letter_spacing, measurer)
            }
        }
    }

    pub fn clear_font_metrics(&self) {
        if let Ok(mut c) = self.font_metrics.lock() {
            c.clear();
        }
    }

    pub fn clear_text_widths(&self) {
        if let Ok(mut c) = self.text_widths.lock() {
            c.clear();
        }
    }

    pub fn clear(&self) {
        self.clear_font_metrics();
        self.clear_text_widths();
    }

    pub fn font_metrics_stats(&self) -> CacheStats {
        self.font_metrics.lock().map(|c| c.stats()).unwrap_or_default()
    }

    pub fn text_width_stats(&self) -> CacheStats {
        self.text_widths.lock().map(|c| c.stats()).unwrap_or_default()
    }
}
