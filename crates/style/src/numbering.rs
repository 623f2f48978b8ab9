//! Numbering definition lookup and list-marker text formatting.

use crate::context::{LevelSuffix, NumberFormat, NumberingLevel, StyleContext};
use crate::properties::{Indent, Justification, RunProperties};
use folio_types::units::twips_to_px;

pub const DEFAULT_LEVEL_TEXT: &str = "%1.";
pub const DEFAULT_LEVEL_START: i64 = 1;

/// A numbering level with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberingStyle {
    pub num_id: i64,
    pub level: i64,
    pub abstract_id: Option<i64>,
    pub format: NumberFormat,
    pub text: String,
    pub start: i64,
    /// `w:lvlRestart` as given (1-based level, 0 = never restart).
    pub restart: Option<i64>,
    pub justification: Justification,
    pub suffix: LevelSuffix,
    /// Left indent of the list paragraph in pixels.
    pub indent_left: f32,
    /// Hanging indent (marker area) in pixels.
    pub indent_hanging: f32,
    pub run: Option<RunProperties>,
}

/// Looks up `level` in the numbering definition `num_id`.
///
/// An entry whose explicit level equals `level` wins; failing that, the entry
/// at array position `level` is used. Anything else is "not found". This never
/// fails: negative or unknown inputs simply return `None`.
pub fn resolve_numbering(num_id: i64, level: i64, ctx: &StyleContext) -> Option<NumberingStyle> {
    let definition = ctx.numbering_definition(num_id)?;
    if level < 0 {
        return None;
    }

    let entry = definition
        .levels
        .iter()
        .find(|l| l.level == Some(level))
        .or_else(|| usize::try_from(level).ok().and_then(|idx| definition.levels.get(idx)))?;

    Some(numbering_style_from_level(num_id, level, definition.abstract_id, entry))
}

fn numbering_style_from_level(
    num_id: i64,
    level: i64,
    abstract_id: Option<i64>,
    entry: &NumberingLevel,
) -> NumberingStyle {
    let indent = entry.indent.clone().unwrap_or_default();
    NumberingStyle {
        num_id,
        level,
        abstract_id,
        format: entry.format.unwrap_or_default(),
        text: entry
            .text
            .clone()
            .unwrap_or_else(|| DEFAULT_LEVEL_TEXT.to_string()),
        start: entry.start.unwrap_or(DEFAULT_LEVEL_START),
        restart: entry.restart,
        justification: entry.justification.unwrap_or_default(),
        suffix: entry.suffix.unwrap_or_default(),
        indent_left: indent_px(&indent, |i| i.left),
        indent_hanging: indent_px(&indent, |i| i.hanging),
        run: entry.run.clone(),
    }
}

fn indent_px(indent: &Indent, field: impl Fn(&Indent) -> Option<f32>) -> f32 {
    field(indent).map(twips_to_px).unwrap_or(0.0)
}

/// Formats for levels `0..=level`, used to render a multi-level marker.
/// Levels that cannot be resolved are formatted as decimals.
pub fn level_formats(num_id: i64, level: i64, ctx: &StyleContext) -> Vec<NumberFormat> {
    (0..=level.max(0))
        .map(|l| {
            resolve_numbering(num_id, l, ctx)
                .map(|s| s.format)
                .unwrap_or_default()
        })
        .collect()
}

/// Renders a level text template such as `"%1.%2."` against a counter path.
///
/// `%n` refers to the 1-based level `n`; placeholders beyond the path are
/// dropped. Bullet levels return the template verbatim.
pub fn format_marker(template: &str, path: &[i64], formats: &[NumberFormat]) -> String {
    let current_format = formats.get(path.len().saturating_sub(1)).copied().unwrap_or_default();
    match current_format {
        NumberFormat::Bullet => return template.to_string(),
        NumberFormat::None => return String::new(),
        _ => {}
    }

    let mut out = String::with_capacity(template.len() + 4);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().and_then(|d| d.to_digit(10)) {
            Some(n) if n >= 1 => {
                chars.next();
                let idx = (n - 1) as usize;
                if let Some(value) = path.get(idx) {
                    let format = formats.get(idx).copied().unwrap_or_default();
                    out.push_str(&format_number(*value, format));
                }
            }
            _ => out.push('%'),
        }
    }
    out
}

/// Formats a single counter value in the given numbering format.
pub fn format_number(value: i64, format: NumberFormat) -> String {
    match format {
        NumberFormat::Decimal | NumberFormat::Ordinal => value.to_string(),
        NumberFormat::DecimalZero => {
            if (0..10).contains(&value) { format!("0{}", value) } else { value.to_string() }
        }
        NumberFormat::LowerLetter => int_to_lower_alpha(value),
        NumberFormat::UpperLetter => int_to_lower_alpha(value).to_uppercase(),
        NumberFormat::LowerRoman => int_to_lower_roman(value),
        NumberFormat::UpperRoman => int_to_lower_roman(value).to_uppercase(),
        NumberFormat::Bullet | NumberFormat::None => String::new(),
    }
}

/// 1 → "a", 26 → "z", 27 → "aa", 28 → "bb" (the repeating-letter scheme Word uses).
pub fn int_to_lower_alpha(n: i64) -> String {
    if n <= 0 {
        return n.to_string();
    }
    let n = n as u64;
    let letter = (b'a' + ((n - 1) % 26) as u8) as char;
    let repeat = ((n - 1) / 26 + 1) as usize;
    std::iter::repeat_n(letter, repeat).collect()
}

pub fn int_to_lower_roman(n: i64) -> String {
    if n <= 0 {
        return n.to_string();
    }
    let mut num = n;
    let values = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut result = String::new();
    for &(val, sym) in &values {
        while num >= val {
            result.push_str(sym);
            num -= val;
        }
    }
    result
}
