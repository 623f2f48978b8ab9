//! Conversions between OOXML document units and layout pixels.
//!
//! Layout works in CSS pixels at 96 dpi. Every helper maps non-finite input to
//! `0.0`, so the result is always a finite number.

pub const TWIPS_PER_INCH: f32 = 1440.0;
pub const POINTS_PER_INCH: f32 = 72.0;
pub const PIXELS_PER_INCH: f32 = 96.0;
pub const EMUS_PER_INCH: f32 = 914_400.0;

#[inline]
fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

pub fn twips_to_px(twips: f32) -> f32 {
    finite_or_zero(finite_or_zero(twips) / TWIPS_PER_INCH * PIXELS_PER_INCH)
}

pub fn twips_to_pt(twips: f32) -> f32 {
    finite_or_zero(finite_or_zero(twips) / 20.0)
}

pub fn pt_to_px(pt: f32) -> f32 {
    finite_or_zero(finite_or_zero(pt) * PIXELS_PER_INCH / POINTS_PER_INCH)
}

pub fn px_to_pt(px: f32) -> f32 {
    finite_or_zero(finite_or_zero(px) * POINTS_PER_INCH / PIXELS_PER_INCH)
}

/// Run font sizes (`w:sz`) are stored in half-points.
pub fn half_points_to_pt(half_points: f32) -> f32 {
    finite_or_zero(finite_or_zero(half_points) / 2.0)
}

/// Border widths (`w:sz` on borders) are stored in eighths of a point.
pub fn eighths_to_px(eighths: f32) -> f32 {
    pt_to_px(finite_or_zero(eighths) / 8.0)
}

/// Drawing extents are stored in English Metric Units.
pub fn emu_to_px(emu: f32) -> f32 {
    finite_or_zero(finite_or_zero(emu) / EMUS_PER_INCH * PIXELS_PER_INCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twips() {
        assert_eq!(twips_to_px(1440.0), 96.0);
        assert_eq!(twips_to_pt(240.0), 12.0);
    }

    #[test]
    fn test_eighths_border_width() {
        let width = eighths_to_px(16.0);
        assert!((width - 2.6667).abs() < 0.001);
        assert_eq!(eighths_to_px(0.0), 0.0);
    }

    #[test]
    fn test_points_and_emu() {
        assert_eq!(pt_to_px(72.0), 96.0);
        assert_eq!(px_to_pt(96.0), 72.0);
        assert_eq!(half_points_to_pt(24.0), 12.0);
        assert_eq!(emu_to_px(914_400.0), 96.0);
    }

    #[test]
    fn test_non_finite_inputs_yield_zero() {
        for value in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(twips_to_px(value), 0.0);
            assert_eq!(twips_to_pt(value), 0.0);
            assert_eq!(pt_to_px(value), 0.0);
            assert_eq!(px_to_pt(value), 0.0);
            assert_eq!(half_points_to_pt(value), 0.0);
            assert_eq!(eighths_to_px(value), 0.0);
            assert_eq!(emu_to_px(value), 0.0);
        }
        // Overflowing the f32 range is also clamped.
        assert_eq!(twips_to_px(f32::MAX), f32::MAX / TWIPS_PER_INCH * PIXELS_PER_INCH);
        assert!(pt_to_px(f32::MAX).is_finite());
    }
}
