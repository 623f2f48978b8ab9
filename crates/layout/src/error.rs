use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Invalid font signature '{0}': expected \"[italic] [bold] <size>px <family>\".")]
    InvalidFontSignature(String),
    #[error("Invalid {field}: {value} (expected a finite, non-negative number).")]
    InvalidDimension { field: &'static str, value: f32 },
    #[error("Measure count mismatch: {blocks} blocks but {measures} measures.")]
    MeasureMismatch { blocks: usize, measures: usize },
    #[error("Measure kind mismatch: {0}.")]
    MeasureKindMismatch(String),
}

pub(crate) fn check_dimension(field: &'static str, value: f32) -> Result<f32, LayoutError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(LayoutError::InvalidDimension { field, value })
    }
}
