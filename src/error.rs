// =============================================================================
// Indicator Errors
// =============================================================================
//
// Contract violations raised by the engines.  Numeric edge cases (zero
// denominators, undefined cells) are never errors: they flow through as NaN or
// infinity.

use thiserror::Error;

/// Errors returned by the indicator engines and the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// Input shorter than the minimum history an indicator needs.
    #[error("insufficient data for {indicator}: need {required} rows, got {actual}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        actual: usize,
    },

    /// A column a dependent method reads is absent from the table.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Unsupported configuration (zero period, unknown indicator name, ...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl IndicatorError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn missing(column: impl Into<String>) -> Self {
        Self::MissingColumn(column.into())
    }
}

pub type Result<T> = std::result::Result<T, IndicatorError>;

/// Reject a zero-length window before it reaches `slice::windows`.
pub(crate) fn require_period(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        tracing::warn!(param = name, "period must be at least 1");
        return Err(IndicatorError::invalid(format!("{name} must be >= 1, got 0")));
    }
    Ok(())
}

/// Reject NaN / infinite thresholds.
pub(crate) fn require_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        tracing::warn!(param = name, value, "threshold must be finite");
        return Err(IndicatorError::invalid(format!("{name} must be finite, got {value}")));
    }
    Ok(())
}

/// Length check shared by every engine; runs before any computation.
pub(crate) fn require_rows(indicator: &'static str, required: usize, actual: usize) -> Result<()> {
    if actual < required {
        tracing::warn!(indicator, required, actual, "not enough rows for indicator");
        return Err(IndicatorError::InsufficientData {
            indicator,
            required,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = IndicatorError::InsufficientData {
            indicator: "RSI",
            required: 15,
            actual: 3,
        };
        assert_eq!(err.to_string(), "insufficient data for RSI: need 15 rows, got 3");
    }

    #[test]
    fn guards() {
        assert!(require_period("window", 0).is_err());
        assert!(require_period("window", 1).is_ok());
        assert!(require_finite("overbought", f64::NAN).is_err());
        assert!(require_rows("BB", 20, 19).is_err());
        assert!(require_rows("BB", 20, 20).is_ok());
    }
}
