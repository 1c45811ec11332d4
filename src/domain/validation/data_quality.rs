use crate::domain::errors::ValidationError;
use crate::domain::market::Ohlcv;
use tracing::warn;

/// Centralized validator for bar consistency.
///
/// Domain ranges (positive prices, non-negative volume) are already enforced
/// by [`Ohlcv::new`]; this checks the relationships between the fields.
pub struct OhlcvValidator;

impl OhlcvValidator {
    /// Returns true if the bar is logically consistent.
    pub fn is_valid(bar: &Ohlcv) -> bool {
        Self::validate(bar).is_ok()
    }

    /// Validates a bar, naming the first violated rule.
    pub fn validate(bar: &Ohlcv) -> Result<(), ValidationError> {
        let (open, high, low, close) = (bar.open(), bar.high(), bar.low(), bar.close());

        let violation = if high < low {
            Some(ValidationError::HighBelowLow { high, low })
        } else if high < open {
            Some(ValidationError::HighBelowBody {
                field: "open",
                high,
                value: open,
            })
        } else if high < close {
            Some(ValidationError::HighBelowBody {
                field: "close",
                high,
                value: close,
            })
        } else if low > open {
            Some(ValidationError::LowAboveBody {
                field: "open",
                low,
                value: open,
            })
        } else if low > close {
            Some(ValidationError::LowAboveBody {
                field: "close",
                low,
                value: close,
            })
        } else {
            None
        };

        match violation {
            Some(err) => {
                warn!("Validation FAILED: {}", err);
                Err(err)
            }
            None => Ok(()),
        }
    }
}
