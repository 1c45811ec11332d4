use crate::domain::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Raw wire form of a bar, before any range check.
///
/// Request payloads are read as `OhlcvFields` so that each bar's range
/// failure can be reported on its own. Every [`Ohlcv`] still passes through
/// [`Ohlcv::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcvFields {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One price bar (open/high/low/close/volume) for a single time window.
///
/// Prices are strictly positive and finite, volume is non-negative and finite.
/// Logical consistency between the fields (high >= low, ...) is the
/// validator's job, not the constructor's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OhlcvFields", into = "OhlcvFields")]
pub struct Ohlcv {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl Ohlcv {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Result<Self, ValidationError> {
        for (field, value) in [("open", open), ("high", high), ("low", low), ("close", close)] {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field });
            }
            if value <= 0.0 {
                return Err(ValidationError::NonPositivePrice { field, value });
            }
        }

        if !volume.is_finite() {
            return Err(ValidationError::NonFinite { field: "volume" });
        }
        if volume < 0.0 {
            return Err(ValidationError::NegativeVolume { value: volume });
        }

        Ok(Self {
            open,
            high,
            low,
            close,
            volume,
        })
    }

    pub fn open(&self) -> f64 {
        self.open
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn close(&self) -> f64 {
        self.close
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }
}

impl TryFrom<OhlcvFields> for Ohlcv {
    type Error = ValidationError;

    fn try_from(raw: OhlcvFields) -> Result<Self, Self::Error> {
        Ohlcv::new(raw.open, raw.high, raw.low, raw.close, raw.volume)
    }
}

impl From<Ohlcv> for OhlcvFields {
    fn from(bar: Ohlcv) -> Self {
        Self {
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}
