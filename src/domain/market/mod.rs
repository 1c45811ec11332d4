// Price bar model
pub mod ohlcv;

pub use ohlcv::{Ohlcv, OhlcvFields};
