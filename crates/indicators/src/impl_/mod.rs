//! Indicator implementations
//!
//! Contains all concrete indicator implementations.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
