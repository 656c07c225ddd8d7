//! Core domain types and logic.

pub mod symbol;
pub mod ohlcv;
pub mod fundamentals;
pub mod metrics;
pub mod report;
pub mod pipeline;
pub mod settings;
pub mod config_validation;
pub mod error;
