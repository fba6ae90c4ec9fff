//! Run orchestration: configuration and the frame sequence driver.

pub mod config;
pub mod driver;
