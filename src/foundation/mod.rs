//! Shared building blocks: error taxonomy, small value types, integer pixel math.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod math;
