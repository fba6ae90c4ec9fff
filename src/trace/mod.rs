//! Simulation trace input: typed frames and the line-oriented text parser.
//!
//! Format, one header per snapshot followed by its particles:
//!
//! ```text
//! <time> - <flow_total>
//! x,y,vx,vy,r
//! ...
//! ```

/// Frame and particle records.
pub mod model;
/// Text parser.
pub mod parse;
