//! Grading Engine
//!
//! Turns an operator-authored grading formula plus a raw match result into
//! per-market resolutions. Formulas are data, not code: they evaluate in a
//! closed expression language with no names, calls, or indexing, so a bad
//! formula can only fail, never execute anything.

pub mod expr;
pub mod resolve;

pub use expr::Value;
pub use resolve::{metric, resolve, GradingContext};
