//! Cambio Common Types
//!
//! Shared leaf types for the Cambio currency conversion service: currency
//! codes, monetary amounts, base-relative rate tables, the decimal rounding
//! policy, and time helpers.

pub mod decimal;
pub mod monetary;
pub mod time;

pub use decimal::*;
pub use monetary::*;
pub use time::*;
