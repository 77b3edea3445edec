//! Data models for SortPot

mod classroom;
mod document;
mod option_set;

pub use classroom::*;
pub use document::*;
pub use option_set::*;
