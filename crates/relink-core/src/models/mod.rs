//! Data models
//!
//! Records read from the document store and the legacy storage references
//! they may carry.

mod record;
mod reference;

pub use record::*;
pub use reference::*;
