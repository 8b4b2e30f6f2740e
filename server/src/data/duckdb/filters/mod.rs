//! Filter model, predicate compilation, and option discovery

pub mod compile;
pub mod discover;
pub mod predicate;
pub mod types;

pub use compile::compile_filter_set;
pub use discover::{FilterConfigEntry, discover_filter_config};
pub use predicate::{Predicate, SqlParams};
pub use types::{FilterArchetype, FilterError, FilterInput};
