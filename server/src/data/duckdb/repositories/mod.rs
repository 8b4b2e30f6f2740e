//! Query repositories over the DuckDB store

pub mod discovery;
pub mod page;

pub use page::{FetchedPage, clamp_page, clamp_page_size, fetch_page};
