//! navgator: a terminal directory picker.
//!
//! Directories under the configured roots are indexed together with the tags
//! from their `.navgator.toml` marker, filtered with a small query language
//! (`@path`, `#tag`, plain terms) and previewed with `erd` and `git`.

pub mod color;
pub mod config;
pub mod context;
pub mod error;
pub mod git;
pub mod index;
pub mod logging;
pub mod panel;
pub mod preview;
pub mod query;
pub mod rank;
pub mod session;
pub mod sort;
pub mod tags;
pub mod tools;
pub mod ui;
pub mod worker;

pub use config::Config;
pub use error::{Error, Result};
pub use index::{Candidate, Index};
pub use query::Query;
pub use sort::SortMode;
