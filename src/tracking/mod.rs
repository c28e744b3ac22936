//! Bounded per-marker position histories and the registry that owns them.

pub mod error;
pub mod history;
pub mod registry;
pub mod types;

pub use error::*;
pub use history::*;
pub use registry::*;
pub use types::*;
