//! Recordmap Script - RON loader for model definitions
//!
//! Loads the declarative side of recordmap from RON files:
//! - Model definitions (attributes, coercions, identity rules)
//! - Client configuration

mod error;
mod loader;

pub use error::{Error, Result};
pub use loader::{load_config_file, load_config_str, Loader};
