//! Domain Type Descriptors
//!
//! This module defines the descriptor schema for domain types and the
//! validated, immutable structure it is loaded into.

mod schema;
mod types;
mod validation;

pub use types::*;
pub use validation::{parse_descriptor, system_element_path, SYSTEM_ELEMENT_PATHS};
