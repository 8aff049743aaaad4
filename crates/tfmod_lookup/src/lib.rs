//! # tfmod_lookup
//!
//! Output lookup trees: the registry-served description of what a module
//! emits. This crate parses the tree document, renders it as a Terraform
//! type expression, strips it down to the lightweight lookup shape, and
//! infers a tree from concrete output values.

pub mod error;
pub mod transform;
pub mod tree;

pub use error::{LookupError, LookupResult};
pub use transform::{to_lookup_shape, to_terraform_type};
pub use tree::{infer_output_tree, parse_lookup_tree, LookupSections, LookupTree};
