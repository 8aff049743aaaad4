//! # tfmod_tf
//!
//! Terraform-facing operations: span-based patching of `variable` blocks,
//! extraction of output declarations from `locals`, scaffolding of new
//! modules and execution of the local terraform binary.

pub mod error;
pub mod locals;
pub mod patcher;
pub mod runner;
pub mod scaffold;

pub use error::{TfError, TfResult};
pub use locals::{extract_local_value, output_lookup_tree, read_output_lookup_tree};
pub use patcher::{
    locate_variable_block, replace_or_append_variable_block, replace_variable_block_body,
    spec_type_entries, BlockSpan,
};
pub use runner::{
    terraform_available, terraform_fmt, terraform_fmt_check, terraform_init, terraform_validate,
    TerraformOutput,
};
pub use scaffold::{scaffold_module, ScaffoldOptions, INITIAL_VERSION};
