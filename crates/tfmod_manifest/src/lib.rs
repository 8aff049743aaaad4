//! # tfmod_manifest
//!
//! The module manifest (`facets.yaml`) for tfmod: a typed document model,
//! the recursive schema tree describing a module's configurable surface,
//! path-keyed mutation of that tree, and the outer structural check every
//! manifest must pass before spec-level validation runs.
//!
//! The schema tree is a closed union (`Leaf | FixedObject | DynamicObject`)
//! so that `properties` and `patternProperties` can never coexist on one
//! node; the invariant is carried by the type, not by call-site checks.

pub mod document;
pub mod error;
pub mod mutator;
pub mod schema;
pub mod structural;

pub use document::{
    load_manifest, manifest_path, save_manifest, ArtifactInput, ArtifactInputs, InputDef,
    ModuleManifest, OutputDef, OutputProvider, MANIFEST_FILE,
};
pub use error::{ManifestError, ManifestResult};
pub use mutator::insert_at_path;
pub use schema::{
    parse_default_value, BaseType, DynamicObject, FixedObject, Leaf, SchemaNode, UiHints,
    ALLOWED_TYPE_NAMES, DEFAULT_KEY_PATTERN,
};
