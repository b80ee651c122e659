//! Projection: the store as compile-time-checkable enumerations.
//!
//! A pure function of the store contents, emitted as two generated Rust
//! source files for the rendering layer:
//!
//! - the **keys file** declares the literal value sets —
//!   `IMAGE_KEYS`, `IMAGE_NAMES`, `IMAGE_TAGS` — for runtime iteration;
//! - the **types file** declares matching `image_key!` / `image_name!` /
//!   `image_tag!` macros that expand a known literal to itself and hit
//!   `compile_error!` for anything else, so a template referencing a
//!   renamed or deleted image fails at compile time rather than 404ing.
//!
//! A duplicate display name aborts the whole step before anything is
//! written: both files are rendered in memory first, so a failure never
//! leaves a partial or inconsistent pair behind — previously emitted files
//! stay untouched, and the store itself is never modified here.

use crate::store::{DuplicateDisplayName, ImageStore, StoreIndex};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error(transparent)]
    DuplicateName(#[from] DuplicateDisplayName),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Banner opening every generated file.
pub const GENERATED_BANNER: &str = "// GENERATED CODE - MODIFICATIONS WILL BE OVERWRITTEN";

/// The derived enumerations: every key, every distinct display name, every
/// distinct tag. Fully determined by store contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub keys: Vec<String>,
    pub names: Vec<String>,
    pub tags: Vec<String>,
}

/// Derive the projection, enforcing display-name uniqueness.
pub fn project(store: &ImageStore) -> Result<Projection, ProjectError> {
    let index = StoreIndex::build(store)?;
    Ok(Projection {
        keys: store.keys().cloned().collect(),
        names: index.names().map(String::from).collect(),
        tags: index.tags().map(String::from).collect(),
    })
}

/// Derive the projection and write both generated files.
pub fn emit(
    store: &ImageStore,
    keys_file: &Path,
    types_file: &Path,
) -> Result<Projection, ProjectError> {
    let projection = project(store)?;

    // Render both before writing either: no partial pair on failure.
    let keys_source = render_keys_file(&projection);
    let types_source = render_types_file(&projection);

    for (path, source) in [(keys_file, &keys_source), (types_file, &types_source)] {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, source)?;
    }
    Ok(projection)
}

/// The literal value sets, e.g.
///
/// ```text
/// pub const IMAGE_KEYS: &[&str] = &[
///     "2023-05-01-img_001.g.avif",
/// ];
/// ```
pub fn render_keys_file(projection: &Projection) -> String {
    let mut out = String::from(GENERATED_BANNER);
    out.push('\n');
    push_value_set(&mut out, "IMAGE_KEYS", &projection.keys);
    push_value_set(&mut out, "IMAGE_NAMES", &projection.names);
    push_value_set(&mut out, "IMAGE_TAGS", &projection.tags);
    out
}

/// The literal-checking macros, e.g.
///
/// ```text
/// #[macro_export]
/// macro_rules! image_key {
///     ("2023-05-01-img_001.g.avif") => { "2023-05-01-img_001.g.avif" };
///     ($other:literal) => { compile_error!(concat!("unknown image key: ", $other)) };
/// }
/// ```
///
/// With an empty store only the `compile_error!` arm remains, so every use
/// fails — the analogue of an uninhabited type.
pub fn render_types_file(projection: &Projection) -> String {
    let mut out = String::from(GENERATED_BANNER);
    out.push('\n');
    push_literal_macro(&mut out, "image_key", "image key", &projection.keys);
    push_literal_macro(&mut out, "image_name", "image name", &projection.names);
    push_literal_macro(&mut out, "image_tag", "image tag", &projection.tags);
    out
}

fn push_value_set(out: &mut String, name: &str, values: &[String]) {
    out.push('\n');
    if values.is_empty() {
        out.push_str(&format!("pub const {name}: &[&str] = &[];\n"));
        return;
    }
    out.push_str(&format!("pub const {name}: &[&str] = &[\n"));
    for value in values {
        out.push_str(&format!("    \"{}\",\n", escape_literal(value)));
    }
    out.push_str("];\n");
}

fn push_literal_macro(out: &mut String, name: &str, label: &str, values: &[String]) {
    out.push('\n');
    out.push_str("#[macro_export]\n");
    out.push_str(&format!("macro_rules! {name} {{\n"));
    for value in values {
        let literal = escape_literal(value);
        out.push_str(&format!("    (\"{literal}\") => {{ \"{literal}\" }};\n"));
    }
    out.push_str(&format!(
        "    ($other:literal) => {{ compile_error!(concat!(\"unknown {label}: \", $other)) }};\n"
    ));
    out.push_str("}\n");
}

/// Escape a value for embedding in a Rust string literal. Keys are already
/// filename-safe, but display names and tags are operator-edited free text.
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
