//! Dynamic Forms
//!
//! Schema-driven form handling: administrators describe a form as a set
//! of stored field definitions, and this crate turns those rows into a
//! typed schema, validates submitted values against it, and hands back
//! the cleaned answers. Rendering stays generic by dispatching on
//! `FieldKind` instead of generating types at runtime.

mod field;
mod validate;

pub use field::{FieldKind, FieldSpec, FormSchema};
pub use validate::{validate, FieldError, FieldValue, ValidationErrors};
