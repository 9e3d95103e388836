//! Catalog Core
//!
//! Pure read-side computations over a snapshot of the product catalog:
//! - Category tree building for navigation (flat records → ordered forest)
//! - Hierarchical category labels ("Electronics → Phones")
//! - Descendant-inclusive product filtering composed with free-text search
//!
//! Nothing here performs I/O. Callers fetch a snapshot of categories and
//! products from storage and hand it to these functions per request.

mod error;
mod filter;
mod model;
mod tree;

pub use error::CatalogError;
pub use filter::{descendant_ids, filter_products, resolve_category};
pub use model::{Category, CategoryId, Product, ProductId};
pub use tree::{build_forest, hierarchical_name, TreeNode};

pub type Result<T> = std::result::Result<T, CatalogError>;
