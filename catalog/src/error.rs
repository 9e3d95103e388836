use std::fmt;

use crate::model::CategoryId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The requested category does not exist or is not visible.
    /// Distinct from an empty product result.
    NotFound(String),
    /// A parent-chain walk exceeded the category count. The stored
    /// parent references form a loop, which is a data integrity
    /// violation and must never be rendered as a truncated tree.
    CycleDetected { category_id: CategoryId },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::NotFound(msg) => write!(f, "Not found: {}", msg),
            CatalogError::CycleDetected { category_id } => {
                write!(f, "Cycle detected in category parents at id {}", category_id)
            }
        }
    }
}

impl std::error::Error for CatalogError {}
