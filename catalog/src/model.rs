//! Catalog domain entities.
//!
//! These mirror the storage rows one-to-one but carry no connection to
//! the database: the tree builder and filter operate on plain values so
//! they can be exercised without a storage layer.

use serde::{Deserialize, Serialize};

pub type CategoryId = i64;
pub type ProductId = i64;

/// A product category. Categories form a tree through `parent_id`;
/// the acyclicity of that graph is enforced at write time, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub is_active: bool,
    pub sort_order: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub category_id: Option<CategoryId>,
    pub company: String,
    pub short_description: String,
    pub description: String,
    pub specifications: String,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub in_stock: bool,
    pub stock_quantity: i64,
    pub is_active: bool,
    pub is_featured: bool,
    pub views: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn category(id: CategoryId, name: &str, parent_id: Option<CategoryId>) -> Category {
        Category {
            id,
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            description: String::new(),
            image: None,
            parent_id,
            is_active: true,
            sort_order: 0,
            created_at: "2025-01-01 00:00:00".to_string(),
        }
    }

    pub fn product(id: ProductId, name: &str, category_id: Option<CategoryId>) -> Product {
        Product {
            id,
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            sku: format!("SKU-{}", id),
            category_id,
            company: String::new(),
            short_description: String::new(),
            description: String::new(),
            specifications: String::new(),
            price: None,
            image: None,
            in_stock: true,
            stock_quantity: 0,
            is_active: true,
            is_featured: false,
            views: 0,
            created_at: format!("2025-01-01 00:00:{:02}", id),
            updated_at: format!("2025-01-01 00:00:{:02}", id),
        }
    }
}
