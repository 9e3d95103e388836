//! Catalog read side: wires the pure `catalog` crate to storage.
//!
//! Every method fetches a fresh snapshot, runs the in-memory tree/filter
//! computations, and returns owned values ready for rendering. The one
//! write here is the product-detail view counter, which is a page
//! concern, not part of filtering.

use catalog::{
    build_forest, filter_products, hierarchical_name, resolve_category, Category, Product,
    TreeNode,
};
use serde::Serialize;

use super::Result;
use crate::database::Database;
use crate::models::Service;

#[derive(Clone)]
pub struct CatalogService {
    db: Database,
}

/// One entry of the flattened category navigation. `depth` drives the
/// indentation; `selected`/`on_selected_path` drive the active markers
/// down the ancestor chain of the chosen category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNav {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub depth: usize,
    pub indent_px: usize,
    pub selected: bool,
    pub on_selected_path: bool,
}

#[derive(Debug)]
pub struct ProductListing {
    pub products: Vec<Product>,
    pub selected: Option<Category>,
    /// Hierarchical label of the selected category, e.g.
    /// "Electronics → Phones".
    pub selected_label: Option<String>,
    pub nav: Vec<CategoryNav>,
    pub search_query: String,
}

pub struct HomeContent {
    pub featured: Vec<Product>,
    pub services: Vec<Service>,
}

pub struct SearchResults {
    pub query: String,
    pub products: Vec<Product>,
    pub services: Vec<Service>,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The product listing page: active products filtered by an optional
    /// category slug (descendant-inclusive) and an optional search query,
    /// plus the category navigation tree.
    pub async fn product_listing(
        &self,
        category_slug: Option<&str>,
        search_query: Option<&str>,
    ) -> Result<ProductListing> {
        let categories: Vec<Category> = self
            .db
            .list_categories(true)
            .await?
            .into_iter()
            .map(Category::from)
            .collect();

        let selected = match category_slug {
            Some(slug) => Some(resolve_category(&categories, slug)?.clone()),
            None => None,
        };

        let products: Vec<Product> = self
            .db
            .list_products(true)
            .await?
            .into_iter()
            .map(Product::from)
            .collect();

        let filtered: Vec<Product> =
            filter_products(&products, &categories, selected.as_ref(), search_query)
                .into_iter()
                .cloned()
                .collect();

        let forest = build_forest(&categories)?;
        let selected_label = match &selected {
            Some(category) => Some(hierarchical_name(&categories, category.id)?),
            None => None,
        };
        let nav = flatten_nav(&forest, &categories, selected.as_ref());

        Ok(ProductListing {
            products: filtered,
            selected,
            selected_label,
            nav,
            search_query: search_query.unwrap_or_default().trim().to_string(),
        })
    }

    /// A product detail page. Bumps the view counter; the listing-side
    /// filter never does.
    pub async fn product_detail(&self, slug: &str) -> Result<(Product, Vec<Product>)> {
        let product = Product::from(self.db.get_product_by_slug(slug).await?);
        self.db.increment_product_views(product.id).await?;

        let related = self
            .db
            .related_products(product.category_id, product.id, 4)
            .await?
            .into_iter()
            .map(Product::from)
            .collect();

        Ok((product, related))
    }

    /// Hierarchical label for a category, for breadcrumbs.
    pub async fn category_label(&self, category_id: i64) -> Result<String> {
        let categories: Vec<Category> = self
            .db
            .list_categories(true)
            .await?
            .into_iter()
            .map(Category::from)
            .collect();
        Ok(hierarchical_name(&categories, category_id)?)
    }

    pub async fn home_content(&self) -> Result<HomeContent> {
        let featured = self
            .db
            .list_featured_products(6)
            .await?
            .into_iter()
            .map(Product::from)
            .collect();
        let services = self
            .db
            .list_services(true)
            .await?
            .into_iter()
            .take(3)
            .map(Service::from)
            .collect();
        Ok(HomeContent { featured, services })
    }

    /// Site-wide search across products and services.
    pub async fn site_search(&self, query: &str) -> Result<SearchResults> {
        let categories: Vec<Category> = self
            .db
            .list_categories(true)
            .await?
            .into_iter()
            .map(Category::from)
            .collect();
        let products: Vec<Product> = self
            .db
            .list_products(true)
            .await?
            .into_iter()
            .map(Product::from)
            .collect();

        let product_hits: Vec<Product> =
            filter_products(&products, &categories, None, Some(query))
                .into_iter()
                .cloned()
                .collect();

        let needle = query.trim().to_lowercase();
        let services: Vec<Service> = self
            .db
            .list_services(true)
            .await?
            .into_iter()
            .map(Service::from)
            .filter(|s| {
                !needle.is_empty()
                    && (s.title.to_lowercase().contains(&needle)
                        || s.short_description.to_lowercase().contains(&needle)
                        || s.description.to_lowercase().contains(&needle))
            })
            .collect();

        Ok(SearchResults {
            query: query.trim().to_string(),
            products: product_hits,
            services,
        })
    }

    /// The active category forest, for the JSON API.
    pub async fn category_forest(&self) -> Result<Vec<TreeNode>> {
        let categories: Vec<Category> = self
            .db
            .list_categories(true)
            .await?
            .into_iter()
            .map(Category::from)
            .collect();
        Ok(build_forest(&categories)?)
    }
}

/// Flatten the forest into render order, marking the selected node and
/// its ancestor chain.
fn flatten_nav(
    forest: &[TreeNode],
    categories: &[Category],
    selected: Option<&Category>,
) -> Vec<CategoryNav> {
    let selected_path = selected
        .map(|category| ancestor_chain(categories, category.id))
        .unwrap_or_default();
    let selected_id = selected.map(|c| c.id);

    let mut nav = Vec::new();
    for node in forest {
        flatten_into(node, 0, selected_id, &selected_path, &mut nav);
    }
    nav
}

fn flatten_into(
    node: &TreeNode,
    depth: usize,
    selected_id: Option<i64>,
    selected_path: &[i64],
    out: &mut Vec<CategoryNav>,
) {
    let id = node.category.id;
    out.push(CategoryNav {
        id,
        name: node.category.name.clone(),
        slug: node.category.slug.clone(),
        depth,
        indent_px: depth * 16,
        selected: selected_id == Some(id),
        on_selected_path: selected_path.contains(&id),
    });
    for child in &node.children {
        flatten_into(child, depth + 1, selected_id, selected_path, out);
    }
}

/// The ids from the category up to its root, bounded by the category
/// count so a corrupt chain cannot loop.
fn ancestor_chain(categories: &[Category], id: i64) -> Vec<i64> {
    let mut chain = Vec::new();
    let mut current = Some(id);
    let mut steps = 0;
    while let Some(cursor) = current {
        chain.push(cursor);
        steps += 1;
        if steps > categories.len() {
            break;
        }
        current = categories
            .iter()
            .find(|c| c.id == cursor)
            .and_then(|c| c.parent_id);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_database;
    use crate::services::ServiceError;

    async fn seeded() -> (CatalogService, i64, i64, i64) {
        let db = test_database().await;
        let electronics = db
            .create_category("Electronics", None, "", None, 0)
            .await
            .unwrap();
        let phones = db
            .create_category("Phones", None, "", Some(electronics), 0)
            .await
            .unwrap();
        let smartphones = db
            .create_category("Smartphones", None, "", Some(phones), 0)
            .await
            .unwrap();

        db.create_product("Laptop", None, "SKU-L", Some(electronics), "", "", None, false)
            .await
            .unwrap();
        db.create_product("iPhone", None, "SKU-I", Some(phones), "", "", None, false)
            .await
            .unwrap();
        db.create_product("Pixel", None, "SKU-P", Some(smartphones), "", "", None, false)
            .await
            .unwrap();

        (CatalogService::new(db), electronics, phones, smartphones)
    }

    #[tokio::test]
    async fn test_listing_by_ancestor_includes_descendants() {
        let (service, ..) = seeded().await;

        let listing = service
            .product_listing(Some("electronics"), None)
            .await
            .unwrap();
        assert_eq!(listing.products.len(), 3);

        let listing = service.product_listing(Some("phones"), None).await.unwrap();
        let names: Vec<&str> = listing.products.iter().map(|p| p.name.as_str()).collect();
        assert!(names.contains(&"iPhone"));
        assert!(names.contains(&"Pixel"));
        assert_eq!(names.len(), 2);

        let listing = service
            .product_listing(Some("smartphones"), None)
            .await
            .unwrap();
        assert_eq!(listing.products.len(), 1);
        assert_eq!(listing.products[0].name, "Pixel");
    }

    #[tokio::test]
    async fn test_listing_unknown_slug_is_not_found() {
        let (service, ..) = seeded().await;
        let err = service
            .product_listing(Some("does-not-exist"), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_listing_marks_selected_ancestor_chain() {
        let (service, electronics, phones, smartphones) = seeded().await;

        let listing = service
            .product_listing(Some("smartphones"), None)
            .await
            .unwrap();
        let by_id = |id: i64| listing.nav.iter().find(|n| n.id == id).unwrap();
        assert!(by_id(smartphones).selected);
        assert!(by_id(smartphones).on_selected_path);
        assert!(by_id(phones).on_selected_path);
        assert!(by_id(electronics).on_selected_path);
        assert!(!by_id(electronics).selected);

        assert_eq!(
            listing.selected_label.as_deref(),
            Some("Electronics → Phones → Smartphones")
        );
    }

    #[tokio::test]
    async fn test_nav_depths_follow_the_tree() {
        let (service, ..) = seeded().await;
        let listing = service.product_listing(None, None).await.unwrap();
        let depths: Vec<usize> = listing.nav.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_search_composes_with_category() {
        let (service, ..) = seeded().await;
        let listing = service
            .product_listing(Some("phones"), Some("pixel"))
            .await
            .unwrap();
        assert_eq!(listing.products.len(), 1);
        assert_eq!(listing.products[0].name, "Pixel");
    }

    #[tokio::test]
    async fn test_detail_bumps_views_and_finds_related() {
        let db = test_database().await;
        let cat = db.create_category("Garden", None, "", None, 0).await.unwrap();
        db.create_product("Shovel", None, "S-1", Some(cat), "", "", None, false)
            .await
            .unwrap();
        db.create_product("Rake", None, "R-1", Some(cat), "", "", None, false)
            .await
            .unwrap();
        let service = CatalogService::new(db.clone());

        let (product, related) = service.product_detail("shovel").await.unwrap();
        assert_eq!(product.name, "Shovel");
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].name, "Rake");

        let row = db.get_product_by_slug("shovel").await.unwrap();
        assert_eq!(row.views, 1);
    }

    #[tokio::test]
    async fn test_inactive_category_slug_is_not_found() {
        let db = test_database().await;
        let id = db.create_category("Hidden", None, "", None, 0).await.unwrap();
        sqlx::query("UPDATE categories SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(db.pool())
            .await
            .unwrap();
        let service = CatalogService::new(db);

        let err = service.product_listing(Some("hidden"), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Catalog(_)));
        assert!(err.is_not_found());
    }
}
