//! Category-Scoped Product Filter
//!
//! Resolves a selected category by slug, expands it to the set of ids it
//! covers (itself plus every descendant), and narrows the active product
//! snapshot by that set and an optional free-text query. Filtering by an
//! ancestor always includes products assigned to any descendant.

use std::collections::{HashMap, HashSet};

use crate::error::CatalogError;
use crate::model::{Category, CategoryId, Product};
use crate::Result;

/// Look up an active category by slug.
///
/// An inactive or unknown slug is `NotFound`, never an empty listing:
/// the caller must be able to tell "category is hidden" apart from
/// "category exists but has no matching products".
pub fn resolve_category<'a>(categories: &'a [Category], slug: &str) -> Result<&'a Category> {
    categories
        .iter()
        .find(|c| c.slug == slug && c.is_active)
        .ok_or_else(|| CatalogError::NotFound(format!("category '{}' not found", slug)))
}

/// The category's own id plus the ids of every transitive descendant.
///
/// Walks child edges only, to any depth. The visited set doubles as a
/// cycle guard, so a corrupted parent chain cannot loop the walk.
pub fn descendant_ids(categories: &[Category], root: CategoryId) -> HashSet<CategoryId> {
    let mut children_of: HashMap<CategoryId, Vec<CategoryId>> = HashMap::new();
    for category in categories {
        if let Some(parent_id) = category.parent_id {
            children_of.entry(parent_id).or_default().push(category.id);
        }
    }

    let mut ids = HashSet::new();
    let mut pending = vec![root];
    while let Some(id) = pending.pop() {
        if !ids.insert(id) {
            continue;
        }
        if let Some(children) = children_of.get(&id) {
            pending.extend(children.iter().copied());
        }
    }
    ids
}

/// Filter the product snapshot down to the visible matches.
///
/// Starts from active products, restricts to the selected category and
/// its descendants when one is given, then applies the free-text query
/// as a case-insensitive substring match over name, description, short
/// description and SKU. A blank query is the same as no query. Results
/// come back newest first.
///
/// Never mutates anything; the caller owns any side effects such as
/// view counting.
pub fn filter_products<'a>(
    products: &'a [Product],
    categories: &[Category],
    selected: Option<&Category>,
    query: Option<&str>,
) -> Vec<&'a Product> {
    let scope = selected.map(|category| descendant_ids(categories, category.id));
    let needle = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let mut matches: Vec<&Product> = products
        .iter()
        .filter(|p| p.is_active)
        .filter(|p| match &scope {
            Some(ids) => p.category_id.is_some_and(|id| ids.contains(&id)),
            None => true,
        })
        .filter(|p| match &needle {
            Some(q) => matches_query(p, q),
            None => true,
        })
        .collect();

    matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    matches
}

fn matches_query(product: &Product, lowercase_query: &str) -> bool {
    [
        &product.name,
        &product.description,
        &product.short_description,
        &product.sku,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(lowercase_query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{category, product};

    fn three_level_tree() -> Vec<Category> {
        vec![
            category(1, "Electronics", None),
            category(2, "Phones", Some(1)),
            category(3, "Smartphones", Some(2)),
        ]
    }

    fn three_products() -> Vec<Product> {
        vec![
            product(1, "Laptop", Some(1)),
            product(2, "iPhone", Some(2)),
            product(3, "Pixel", Some(3)),
        ]
    }

    #[test]
    fn test_descendant_ids_includes_self_and_all_levels() {
        let categories = three_level_tree();
        let ids = descendant_ids(&categories, 1);
        assert_eq!(ids, HashSet::from([1, 2, 3]));
        assert_eq!(descendant_ids(&categories, 2), HashSet::from([2, 3]));
        assert_eq!(descendant_ids(&categories, 3), HashSet::from([3]));
    }

    #[test]
    fn test_descendant_ids_is_idempotent() {
        let categories = three_level_tree();
        assert_eq!(
            descendant_ids(&categories, 1),
            descendant_ids(&categories, 1)
        );
    }

    #[test]
    fn test_descendant_ids_survives_parent_loop() {
        let categories = vec![category(1, "A", Some(2)), category(2, "B", Some(1))];
        let ids = descendant_ids(&categories, 1);
        assert_eq!(ids, HashSet::from([1, 2]));
    }

    #[test]
    fn test_filter_by_ancestor_includes_descendants() {
        let categories = three_level_tree();
        let products = three_products();

        let by_root = filter_products(&products, &categories, Some(&categories[0]), None);
        let names: Vec<&str> = by_root.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pixel", "iPhone", "Laptop"]);

        let by_mid = filter_products(&products, &categories, Some(&categories[1]), None);
        let names: Vec<&str> = by_mid.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pixel", "iPhone"]);

        let by_leaf = filter_products(&products, &categories, Some(&categories[2]), None);
        let names: Vec<&str> = by_leaf.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pixel"]);
    }

    #[test]
    fn test_products_outside_the_subtree_are_excluded() {
        let mut categories = three_level_tree();
        categories.push(category(4, "Garden", None));
        let mut products = three_products();
        products.push(product(4, "Shovel", Some(4)));

        let by_electronics = filter_products(&products, &categories, Some(&categories[0]), None);
        assert!(by_electronics.iter().all(|p| p.name != "Shovel"));
    }

    #[test]
    fn test_inactive_products_are_hidden() {
        let categories = three_level_tree();
        let mut products = three_products();
        products[1].is_active = false;

        let all = filter_products(&products, &categories, None, None);
        let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pixel", "Laptop"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let categories = three_level_tree();
        let products = three_products();

        let hits = filter_products(&products, &categories, None, Some("phone"));
        let names: Vec<&str> = hits.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["iPhone"]);
    }

    #[test]
    fn test_search_matches_sku_and_descriptions() {
        let categories = three_level_tree();
        let mut products = three_products();
        products[0].short_description = "Portable workstation".to_string();

        let by_sku = filter_products(&products, &categories, None, Some("sku-3"));
        assert_eq!(by_sku[0].name, "Pixel");

        let by_short = filter_products(&products, &categories, None, Some("WORKSTATION"));
        assert_eq!(by_short[0].name, "Laptop");
    }

    #[test]
    fn test_blank_query_equals_no_query() {
        let categories = three_level_tree();
        let products = three_products();

        let with_none = filter_products(&products, &categories, None, None);
        let with_empty = filter_products(&products, &categories, None, Some(""));
        let with_blank = filter_products(&products, &categories, None, Some("   "));
        assert_eq!(with_none.len(), with_empty.len());
        assert_eq!(with_none.len(), with_blank.len());
    }

    #[test]
    fn test_search_composes_with_category_scope() {
        let categories = three_level_tree();
        let products = three_products();

        // "p" matches Laptop, iPhone and Pixel; the Phones scope keeps two.
        let hits = filter_products(&products, &categories, Some(&categories[1]), Some("p"));
        let names: Vec<&str> = hits.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pixel", "iPhone"]);
    }

    #[test]
    fn test_resolve_category_rejects_inactive_slug() {
        let mut categories = three_level_tree();
        categories[1].is_active = false;

        assert!(resolve_category(&categories, "electronics").is_ok());
        let err = resolve_category(&categories, "phones").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
        let err = resolve_category(&categories, "does-not-exist").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn test_category_with_no_matches_yields_empty_not_error() {
        let categories = vec![category(1, "Empty", None)];
        let products: Vec<Product> = Vec::new();
        let selected = resolve_category(&categories, "empty").unwrap();
        let hits = filter_products(&products, &categories, Some(selected), None);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_results_are_newest_first() {
        let categories = three_level_tree();
        let products = three_products();
        let all = filter_products(&products, &categories, None, None);
        let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pixel", "iPhone", "Laptop"]);
    }
}
