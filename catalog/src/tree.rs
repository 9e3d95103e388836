//! Category Tree Builder
//!
//! Turns the flat category records into an ordered forest for recursive
//! rendering, and produces hierarchical display labels by walking parent
//! references. Both operations guard against parent-reference loops: the
//! data layer cannot guarantee acyclicity, so any walk that touches more
//! nodes than exist reports `CycleDetected` instead of looping.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::CatalogError;
use crate::model::{Category, CategoryId};
use crate::Result;

/// A category together with its ordered children, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    pub category: Category,
    pub children: Vec<TreeNode>,
}

/// Build the ordered category forest from a flat snapshot.
///
/// Roots are the categories with no parent. Siblings at every level are
/// ordered by `(sort_order, name)` ascending, name comparison being
/// case-sensitive. Depth is unbounded.
///
/// Callers rendering to end users should pass only active categories;
/// administrative callers may pass the full set.
pub fn build_forest(categories: &[Category]) -> Result<Vec<TreeNode>> {
    let mut children_of: HashMap<CategoryId, Vec<&Category>> = HashMap::new();
    let mut roots: Vec<&Category> = Vec::new();

    for category in categories {
        match category.parent_id {
            Some(parent_id) => children_of.entry(parent_id).or_default().push(category),
            None => roots.push(category),
        }
    }

    sort_siblings(&mut roots);
    for siblings in children_of.values_mut() {
        sort_siblings(siblings);
    }

    let mut visited = HashSet::new();
    let forest = roots
        .into_iter()
        .map(|root| attach(root, &children_of, &mut visited))
        .collect::<Result<Vec<_>>>()?;

    // A parent loop with no root above it is unreachable from the forest.
    // Dropping those categories would mis-render, so report the loop. A
    // node whose parent is simply absent from the snapshot (e.g. an
    // inactive parent filtered out for display) is not a loop; its
    // subtree is hidden along with the parent.
    if visited.len() != categories.len() {
        let by_id: HashMap<CategoryId, &Category> =
            categories.iter().map(|c| (c.id, c)).collect();
        for category in categories {
            if !visited.contains(&category.id) && is_loop_trapped(category, &by_id) {
                return Err(CatalogError::CycleDetected {
                    category_id: category.id,
                });
            }
        }
    }

    Ok(forest)
}

/// Does following this category's parent chain stay inside the snapshot
/// forever? Chains that leave the snapshot or reach a root terminate.
fn is_loop_trapped(category: &Category, by_id: &HashMap<CategoryId, &Category>) -> bool {
    let mut current = category;
    for _ in 0..=by_id.len() {
        match current.parent_id {
            None => return false,
            Some(parent_id) => match by_id.get(&parent_id) {
                Some(parent) => current = parent,
                None => return false,
            },
        }
    }
    true
}

fn sort_siblings(siblings: &mut [&Category]) {
    siblings.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn attach(
    category: &Category,
    children_of: &HashMap<CategoryId, Vec<&Category>>,
    visited: &mut HashSet<CategoryId>,
) -> Result<TreeNode> {
    if !visited.insert(category.id) {
        return Err(CatalogError::CycleDetected {
            category_id: category.id,
        });
    }

    let children = children_of
        .get(&category.id)
        .map(|siblings| {
            siblings
                .iter()
                .map(|child| attach(child, children_of, visited))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    Ok(TreeNode {
        category: category.clone(),
        children,
    })
}

/// The category's name prefixed by its ancestors, e.g. "Electronics → Phones".
///
/// The walk is capped at the category count so a corrupted parent chain
/// fails with `CycleDetected` rather than hanging.
pub fn hierarchical_name(categories: &[Category], id: CategoryId) -> Result<String> {
    let by_id: HashMap<CategoryId, &Category> =
        categories.iter().map(|c| (c.id, c)).collect();

    let mut current = by_id
        .get(&id)
        .copied()
        .ok_or_else(|| CatalogError::NotFound(format!("category id {} not found", id)))?;

    let mut names = vec![current.name.as_str()];
    let mut steps = 0;

    while let Some(parent_id) = current.parent_id {
        steps += 1;
        if steps > categories.len() {
            return Err(CatalogError::CycleDetected { category_id: id });
        }
        // A missing parent record just terminates the chain.
        match by_id.get(&parent_id) {
            Some(parent) => {
                names.push(parent.name.as_str());
                current = parent;
            }
            None => break,
        }
    }

    names.reverse();
    Ok(names.join(" → "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::category;

    #[test]
    fn test_forest_roots_are_parentless() {
        let categories = vec![
            category(1, "Electronics", None),
            category(2, "Phones", Some(1)),
            category(3, "Garden", None),
        ];

        let forest = build_forest(&categories).unwrap();
        let root_names: Vec<&str> = forest.iter().map(|n| n.category.name.as_str()).collect();
        assert_eq!(root_names, vec!["Electronics", "Garden"]);
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].category.name, "Phones");
    }

    #[test]
    fn test_forest_contains_every_category_once() {
        let categories = vec![
            category(1, "A", None),
            category(2, "B", Some(1)),
            category(3, "C", Some(2)),
            category(4, "D", Some(1)),
            category(5, "E", None),
        ];

        let forest = build_forest(&categories).unwrap();

        fn collect(nodes: &[TreeNode], out: &mut Vec<CategoryId>) {
            for node in nodes {
                out.push(node.category.id);
                collect(&node.children, out);
            }
        }
        let mut ids = Vec::new();
        collect(&forest, &mut ids);
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_sibling_ordering_by_sort_order_then_name() {
        let mut first = category(1, "Zebra", None);
        first.sort_order = 0;
        let mut second = category(2, "Apple", None);
        second.sort_order = 0;
        let mut third = category(3, "Mango", None);
        third.sort_order = -1;

        let forest = build_forest(&[first, second, third]).unwrap();
        let names: Vec<&str> = forest.iter().map(|n| n.category.name.as_str()).collect();
        // Lowest sort_order first, equal orders break ties alphabetically.
        assert_eq!(names, vec!["Mango", "Apple", "Zebra"]);
    }

    #[test]
    fn test_name_tie_break_is_case_sensitive() {
        let forest = build_forest(&[
            category(1, "apple", None),
            category(2, "Banana", None),
        ])
        .unwrap();
        let names: Vec<&str> = forest.iter().map(|n| n.category.name.as_str()).collect();
        assert_eq!(names, vec!["Banana", "apple"]);
    }

    #[test]
    fn test_forest_detects_unreachable_parent_loop() {
        // 2 → 3 → 2 loop, unreachable from root 1.
        let categories = vec![
            category(1, "Root", None),
            category(2, "Left", Some(3)),
            category(3, "Right", Some(2)),
        ];
        let err = build_forest(&categories).unwrap_err();
        assert_eq!(err, CatalogError::CycleDetected { category_id: 2 });
    }

    #[test]
    fn test_forest_hides_subtree_of_filtered_out_parent() {
        // Parent 1 is absent from the snapshot (say, inactive); its
        // child is hidden with it rather than treated as a loop.
        let categories = vec![category(2, "Orphan", Some(1)), category(3, "Top", None)];
        let forest = build_forest(&categories).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category.name, "Top");
    }

    #[test]
    fn test_hierarchical_name_walks_ancestors() {
        let categories = vec![
            category(1, "Electronics", None),
            category(2, "Phones", Some(1)),
            category(3, "Smartphones", Some(2)),
        ];

        assert_eq!(hierarchical_name(&categories, 1).unwrap(), "Electronics");
        assert_eq!(
            hierarchical_name(&categories, 3).unwrap(),
            "Electronics → Phones → Smartphones"
        );
    }

    #[test]
    fn test_hierarchical_name_terminates_on_cycle() {
        let categories = vec![category(1, "A", Some(2)), category(2, "B", Some(1))];
        let err = hierarchical_name(&categories, 1).unwrap_err();
        assert_eq!(err, CatalogError::CycleDetected { category_id: 1 });
    }

    #[test]
    fn test_hierarchical_name_unknown_id() {
        let categories = vec![category(1, "A", None)];
        assert!(matches!(
            hierarchical_name(&categories, 99),
            Err(CatalogError::NotFound(_))
        ));
    }
}
