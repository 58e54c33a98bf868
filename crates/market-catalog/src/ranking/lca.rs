//! Lowest common ancestor of the categories of a set of ads.

use crate::catalog::{Ad, Category, CategoryTree};
use crate::error::CatalogError;
use crate::ids::CategoryId;

/// Resolve the category that best summarizes a set of ads.
///
/// Ads that all share one category resolve to that category. Otherwise the
/// result is the deepest category that is a strict ancestor of every ad's
/// category, found by walking a candidate up from the first category seen.
/// When the categories have no common ancestor the walk stops at a root.
///
/// Returns `Ok(None)` for an empty set.
///
/// # Example
///
/// ```rust,ignore
/// // Root -> A -> B -> C, ads filed under B and C
/// let lca = lowest_common_ancestor(&tree, &ads)?;
/// assert_eq!(lca.map(|c| c.id.as_str()), Some("a"));
/// ```
pub fn lowest_common_ancestor<'t, 'a>(
    tree: &'t CategoryTree,
    ads: impl IntoIterator<Item = &'a Ad>,
) -> Result<Option<&'t Category>, CatalogError> {
    lowest_common_category(tree, ads.into_iter().map(|ad| &ad.category_id))
}

/// [`lowest_common_ancestor`] over category IDs.
pub fn lowest_common_category<'t, 'c>(
    tree: &'t CategoryTree,
    category_ids: impl IntoIterator<Item = &'c CategoryId>,
) -> Result<Option<&'t Category>, CatalogError> {
    let mut distinct: Vec<&'t Category> = Vec::new();
    for id in category_ids {
        if distinct.iter().any(|c| &c.id == id) {
            continue;
        }
        distinct.push(tree.require(id)?);
    }

    let mut candidate = match distinct.first() {
        Some(first) => *first,
        None => return Ok(None),
    };
    if distinct.len() == 1 {
        return Ok(Some(candidate));
    }

    for category in &distinct {
        while !category.ancestors.contains(&candidate.id) {
            match tree.parent_of(&candidate.id) {
                Some(parent) => candidate = parent,
                None => break,
            }
        }
    }

    Ok(Some(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NewCategory;

    /// root -> a -> b -> c, root -> x -> y, root -> z, other-root
    fn tree() -> CategoryTree {
        let mut tree = CategoryTree::new();
        for (id, parent) in [
            ("root", None),
            ("a", Some("root")),
            ("b", Some("a")),
            ("c", Some("b")),
            ("x", Some("root")),
            ("y", Some("x")),
            ("z", Some("root")),
            ("other-root", None),
        ] {
            let mut new = NewCategory::new(id.to_uppercase(), "et").with_id(id);
            if let Some(parent) = parent {
                new = new.with_parent(parent);
            }
            tree.create_category(new).unwrap();
        }
        tree
    }

    fn ads(categories: &[&str]) -> Vec<Ad> {
        categories
            .iter()
            .enumerate()
            .map(|(i, c)| Ad::new(format!("ad-{}", i), *c, "u1", 0))
            .collect()
    }

    fn lca(tree: &CategoryTree, categories: &[&str]) -> Option<String> {
        lowest_common_ancestor(tree, &ads(categories))
            .unwrap()
            .map(|c| c.id.to_string())
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(lca(&tree(), &[]), None);
    }

    #[test]
    fn test_single_category() {
        let tree = tree();
        assert_eq!(lca(&tree, &["b"]), Some("b".to_string()));
        assert_eq!(lca(&tree, &["c", "c", "c"]), Some("c".to_string()));
    }

    #[test]
    fn test_parent_and_child() {
        let tree = tree();
        assert_eq!(lca(&tree, &["b", "c"]), Some("a".to_string()));
        assert_eq!(lca(&tree, &["c", "b"]), Some("a".to_string()));
    }

    #[test]
    fn test_siblings_resolve_to_parent() {
        let tree = tree();
        assert_eq!(lca(&tree, &["c", "y"]), Some("root".to_string()));
        assert_eq!(lca(&tree, &["a", "x"]), Some("root".to_string()));
    }

    #[test]
    fn test_three_unrelated_subtrees_converge_to_root() {
        let tree = tree();
        for order in [["c", "y", "z"], ["z", "c", "y"], ["y", "z", "c"]] {
            assert_eq!(lca(&tree, &order), Some("root".to_string()));
        }
    }

    #[test]
    fn test_disjoint_roots_stop_at_a_root() {
        let tree = tree();
        let result = lca(&tree, &["c", "other-root"]).unwrap();
        assert!(result == "root" || result == "other-root");
    }

    #[test]
    fn test_unknown_category() {
        let tree = tree();
        let err = lowest_common_ancestor(&tree, &ads(&["b", "ghost"])).unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound(_)));
    }
}
