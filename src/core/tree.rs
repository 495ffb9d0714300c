//! Derived tree views over the flat category collection.
//!
//! The flat collection stays authoritative; these functions compute
//! tree-shaped views on demand. Ids act as the index into the collection,
//! and no cyclic object graph is ever materialized. Parent references that
//! resolve to nothing are treated the same as "no such category" — entries
//! behind them stay in the collection but drop out of root-rooted walks.

use std::collections::HashSet;

use crate::domain::category::Category;

use super::services::{ServiceError, ServiceResult};

/// One rendered row of a depth-first tree walk.
#[derive(Debug, Clone, Copy)]
pub struct TreeRow<'a> {
    pub depth: usize,
    pub category: &'a Category,
}

/// Ordered children of `parent` (`None` for top level): ascending by
/// `order`, ties broken by collection order. Pure and restartable.
pub fn children_of<'a>(categories: &'a [Category], parent: Option<&str>) -> Vec<&'a Category> {
    let mut children: Vec<&Category> = categories
        .iter()
        .filter(|category| category.parent_ref() == parent)
        .collect();
    children.sort_by_key(|category| category.order);
    children
}

/// Depth-first walk from `root`, recursively applying [`children_of`].
///
/// Parent references are user data, so the walk carries a visited set: a
/// revisited id means the starting handle sits inside a parent loop, and
/// the walk aborts with a cycle error instead of recursing forever.
pub fn flatten<'a>(
    categories: &'a [Category],
    root: Option<&str>,
) -> ServiceResult<Vec<TreeRow<'a>>> {
    let mut rows = Vec::new();
    let mut visited = HashSet::new();
    walk(categories, root, 0, &mut visited, &mut rows)?;
    Ok(rows)
}

fn walk<'a>(
    categories: &'a [Category],
    parent: Option<&str>,
    depth: usize,
    visited: &mut HashSet<&'a str>,
    rows: &mut Vec<TreeRow<'a>>,
) -> ServiceResult<()> {
    for child in children_of(categories, parent) {
        if !visited.insert(child.id.as_str()) {
            return Err(ServiceError::Cycle(format!(
                "category `{}` is part of a parent loop",
                child.id
            )));
        }
        rows.push(TreeRow {
            depth,
            category: child,
        });
        walk(categories, Some(&child.id), depth + 1, visited, rows)?;
    }
    Ok(())
}

/// Entries unreachable from the top-level walk: dangling parent references
/// and members of parent loops. They remain in the collection and stay
/// editable by id; they are only invisible to root-rooted traversal.
pub fn orphans(categories: &[Category]) -> Vec<&Category> {
    let reachable = reachable_ids(categories);
    categories
        .iter()
        .filter(|category| !reachable.contains(category.id.as_str()))
        .collect()
}

fn reachable_ids(categories: &[Category]) -> HashSet<&str> {
    let mut reachable: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = children_of(categories, None)
        .into_iter()
        .map(|category| category.id.as_str())
        .collect();
    while let Some(current) = stack.pop() {
        if !reachable.insert(current) {
            continue;
        }
        for child in children_of(categories, Some(current)) {
            stack.push(child.id.as_str());
        }
    }
    reachable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, name: &str, parent: Option<&str>, order: u32) -> Category {
        let mut c = Category::new(name);
        c.id = id.into();
        c.parent_id = parent.map(String::from);
        c.order = order;
        c
    }

    #[test]
    fn children_sorted_by_order_with_stable_ties() {
        let categories = vec![
            category("a", "A", None, 1),
            category("b", "B", None, 0),
            category("c", "C", None, 1),
        ];
        let ids: Vec<&str> = children_of(&categories, None)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn flatten_reports_depths() {
        let categories = vec![
            category("root", "Root", None, 0),
            category("leaf", "Leaf", Some("root"), 0),
        ];
        let rows = flatten(&categories, None).unwrap();
        let depths: Vec<(usize, &str)> = rows
            .iter()
            .map(|row| (row.depth, row.category.id.as_str()))
            .collect();
        assert_eq!(depths, [(0, "root"), (1, "leaf")]);
    }

    #[test]
    fn flatten_inside_a_loop_reports_cycle() {
        let categories = vec![
            category("a", "A", Some("b"), 0),
            category("b", "B", Some("a"), 0),
        ];
        let err = flatten(&categories, Some("a")).unwrap_err();
        assert!(matches!(err, ServiceError::Cycle(_)));
    }

    #[test]
    fn loop_members_are_orphans_not_errors_from_root() {
        let categories = vec![
            category("top", "Top", None, 0),
            category("a", "A", Some("b"), 0),
            category("b", "B", Some("a"), 0),
        ];
        let rows = flatten(&categories, None).unwrap();
        assert_eq!(rows.len(), 1);
        let orphan_ids: Vec<&str> = orphans(&categories).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(orphan_ids, ["a", "b"]);
    }

    #[test]
    fn dangling_parent_makes_an_orphan() {
        let categories = vec![
            category("top", "Top", None, 0),
            category("lost", "Lost", Some("gone"), 0),
        ];
        let orphan_ids: Vec<&str> = orphans(&categories).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(orphan_ids, ["lost"]);
    }
}
