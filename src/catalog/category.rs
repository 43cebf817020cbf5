//! Category records and the tree built from them

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// A flat category record as served by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"))]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

impl Category {
    pub fn new(id: i64, name: &str, parent_id: Option<i64>) -> Self {
        Self {
            id,
            name: name.to_string(),
            parent_id,
        }
    }
}

/// A category with its direct descendants attached.
///
/// Dropping, cloning and comparing nodes never recurse, so arbitrarily deep
/// chains are safe. `Debug` and `Serialize` do recurse; render deep trees
/// through [`CategoryTree::walk`] instead.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Leaf categories are the only ones products are browsed under
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The flat record this node was built from
    pub fn to_category(&self) -> Category {
        Category {
            id: self.id,
            name: self.name.clone(),
            parent_id: self.parent_id,
        }
    }
}

impl Drop for CategoryNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

impl Clone for CategoryNode {
    fn clone(&self) -> Self {
        // Copy the labels in pre-order, then attach children bottom-up.
        let mut order: Vec<(&CategoryNode, Option<usize>)> = Vec::new();
        let mut stack = vec![(self, None)];
        while let Some((node, parent)) = stack.pop() {
            let slot = order.len();
            order.push((node, parent));
            stack.extend(node.children.iter().rev().map(|child| (child, Some(slot))));
        }

        let mut copies: Vec<CategoryNode> = order
            .iter()
            .map(|(node, _)| CategoryNode {
                id: node.id,
                name: node.name.clone(),
                parent_id: node.parent_id,
                children: Vec::with_capacity(node.children.len()),
            })
            .collect();

        // A child's slot is always after its parent's, so popping from the
        // back finishes every subtree before its parent is reached.
        let mut root = None;
        for slot in (0..order.len()).rev() {
            let mut copy = match copies.pop() {
                Some(copy) => copy,
                None => break,
            };
            copy.children.reverse();
            match order[slot].1 {
                Some(parent) => copies[parent].children.push(copy),
                None => root = Some(copy),
            }
        }
        root.unwrap_or_else(|| CategoryNode {
            id: self.id,
            name: self.name.clone(),
            parent_id: self.parent_id,
            children: Vec::new(),
        })
    }
}

impl PartialEq for CategoryNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pairs = vec![(self, other)];
        while let Some((a, b)) = pairs.pop() {
            if a.id != b.id || a.name != b.name || a.parent_id != b.parent_id || a.children.len() != b.children.len() {
                return false;
            }
            pairs.extend(a.children.iter().zip(b.children.iter()));
        }
        true
    }
}

impl Eq for CategoryNode {}

impl From<&Category> for CategoryNode {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            parent_id: category.parent_id,
            children: Vec::new(),
        }
    }
}

/// Roots of the category hierarchy plus what had to be worked around
/// while building it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree {
    pub roots: Vec<CategoryNode>,
    /// Ids whose `parent_id` points at a record that does not exist.
    /// These are promoted to roots.
    pub orphans: Vec<i64>,
    /// Ids on, or hanging below, a parent cycle. These are left out.
    pub unreachable: Vec<i64>,
    /// Ids seen more than once; only the first record is used.
    pub duplicates: Vec<i64>,
}

impl CategoryTree {
    /// Builds the hierarchy in O(n), keeping input order among siblings.
    ///
    /// Nodes live in an index arena while links are resolved, and the
    /// nested output is assembled bottom-up from an explicit pre-order,
    /// so no step recurses on the call stack.
    pub fn build(categories: &[Category]) -> Self {
        let mut slot_of: HashMap<i64, usize> = HashMap::with_capacity(categories.len());
        let mut records: Vec<&Category> = Vec::with_capacity(categories.len());
        let mut duplicates = Vec::new();

        for category in categories {
            if slot_of.contains_key(&category.id) {
                warn!(id = category.id, "duplicate category id ignored");
                duplicates.push(category.id);
                continue;
            }
            slot_of.insert(category.id, records.len());
            records.push(category);
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
        let mut root_slots = Vec::new();
        let mut orphans = Vec::new();

        for (slot, category) in records.iter().enumerate() {
            let parent_id = effective_parent(category);
            match parent_id.and_then(|parent| slot_of.get(&parent).copied()) {
                Some(parent_slot) => children[parent_slot].push(slot),
                None => {
                    if let Some(parent) = parent_id {
                        warn!(id = category.id, parent, "parent category missing, treating as root");
                        orphans.push(category.id);
                    }
                    root_slots.push(slot);
                }
            }
        }

        // Every record has at most one parent, so walking down from the
        // roots visits each reachable slot exactly once.
        let mut preorder = Vec::with_capacity(records.len());
        let mut stack: Vec<usize> = root_slots.iter().rev().copied().collect();
        while let Some(slot) = stack.pop() {
            preorder.push(slot);
            stack.extend(children[slot].iter().rev().copied());
        }

        let mut reached = vec![false; records.len()];
        for &slot in &preorder {
            reached[slot] = true;
        }
        let unreachable: Vec<i64> = records
            .iter()
            .enumerate()
            .filter(|(slot, _)| !reached[*slot])
            .map(|(_, category)| category.id)
            .collect();
        if !unreachable.is_empty() {
            warn!(ids = ?unreachable, "categories on a parent cycle were left out of the tree");
        }

        let mut built: Vec<Option<CategoryNode>> = vec![None; records.len()];
        for &slot in preorder.iter().rev() {
            let mut node = CategoryNode::from(records[slot]);
            node.children = children[slot]
                .iter()
                .filter_map(|child| built[*child].take())
                .collect();
            built[slot] = Some(node);
        }

        let roots = root_slots
            .iter()
            .filter_map(|slot| built[*slot].take())
            .collect();

        Self {
            roots,
            orphans,
            unreachable,
            duplicates,
        }
    }

    /// Pre-order walk with each node's depth, roots at depth 0
    pub fn walk(&self) -> Vec<(usize, &CategoryNode)> {
        walk(&self.roots)
    }

    /// Depth-first lookup by id
    pub fn find(&self, id: i64) -> Option<&CategoryNode> {
        find_category_by_id(&self.roots, id)
    }
}

/// The backend stores top-level categories with `parent_id` 0
fn effective_parent(category: &Category) -> Option<i64> {
    category.parent_id.filter(|parent| *parent != 0)
}

/// Nest a flat list of categories under their parents and return the roots.
pub fn build_category_tree(categories: &[Category]) -> Vec<CategoryNode> {
    CategoryTree::build(categories).roots
}

/// Depth-first, pre-order search; returns the first node with a matching id.
pub fn find_category_by_id(nodes: &[CategoryNode], id: i64) -> Option<&CategoryNode> {
    let mut stack: Vec<&CategoryNode> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.id == id {
            return Some(node);
        }
        stack.extend(node.children.iter().rev());
    }
    None
}

/// Pre-order walk over a forest, pairing every node with its depth.
pub fn walk(nodes: &[CategoryNode]) -> Vec<(usize, &CategoryNode)> {
    let mut out = Vec::new();
    let mut stack: Vec<(usize, &CategoryNode)> = nodes.iter().rev().map(|n| (0, n)).collect();
    while let Some((depth, node)) = stack.pop() {
        out.push((depth, node));
        stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
    }
    out
}

/// Categories no other record names as its parent.
pub fn leaf_categories(categories: &[Category]) -> Vec<Category> {
    let parent_ids: HashSet<i64> = categories.iter().filter_map(effective_parent).collect();
    categories
        .iter()
        .filter(|c| !parent_ids.contains(&c.id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cat(id: i64, name: &str, parent_id: Option<i64>) -> Category {
        Category::new(id, name, parent_id)
    }

    fn ids(nodes: &[CategoryNode]) -> Vec<i64> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn nests_child_under_parent() {
        let tree = build_category_tree(&[cat(1, "Electronics", None), cat(3, "Phones", Some(1))]);

        assert_eq!(
            tree,
            vec![CategoryNode {
                id: 1,
                name: "Electronics".to_string(),
                parent_id: None,
                children: vec![CategoryNode {
                    id: 3,
                    name: "Phones".to_string(),
                    parent_id: Some(1),
                    children: vec![],
                }],
            }]
        );
    }

    #[test]
    fn child_before_parent_in_input() {
        let tree = build_category_tree(&[cat(3, "Phones", Some(1)), cat(1, "Electronics", None)]);
        assert_eq!(ids(&tree), vec![1]);
        assert_eq!(ids(&tree[0].children), vec![3]);
    }

    #[test]
    fn siblings_keep_input_order() {
        let tree = build_category_tree(&[
            cat(1, "Root", None),
            cat(9, "Zeta", Some(1)),
            cat(2, "Alpha", Some(1)),
            cat(5, "Mid", Some(1)),
            cat(7, "Second root", None),
        ]);
        assert_eq!(ids(&tree), vec![1, 7]);
        assert_eq!(ids(&tree[0].children), vec![9, 2, 5]);
    }

    #[test]
    fn missing_parent_becomes_root_and_is_reported() {
        let tree = CategoryTree::build(&[cat(1, "Root", None), cat(4, "Lost", Some(99))]);
        assert_eq!(ids(&tree.roots), vec![1, 4]);
        assert_eq!(tree.orphans, vec![4]);
        assert!(tree.unreachable.is_empty());
    }

    #[test]
    fn cycles_are_left_out() {
        let tree = CategoryTree::build(&[
            cat(1, "Root", None),
            cat(2, "A", Some(3)),
            cat(3, "B", Some(2)),
            cat(4, "Below cycle", Some(2)),
            cat(5, "Self", Some(5)),
        ]);
        assert_eq!(ids(&tree.roots), vec![1]);
        assert_eq!(tree.unreachable, vec![2, 3, 4, 5]);
        assert!(tree.find(2).is_none());
    }

    #[test]
    fn duplicate_ids_keep_first_record() {
        let tree = CategoryTree::build(&[cat(1, "First", None), cat(1, "Second", None)]);
        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].name, "First");
        assert_eq!(tree.duplicates, vec![1]);
    }

    #[test]
    fn every_non_root_appears_exactly_once() {
        // Each id points at a parent with a smaller id, so the input is acyclic.
        let categories: Vec<Category> = (1..=200)
            .map(|id| {
                let parent = if id % 7 == 1 { None } else { Some((id * 31) % (id - 1).max(1) + 1) };
                let parent = parent.filter(|p| *p < id);
                cat(id, &format!("c{}", id), parent)
            })
            .collect();

        let tree = CategoryTree::build(&categories);
        let walked = tree.walk();
        let mut seen: Vec<i64> = walked.iter().map(|(_, n)| n.id).collect();
        seen.sort_unstable();
        assert_eq!(seen, (1..=200).collect::<Vec<_>>());

        let root_ids: HashSet<i64> = tree.roots.iter().map(|n| n.id).collect();
        let expected_roots: HashSet<i64> = categories
            .iter()
            .filter(|c| c.parent_id.is_none())
            .map(|c| c.id)
            .collect();
        assert_eq!(root_ids, expected_roots);

        for (_, node) in walked {
            for child in &node.children {
                assert_eq!(child.parent_id, Some(node.id));
            }
        }
    }

    #[test]
    fn deep_chain_builds_without_recursion() {
        let categories: Vec<Category> = (1..=2000)
            .map(|id| cat(id, "deep", if id == 1 { None } else { Some(id - 1) }))
            .collect();
        let tree = CategoryTree::build(&categories);
        assert_eq!(tree.roots.len(), 1);
        let found = tree.find(2000).unwrap();
        assert!(found.is_leaf());
        assert_eq!(tree.walk().last().map(|(depth, _)| *depth), Some(1999));
    }

    #[test]
    fn very_deep_chain_clones_compares_and_drops() {
        let categories: Vec<Category> = (1..=300_000)
            .map(|id| cat(id, "deep", if id == 1 { None } else { Some(id - 1) }))
            .collect();
        let tree = CategoryTree::build(&categories);
        assert!(tree.find(300_000).unwrap().is_leaf());

        let copy = tree.roots.clone();
        assert_eq!(copy, tree.roots);
        assert_eq!(walk(&copy).len(), 300_000);
        drop(copy);
        drop(tree);
    }

    #[test]
    fn clone_keeps_sibling_order_and_inequality_is_found_deep() {
        let tree = build_category_tree(&[
            cat(1, "Root", None),
            cat(2, "A", Some(1)),
            cat(3, "B", Some(1)),
            cat(4, "A1", Some(2)),
            cat(5, "B1", Some(3)),
        ]);
        let mut copy = tree.clone();
        assert_eq!(copy, tree);
        assert_eq!(ids(&copy[0].children), vec![2, 3]);
        assert_eq!(ids(&copy[0].children[1].children), vec![5]);

        copy[0].children[1].children[0].name = "changed".into();
        assert_ne!(copy, tree);
    }

    #[test]
    fn zero_parent_is_a_root_not_an_orphan() {
        let categories = [cat(1, "Electronics", Some(0)), cat(3, "Phones", Some(1))];
        let tree = CategoryTree::build(&categories);
        assert_eq!(ids(&tree.roots), vec![1]);
        assert_eq!(ids(&tree.roots[0].children), vec![3]);
        assert!(tree.orphans.is_empty());

        // A record with id 0 is never treated as anyone's parent
        let leaves = leaf_categories(&[cat(0, "Zero", None), cat(5, "Top", Some(0))]);
        let leaf_ids: Vec<i64> = leaves.iter().map(|c| c.id).collect();
        assert_eq!(leaf_ids, vec![0, 5]);
    }

    #[test]
    fn find_searches_depth_first() {
        let tree = build_category_tree(&[
            cat(1, "Electronics", None),
            cat(2, "Home", None),
            cat(3, "Phones", Some(1)),
            cat(4, "Smartphones", Some(3)),
            cat(5, "Kitchen", Some(2)),
        ]);

        assert_eq!(find_category_by_id(&tree, 4).map(|n| n.name.as_str()), Some("Smartphones"));
        assert_eq!(find_category_by_id(&tree, 5).map(|n| n.name.as_str()), Some("Kitchen"));
        assert_eq!(find_category_by_id(&tree, 2).map(|n| n.children.len()), Some(1));
        assert!(find_category_by_id(&tree, 42).is_none());
        assert!(find_category_by_id(&[], 1).is_none());
    }

    #[test]
    fn find_returns_first_match_in_preorder() {
        // Hand-built forest with a repeated id; the deeper one in the
        // first subtree is reached before the second root.
        let forest = vec![
            CategoryNode {
                id: 1,
                name: "a".into(),
                parent_id: None,
                children: vec![CategoryNode {
                    id: 7,
                    name: "first".into(),
                    parent_id: Some(1),
                    children: vec![],
                }],
            },
            CategoryNode {
                id: 7,
                name: "second".into(),
                parent_id: None,
                children: vec![],
            },
        ];
        assert_eq!(find_category_by_id(&forest, 7).unwrap().name, "first");
    }

    #[test]
    fn walk_reports_depths() {
        let tree = CategoryTree::build(&[
            cat(1, "Electronics", None),
            cat(3, "Phones", Some(1)),
            cat(4, "Laptops", Some(1)),
            cat(2, "Books", None),
        ]);
        let walked: Vec<(usize, i64)> = tree.walk().iter().map(|(d, n)| (*d, n.id)).collect();
        assert_eq!(walked, vec![(0, 1), (1, 3), (1, 4), (0, 2)]);
    }

    #[test]
    fn leaves_exclude_parents() {
        let leaves = leaf_categories(&[
            cat(1, "Electronics", None),
            cat(3, "Phones", Some(1)),
            cat(2, "Books", None),
        ]);
        let leaf_ids: Vec<i64> = leaves.iter().map(|c| c.id).collect();
        assert_eq!(leaf_ids, vec![3, 2]);
    }

    #[test]
    fn deserializes_camel_case_records() {
        let categories: Vec<Category> = serde_json::from_value(json!([
            { "id": 1, "name": "Electronics" },
            { "id": 3, "name": "Phones", "parentId": 1 }
        ]))
        .unwrap();
        assert_eq!(categories[0].parent_id, None);
        assert_eq!(categories[1].parent_id, Some(1));
    }
}
