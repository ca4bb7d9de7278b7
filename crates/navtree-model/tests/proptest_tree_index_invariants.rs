//! Property tests for tree/index consistency.
//!
//! For any valid tree table, an index derived from its nodes must load
//! and every entry's path must walk from the root without going out of
//! range. Lookups are idempotent and return exactly the stored path.

use navtree_model::{NavTree, NodeId, RawChildren, RawIndex, RawNode, RawTree, TreePath, UrlIndex};
use proptest::prelude::*;

fn raw_node_strategy() -> impl Strategy<Value = RawNode> {
    let leaf = ("[a-z]{1,8}", proptest::option::of("[a-z]{1,8}\\.html")).prop_map(
        |(label, target)| RawNode {
            label,
            target,
            children: RawChildren::Leaf,
        },
    );
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            "[a-z]{1,8}",
            proptest::option::of("[a-z]{1,8}\\.html"),
            proptest::collection::vec(inner, 1..4),
        )
            .prop_map(|(label, target, children)| RawNode {
                label,
                target,
                children: RawChildren::Nodes(children),
            })
    })
}

/// Collect (unique synthetic url, path) pairs for every node, DFS order.
fn index_pairs(tree: &NavTree) -> Vec<(String, Vec<usize>)> {
    let mut pairs = Vec::new();
    let mut stack: Vec<NodeId> = vec![tree.root()];
    while let Some(id) = stack.pop() {
        let path = tree.path_of(id).expect("id minted by this tree");
        let key: Vec<String> = path.indices().iter().map(ToString::to_string).collect();
        pairs.push((format!("p{}.html", key.join("_")), path.indices().to_vec()));
        stack.extend(tree.children(id).iter().copied());
    }
    pairs
}

proptest! {
    #[test]
    fn every_index_path_walks_without_out_of_range(raw in raw_node_strategy()) {
        let tree = NavTree::load(&RawTree::new(raw)).expect("generated targets are relative");
        let raw_index = RawIndex { pairs: index_pairs(&tree) };
        let index = UrlIndex::load(&raw_index, &tree).expect("paths enumerate real nodes");
        for entry in index.entries() {
            prop_assert!(tree.node_at(entry.path()).is_ok());
        }
    }

    #[test]
    fn lookup_is_idempotent_and_exact(raw in raw_node_strategy()) {
        let tree = NavTree::load(&RawTree::new(raw)).expect("generated targets are relative");
        let raw_index = RawIndex { pairs: index_pairs(&tree) };
        let index = UrlIndex::load(&raw_index, &tree).expect("paths enumerate real nodes");
        for (url, indices) in &raw_index.pairs {
            let expected = TreePath::new(indices.clone());
            prop_assert_eq!(index.lookup(url), Some(&expected));
            prop_assert_eq!(index.lookup(url), Some(&expected));
        }
    }

    #[test]
    fn entries_are_sorted_strictly_increasing(raw in raw_node_strategy()) {
        let tree = NavTree::load(&RawTree::new(raw)).expect("generated targets are relative");
        let raw_index = RawIndex { pairs: index_pairs(&tree) };
        let index = UrlIndex::load(&raw_index, &tree).expect("paths enumerate real nodes");
        for pair in index.entries().windows(2) {
            prop_assert!(pair[0].url() < pair[1].url());
        }
    }

    #[test]
    fn path_of_inverts_node_id_at(raw in raw_node_strategy()) {
        let tree = NavTree::load(&RawTree::new(raw)).expect("generated targets are relative");
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            let path = tree.path_of(id).expect("id minted by this tree");
            prop_assert_eq!(tree.node_id_at(&path).ok(), Some(id));
            stack.extend(tree.children(id).iter().copied());
        }
    }
}
