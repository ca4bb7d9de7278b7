//! Resolver determinism: resolution is a pure function of the key set,
//! independent of raw input order, so reloads of the same index always
//! agree.

use std::collections::BTreeSet;

use navtree_model::{NavTree, RawChildren, RawIndex, RawNode, RawTree, UrlIndex};
use proptest::prelude::*;

fn fixture_tree(width: usize) -> NavTree {
    let children = (0..width)
        .map(|i| RawNode {
            label: format!("n{i}"),
            target: Some(format!("n{i}.html")),
            children: RawChildren::Leaf,
        })
        .collect();
    NavTree::load(&RawTree::new(RawNode {
        label: "root".to_owned(),
        target: Some("index.html".to_owned()),
        children: RawChildren::Nodes(children),
    }))
    .expect("fixture tree is well-formed")
}

fn url_strategy() -> impl Strategy<Value = String> {
    ("[a-e]{1,4}\\.html", proptest::option::of("[a-e]{1,4}"))
        .prop_map(|(page, fragment)| match fragment {
            Some(f) => format!("{page}#{f}"),
            None => page,
        })
}

proptest! {
    #[test]
    fn resolution_survives_input_reordering(
        urls in proptest::collection::btree_set(url_strategy(), 1..20),
        queries in proptest::collection::vec(url_strategy(), 1..20),
    ) {
        let urls: BTreeSet<String> = urls;
        let width = urls.len();
        let tree = fixture_tree(width);

        let pairs: Vec<(String, Vec<usize>)> = urls
            .iter()
            .enumerate()
            .map(|(i, url)| (url.clone(), vec![i]))
            .collect();
        let mut reversed = pairs.clone();
        reversed.reverse();

        let forward = UrlIndex::load(&RawIndex { pairs }, &tree).expect("unique urls");
        let backward = UrlIndex::load(&RawIndex { pairs: reversed }, &tree).expect("unique urls");

        let fwd = navtree_sync::Resolver::new(&forward);
        let bwd = navtree_sync::Resolver::new(&backward);
        for query in &queries {
            prop_assert_eq!(fwd.resolve(query), bwd.resolve(query));
            // and repeated resolution agrees with itself
            prop_assert_eq!(fwd.resolve(query), fwd.resolve(query));
        }
    }

    #[test]
    fn fallback_path_always_shares_the_page(
        urls in proptest::collection::btree_set(url_strategy(), 1..20),
        queries in proptest::collection::vec(url_strategy(), 1..20),
    ) {
        let urls: BTreeSet<String> = urls;
        let tree = fixture_tree(urls.len());
        let pairs: Vec<(String, Vec<usize>)> = urls
            .iter()
            .enumerate()
            .map(|(i, url)| (url.clone(), vec![i]))
            .collect();
        let index = UrlIndex::load(&RawIndex { pairs }, &tree).expect("unique urls");
        let resolver = navtree_sync::Resolver::new(&index);

        for query in &queries {
            if let Ok(path) = resolver.resolve(query) {
                let i = path.indices()[0];
                let entry_page = navtree_model::split_fragment(index.entries()
                    .iter()
                    .find(|e| e.path().indices() == [i])
                    .expect("path came from an entry")
                    .url()).0;
                let query_page = navtree_model::split_fragment(query).0;
                prop_assert_eq!(entry_page, query_page);
            }
        }
    }
}
