//! URL→tree-path resolution.
//!
//! Maps an arbitrary, possibly-fragmented URL the content view has
//! navigated to onto the best matching tree path, even when no exact
//! index entry exists for that fragment. Resolution is a pure function
//! of the sorted index, so repeated calls and index reloads always agree.

use std::fmt;

use navtree_model::{TreePath, UrlIndex, split_fragment};

/// No index entry matches the queried URL, even after stripping the
/// fragment.
///
/// Expected and recoverable: callers degrade to "nothing selected"
/// rather than surfacing a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedUrlError {
    /// The URL that failed to resolve.
    pub url: String,
}

impl fmt::Display for UnresolvedUrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no index entry matches {:?}", self.url)
    }
}

impl std::error::Error for UnresolvedUrlError {}

/// Resolver over a URL index.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a UrlIndex,
}

impl<'a> Resolver<'a> {
    /// Create a resolver borrowing the given index.
    #[must_use]
    pub fn new(index: &'a UrlIndex) -> Self {
        Self { index }
    }

    /// Resolve a URL to a tree path.
    ///
    /// 1. Exact match of the full URL (page + fragment) — the common
    ///    case, since documented symbols get their own entries.
    /// 2. Otherwise strip the fragment and take the entry with the
    ///    lexicographically smallest full key ≥ the page key whose page
    ///    portion matches. Key order alone decides ties, which keeps the
    ///    choice deterministic and stable across reloads.
    /// 3. Otherwise the URL is unresolved.
    pub fn resolve(&self, url: &str) -> Result<TreePath, UnresolvedUrlError> {
        if let Some(path) = self.index.lookup(url) {
            return Ok(path.clone());
        }
        let (page, _) = split_fragment(url);
        if let Some(entry) = self.index.first_for_page(page) {
            return Ok(entry.path().clone());
        }
        Err(UnresolvedUrlError {
            url: url.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navtree_model::{NavTree, RawIndex, RawTree};

    fn fixture() -> (NavTree, UrlIndex) {
        let tree = NavTree::load(
            &RawTree::from_json(
                r#"[["lib", "index.html", [
                    ["Annotated", "annotated.html", null],
                    ["Structs", null, [
                        ["gpioevent_request", "structgpioevent__request.html", null],
                        ["gpioline_info", "structgpioline__info.html", null]
                    ]]
                ]]]"#,
            )
            .unwrap(),
        )
        .unwrap();
        let index = UrlIndex::load(
            &RawIndex::from_json(
                r#"[
                    ["annotated.html", [0]],
                    ["index.html", []],
                    ["structgpioevent__request.html#a9c78", [1, 0]],
                    ["structgpioevent__request.html#fd02", [1, 1]],
                    ["structgpioline__info.html#b111", [1, 1]]
                ]"#,
            )
            .unwrap(),
            &tree,
        )
        .unwrap();
        (tree, index)
    }

    #[test]
    fn exact_match_wins() {
        let (_, index) = fixture();
        let resolver = Resolver::new(&index);
        assert_eq!(
            resolver.resolve("structgpioevent__request.html#a9c78"),
            Ok(TreePath::from([1, 0]))
        );
        assert_eq!(resolver.resolve("index.html"), Ok(TreePath::root()));
    }

    #[test]
    fn unknown_fragment_falls_back_to_first_page_entry() {
        let (_, index) = fixture();
        let resolver = Resolver::new(&index);
        // "#a9c78" < "#fd02", so the deterministic choice is [1, 0].
        assert_eq!(
            resolver.resolve("structgpioevent__request.html#unknown_anchor"),
            Ok(TreePath::from([1, 0]))
        );
    }

    #[test]
    fn bare_page_query_falls_back_to_anchored_entry() {
        let (_, index) = fixture();
        let resolver = Resolver::new(&index);
        assert_eq!(
            resolver.resolve("structgpioline__info.html"),
            Ok(TreePath::from([1, 1]))
        );
    }

    #[test]
    fn fallback_ignores_keys_sorting_between_page_and_anchors() {
        let tree = NavTree::load(
            &RawTree::from_json(
                r#"[["lib", "index.html", [
                    ["notes", "notes.html", null],
                    ["event", "structevent.html", null]
                ]]]"#,
            )
            .unwrap(),
        )
        .unwrap();
        // "structevent.html!extra" sorts after the bare page key but
        // before every "structevent.html#..." key.
        let index = UrlIndex::load(
            &RawIndex::from_json(
                r#"[
                    ["structevent.html!extra", [0]],
                    ["structevent.html#f", [1]]
                ]"#,
            )
            .unwrap(),
            &tree,
        )
        .unwrap();
        let resolver = Resolver::new(&index);
        assert_eq!(
            resolver.resolve("structevent.html#unknown"),
            Ok(TreePath::from([1]))
        );
        assert_eq!(resolver.resolve("structevent.html"), Ok(TreePath::from([1])));
    }

    #[test]
    fn unmatched_url_is_unresolved() {
        let (_, index) = fixture();
        let resolver = Resolver::new(&index);
        let err = resolver.resolve("nosuchpage.html#x").unwrap_err();
        assert_eq!(err.url, "nosuchpage.html#x");
    }

    #[test]
    fn page_prefix_does_not_match_longer_page_names() {
        let (_, index) = fixture();
        let resolver = Resolver::new(&index);
        // "structgpioevent__request.htm" is a string prefix of existing
        // keys but names a different page.
        assert!(resolver.resolve("structgpioevent__request.htm").is_err());
    }

    #[test]
    fn resolution_is_idempotent() {
        let (_, index) = fixture();
        let resolver = Resolver::new(&index);
        let first = resolver.resolve("structgpioevent__request.html#zzz");
        for _ in 0..3 {
            assert_eq!(resolver.resolve("structgpioevent__request.html#zzz"), first);
        }
    }
}
