use std::collections::HashMap;
use std::path::PathBuf;

/// Path-scoped pruning for tree diffs
///
/// Holds the requested paths as a component trie. At every tree level the
/// diff asks whether an entry name can still lead to a match, and descends
/// with the sub-filter for that component. An empty filter matches
/// everything.
#[derive(Debug, Clone)]
pub struct PathFilter {
    trie: Trie,
}

impl PathFilter {
    /// A filter matching every path
    pub fn empty() -> Self {
        Self {
            trie: Trie::matching(),
        }
    }

    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut trie = Trie::default();
        for path in paths {
            let components: Vec<String> = path
                .components()
                .map(|comp| comp.as_os_str().to_string_lossy().to_string())
                .collect();
            trie.insert(&components);
        }

        Self { trie }
    }

    /// Can an entry with this name at the current level still match?
    pub fn admits(&self, name: &str) -> bool {
        self.trie.is_matching || self.trie.children.contains_key(name)
    }

    /// The filter to apply inside the subtree named `name`
    pub fn descend(&self, name: &str) -> Self {
        if self.trie.is_matching {
            return Self::empty();
        }

        Self {
            trie: self.trie.children.get(name).cloned().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Trie {
    /// Everything at and below this node matches
    is_matching: bool,
    children: HashMap<String, Trie>,
}

impl Trie {
    fn matching() -> Self {
        Trie {
            is_matching: true,
            children: HashMap::new(),
        }
    }

    fn insert(&mut self, components: &[String]) {
        match components {
            [] => self.is_matching = true,
            [head, rest @ ..] => self
                .children
                .entry(head.clone())
                .or_default()
                .insert(rest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_empty_filter_admits_everything() {
        let filter = PathFilter::empty();

        assert!(filter.admits("anything"));
        assert!(filter.descend("anything").admits("below"));
    }

    #[rstest]
    fn test_single_path_prunes_siblings() {
        let filter = PathFilter::new([PathBuf::from("src/lib.rs")]);

        assert!(filter.admits("src"));
        assert!(!filter.admits("docs"));

        let below = filter.descend("src");
        assert!(below.admits("lib.rs"));
        assert!(!below.admits("main.rs"));
    }

    #[rstest]
    fn test_matched_prefix_admits_whole_subtree() {
        let filter = PathFilter::new([PathBuf::from("src")]);

        let below = filter.descend("src");
        assert!(below.admits("lib.rs"));
        assert!(below.descend("nested").admits("deep.rs"));
    }
}
