use core::fmt;

use serde::{Deserialize, Serialize};

/// The subset part of a query: a concrete subset name or the `*` wildcard.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubsetSpec {
    pub name: String,
    pub is_any_subset: bool,
}

impl SubsetSpec {
    /// The `*` wildcard: the query applies to every subset.
    pub fn any() -> Self {
        SubsetSpec {
            name: String::new(),
            is_any_subset: true,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        SubsetSpec {
            name: name.into(),
            is_any_subset: false,
        }
    }

    pub fn matches(&self, subset: &str) -> bool {
        self.is_any_subset || self.name == subset
    }
}

impl fmt::Display for SubsetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any_subset {
            f.write_str("*")
        } else {
            f.write_str(&self.name)
        }
    }
}

/// One path component of a query: a mnemonic plus an optional 1-based
/// occurrence index (`0` selects all occurrences).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryComponent {
    pub name: String,
    pub index: usize,
}

impl QueryComponent {
    pub fn new(name: impl Into<String>) -> Self {
        QueryComponent {
            name: name.into(),
            index: 0,
        }
    }

    pub fn indexed(name: impl Into<String>, index: usize) -> Self {
        QueryComponent {
            name: name.into(),
            index,
        }
    }
}

impl fmt::Display for QueryComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index > 0 {
            write!(f, "{}[{}]", self.name, self.index)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// A parsed query path: subset spec plus the mnemonic components leading to
/// a target node. `query_str` keeps the canonical string form for messages.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    pub subset: SubsetSpec,
    pub path: Vec<QueryComponent>,
    pub query_str: String,
}

impl Query {
    pub fn new(subset: SubsetSpec, path: Vec<QueryComponent>) -> Self {
        let mut query_str = subset.to_string();
        for component in &path {
            query_str.push('/');
            query_str.push_str(&component.to_string());
        }
        Query {
            subset,
            path,
            query_str,
        }
    }
}

/// Named queries, each name carrying one or more sub-queries tried in order.
///
/// Insertion order of names is preserved; adding a query under an existing
/// name appends a sub-query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySet {
    entries: Vec<(String, Vec<Query>)>,
}

impl QuerySet {
    pub fn new() -> Self {
        QuerySet::default()
    }

    pub fn add(&mut self, name: impl Into<String>, query: Query) {
        let name = name.into();
        if let Some((_, queries)) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            queries.push(query);
        } else {
            self.entries.push((name, vec![query]));
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn queries_for(&self, name: &str) -> &[Query] {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, q)| q.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a slash-separated path into its non-empty components.
pub fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn query_str_is_canonical() {
        let q = Query::new(
            SubsetSpec::any(),
            vec![
                QueryComponent::new("OBS"),
                QueryComponent::indexed("TEMP", 2),
            ],
        );
        assert_eq!(q.query_str, "*/OBS/TEMP[2]");

        let q = Query::new(SubsetSpec::named("ADPUPA"), vec![QueryComponent::new("CLAT")]);
        assert_eq!(q.query_str, "ADPUPA/CLAT");
    }

    #[test]
    fn query_set_preserves_order_and_appends_subqueries() {
        let mut set = QuerySet::new();
        set.add("temperature", Query::new(SubsetSpec::any(), vec![QueryComponent::new("TMDB")]));
        set.add("pressure", Query::new(SubsetSpec::any(), vec![QueryComponent::new("PRLC")]));
        set.add("temperature", Query::new(SubsetSpec::any(), vec![QueryComponent::new("TMDP")]));

        assert_eq!(set.names().collect::<Vec<_>>(), ["temperature", "pressure"]);
        assert_eq!(set.queries_for("temperature").len(), 2);
        assert_eq!(set.queries_for("missing"), &[]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn split_path_drops_empty_components() {
        assert_eq!(split_path("*/OBS/TEMP"), ["*", "OBS", "TEMP"]);
        assert_eq!(split_path("//OBS//TEMP/"), ["OBS", "TEMP"]);
        assert!(split_path("").is_empty());
    }

    #[test]
    fn queries_roundtrip_through_json() {
        let q = Query::new(
            SubsetSpec::named("ADPUPA"),
            vec![
                QueryComponent::new("PRLC"),
                QueryComponent::indexed("TMDB", 1),
            ],
        );
        let json = serde_json::to_string(&q).unwrap();
        let back: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }

    proptest! {
        #[test]
        fn split_path_roundtrips_joined_components(
            comps in proptest::collection::vec("[A-Z][A-Z0-9]{0,7}", 1..6)
        ) {
            let joined = comps.join("/");
            prop_assert_eq!(split_path(&joined), comps);
        }
    }
}
