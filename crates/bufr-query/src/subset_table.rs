use std::collections::HashMap;

use bufr_model::{QueryComponent, Typ, TypeInfo};

use crate::error::QueryError;
use crate::provider::DataProvider;

/// One level of a subset's query tree.
///
/// Replication constructs collapse to a single node carrying the marker's
/// table index (where path tracking happens) and the body's mnemonic (what
/// queries name). Plain sequences are transparent and do not appear.
#[derive(Debug, Clone, PartialEq)]
pub struct BufrNode {
    /// Table index: the marker node for replicated levels, the value node
    /// for leaves, the subset node for the root.
    pub node_idx: usize,
    pub typ: Typ,
    /// Query-visible mnemonic (the body's tag for replicated levels).
    pub tag: String,
    /// Mnemonic used in dimension path strings (the marker's framed tag
    /// with the framing characters stripped).
    pub dim_name: String,
    pub type_info: TypeInfo,
    pub parent: Option<u32>,
    pub children: Vec<u32>,
}

/// The query tree of one subset, built from the provider's linear table.
///
/// Nodes live in a flat arena addressed by `u32` offsets; parent/child
/// links are indices, so the bidirectional structure owns no cycles.
#[derive(Debug, Clone)]
pub struct SubsetTable {
    nodes: Vec<BufrNode>,
    root: u32,
}

impl SubsetTable {
    pub fn from_provider(provider: &impl DataProvider) -> Self {
        let inode = provider.inode();
        let isc = provider.isc(inode);

        let mut table = SubsetTable {
            nodes: vec![BufrNode {
                node_idx: inode,
                typ: Typ::Subset,
                tag: provider.tag(inode).to_string(),
                dim_name: String::new(),
                type_info: TypeInfo::default(),
                parent: None,
                children: Vec::new(),
            }],
            root: 0,
        };

        // Table index of each open container body -> its tree level.
        let mut level_of: HashMap<usize, u32> = HashMap::new();
        // Marker table index -> the tree node created for its construct.
        let mut marker_level: HashMap<usize, u32> = HashMap::new();

        let resolve_level = |levels: &HashMap<usize, u32>, j: usize| -> u32 {
            if j == 0 || j == inode {
                0
            } else {
                levels.get(&j).copied().unwrap_or(0)
            }
        };

        for n in (inode + 1)..=isc {
            let typ = provider.typ(n);
            if typ.is_replication() {
                // The body follows the marker; its tag is the query name.
                let tag = if n < isc {
                    provider.tag(n + 1).to_string()
                } else {
                    strip_framing(provider.tag(n)).to_string()
                };
                let parent = resolve_level(&level_of, provider.jmpb(n));
                let id = table.push(BufrNode {
                    node_idx: n,
                    typ,
                    tag,
                    dim_name: strip_framing(provider.tag(n)).to_string(),
                    type_info: TypeInfo::default(),
                    parent: Some(parent),
                    children: Vec::new(),
                });
                marker_level.insert(n, id);
            } else if matches!(typ, Typ::Sequence | Typ::Repeat | Typ::StackedRepeat) {
                let j = provider.jmpb(n);
                if provider.typ(j).is_replication() {
                    // Body of the construct at j: inherits its tree level.
                    if let Some(&id) = marker_level.get(&j) {
                        level_of.insert(n, id);
                    }
                } else {
                    // Plain sequence: transparent, children attach upward.
                    level_of.insert(n, resolve_level(&level_of, j));
                }
            } else if typ.is_value() {
                let parent = resolve_level(&level_of, provider.jmpb(n));
                table.push(BufrNode {
                    node_idx: n,
                    typ,
                    tag: provider.tag(n).to_string(),
                    dim_name: String::new(),
                    type_info: provider.type_info(n),
                    parent: Some(parent),
                    children: Vec::new(),
                });
            }
        }

        table
    }

    fn push(&mut self, node: BufrNode) -> u32 {
        let id = self.nodes.len() as u32;
        if let Some(parent) = node.parent {
            self.nodes[parent as usize].children.push(id);
        }
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: u32) -> &BufrNode {
        &self.nodes[id as usize]
    }

    pub fn root(&self) -> &BufrNode {
        self.node(self.root)
    }

    /// All nodes matching a query path, in table order.
    ///
    /// Interior components match replicated-sequence levels by mnemonic; an
    /// interior index picks the i-th same-named occurrence (out-of-range
    /// indices match nothing). The final component matches any child. An
    /// unmatched path yields an empty vec; only malformed paths error.
    pub fn nodes_for_path(&self, path: &[QueryComponent]) -> Result<Vec<u32>, QueryError> {
        let Some((last, interior)) = path.split_last() else {
            return Err(QueryError::InvalidPath {
                reason: "query path has no components".to_string(),
            });
        };
        if path.iter().any(|c| c.name.is_empty()) {
            return Err(QueryError::InvalidPath {
                reason: "query path has an empty component".to_string(),
            });
        }

        let mut frontier = vec![self.root];
        for component in interior {
            let mut matches = Vec::new();
            for &level in &frontier {
                for &child in &self.nodes[level as usize].children {
                    let node = &self.nodes[child as usize];
                    if !node.typ.is_value() && node.tag == component.name {
                        matches.push(child);
                    }
                }
            }
            if component.index > 0 {
                matches = match matches.get(component.index - 1) {
                    Some(&id) => vec![id],
                    None => Vec::new(),
                };
            }
            if matches.is_empty() {
                return Ok(Vec::new());
            }
            frontier = matches;
        }

        let mut endpoints = Vec::new();
        for &level in &frontier {
            for &child in &self.nodes[level as usize].children {
                if self.nodes[child as usize].tag == last.name {
                    endpoints.push(child);
                }
            }
        }
        Ok(endpoints)
    }

    /// First node matching a query path, if any.
    pub fn node_for_path(&self, path: &[QueryComponent]) -> Result<Option<&BufrNode>, QueryError> {
        Ok(self
            .nodes_for_path(path)?
            .first()
            .map(|&id| self.node(id)))
    }

    /// Root-to-node path through the tree.
    pub fn path_nodes(&self, id: u32) -> Vec<u32> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.nodes[current as usize].parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Cumulative dimension path strings for the replicating levels
    /// enclosing `id`, starting with the root `*` dimension.
    pub fn dim_paths(&self, id: u32) -> Vec<String> {
        self.dim_info(id).0
    }

    /// Path positions of the dimensioning levels enclosing `id`, starting
    /// with the root dimension at position 0.
    pub fn dim_idxs(&self, id: u32) -> Vec<usize> {
        self.dim_info(id).1
    }

    fn dim_info(&self, id: u32) -> (Vec<String>, Vec<usize>) {
        let path = self.path_nodes(id);
        let mut dim_paths = vec!["*".to_string()];
        let mut dim_idxs = vec![0];
        let mut current = "*".to_string();

        // Interior levels only: the endpoint itself is not a dimension.
        for (pos, &node_id) in path
            .iter()
            .enumerate()
            .take(path.len().saturating_sub(1))
            .skip(1)
        {
            let node = &self.nodes[node_id as usize];
            current = format!("{current}/{}", node.dim_name);
            if node.typ.is_dimensioning() {
                dim_idxs.push(pos);
                dim_paths.push(current.clone());
            }
        }

        (dim_paths, dim_idxs)
    }
}

/// Strip the two framing characters a marker tag carries (e.g. `{PLEVL}`
/// -> `PLEVL`). Tags too short to be framed pass through unchanged.
fn strip_framing(tag: &str) -> &str {
    if tag.len() >= 2 && tag.is_char_boundary(1) && tag.is_char_boundary(tag.len() - 1) {
        &tag[1..tag.len() - 1]
    } else {
        tag
    }
}
