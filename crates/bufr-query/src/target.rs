use std::sync::Arc;

use bufr_model::{QueryComponent, Typ, TypeInfo};

/// Role of one component along a resolved target's path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TargetComponentKind {
    /// The subset root.
    Subset,
    /// A replicated sequence level.
    Repeat,
    /// The value endpoint.
    Value,
}

impl TargetComponentKind {
    pub(crate) fn for_typ(typ: Typ) -> Self {
        match typ {
            Typ::Subset => TargetComponentKind::Subset,
            Typ::Number | Typ::Character => TargetComponentKind::Value,
            _ => TargetComponentKind::Repeat,
        }
    }
}

/// One level of a resolved target path: the query component it satisfied,
/// the table node it bound to (`branch`), and its role.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetComponent {
    pub query_component: QueryComponent,
    pub branch: usize,
    pub kind: TargetComponentKind,
}

/// A query resolved against one subset's table.
///
/// `node_idx` is the endpoint node (0 for an empty target); `seq_path` lists
/// the replication marker nodes enclosing it, outermost first. Targets are
/// immutable once resolved and shared via [`Arc`] between the resolution
/// cache and collected frames.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Target {
    pub name: String,
    pub query_str: String,
    pub node_idx: usize,
    pub path: Vec<TargetComponent>,
    pub seq_path: Vec<usize>,
    pub type_info: TypeInfo,
    pub dim_paths: Vec<String>,
    pub export_dim_idxs: Vec<usize>,
}

impl Target {
    /// A target for a query that resolved to nothing in this subset; result
    /// assembly fills its slots with the missing value.
    pub(crate) fn empty(name: impl Into<String>, query_str: impl Into<String>) -> Self {
        Target {
            name: name.into(),
            query_str: query_str.into(),
            node_idx: 0,
            path: Vec::new(),
            seq_path: Vec::new(),
            type_info: TypeInfo::default(),
            dim_paths: vec!["*".to_string()],
            export_dim_idxs: vec![0],
        }
    }

    /// Install the resolved path and derive `seq_path` from its replication
    /// levels, in traversal order.
    pub(crate) fn set_path(&mut self, path: Vec<TargetComponent>) {
        self.seq_path = path
            .iter()
            .filter(|c| c.kind == TargetComponentKind::Repeat)
            .map(|c| c.branch)
            .collect();
        self.path = path;
    }
}

/// Resolved targets for one subset, in query-set order.
pub type Targets = Vec<Arc<Target>>;
