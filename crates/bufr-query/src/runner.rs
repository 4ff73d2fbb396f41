use std::collections::HashMap;
use std::sync::Arc;

use bufr_model::{Query, QueryComponent, QuerySet};

use crate::collector::collect_frame;
use crate::error::QueryError;
use crate::masks::ProcessingMasks;
use crate::provider::DataProvider;
use crate::result_set::ResultSet;
use crate::sink::{DiscardWarnings, WarningSink};
use crate::subset_table::SubsetTable;
use crate::target::{Target, TargetComponent, TargetComponentKind, Targets};

/// One query session: resolves a [`QuerySet`] against each subset a provider
/// yields and accumulates the collected frames into a [`ResultSet`].
///
/// Resolution is memoized per subset name; cache entries are immutable for
/// the life of the runner. Queries that do not apply to a subset produce
/// empty targets and a message on the warning sink, never an error.
pub struct QueryRunner {
    query_set: QuerySet,
    target_cache: HashMap<String, Arc<Targets>>,
    mask_cache: HashMap<String, Arc<ProcessingMasks>>,
    sink: Box<dyn WarningSink>,
}

impl QueryRunner {
    pub fn new(query_set: QuerySet) -> Self {
        QueryRunner {
            query_set,
            target_cache: HashMap::new(),
            mask_cache: HashMap::new(),
            sink: Box::new(DiscardWarnings),
        }
    }

    /// Replace the default discard sink.
    pub fn with_warning_sink(mut self, sink: impl WarningSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Resolve targets for the provider's current subset and collect one
    /// frame into `result_set`.
    pub fn accumulate(
        &mut self,
        provider: &impl DataProvider,
        result_set: &mut ResultSet,
    ) -> Result<(), QueryError> {
        let (targets, masks) = self.find_targets(provider)?;
        result_set.add_frame(collect_frame(&targets, &masks, provider));
        Ok(())
    }

    /// The resolved targets and masks for the provider's current subset,
    /// resolving and caching them on first sight of the subset name.
    pub fn find_targets(
        &mut self,
        provider: &impl DataProvider,
    ) -> Result<(Arc<Targets>, Arc<ProcessingMasks>), QueryError> {
        let subset = provider.subset_name();
        if let (Some(targets), Some(masks)) =
            (self.target_cache.get(subset), self.mask_cache.get(subset))
        {
            return Ok((Arc::clone(targets), Arc::clone(masks)));
        }

        let num_nodes = provider.isc(provider.inode());
        let mut masks = ProcessingMasks::new(num_nodes);
        let table = SubsetTable::from_provider(provider);

        let names: Vec<String> = self.query_set.names().map(str::to_string).collect();
        let mut targets: Targets = Vec::with_capacity(names.len());

        for name in &names {
            let queries = self.query_set.queries_for(name);
            let target = self.resolve_name(name, queries, provider, &table)?;

            if target.node_idx != 0 {
                masks.value_node_mask[target.node_idx] = true;
                for &seq_node in &target.seq_path {
                    masks.path_node_mask[seq_node] = true;
                }
            }

            targets.push(Arc::new(target));
        }

        let targets = Arc::new(targets);
        let masks = Arc::new(masks);
        self.target_cache
            .insert(subset.to_string(), Arc::clone(&targets));
        self.mask_cache.insert(subset.to_string(), Arc::clone(&masks));
        Ok((targets, masks))
    }

    fn resolve_name(
        &self,
        name: &str,
        queries: &[Query],
        provider: &impl DataProvider,
        table: &SubsetTable,
    ) -> Result<Target, QueryError> {
        for query in queries {
            if !query.subset.matches(provider.subset_name()) {
                continue;
            }

            let mut endpoints = table.nodes_for_path(&query.path)?;

            // An endpoint index narrows to one occurrence; an out-of-range
            // index leaves the full set, and any remaining ambiguity is the
            // caller's to resolve with a better index.
            if let Some(last) = query.path.last() {
                if last.index > 0 && last.index <= endpoints.len() {
                    endpoints = vec![endpoints[last.index - 1]];
                }
            }

            if endpoints.len() > 1 {
                return Err(QueryError::AmbiguousQuery {
                    query: query.query_str.clone(),
                });
            }

            if let Some(&endpoint) = endpoints.first() {
                return Ok(self.build_target(name, query, table, endpoint));
            }
        }

        self.warn_unresolved(name, queries, provider.subset_name());
        let query_str = queries
            .first()
            .map(|q| q.query_str.clone())
            .unwrap_or_default();
        Ok(Target::empty(name, query_str))
    }

    fn build_target(
        &self,
        name: &str,
        query: &Query,
        table: &SubsetTable,
        endpoint: u32,
    ) -> Target {
        let mut target = Target {
            name: name.to_string(),
            query_str: query.query_str.clone(),
            ..Target::default()
        };

        let nodes = table.path_nodes(endpoint);
        let mut path = Vec::with_capacity(nodes.len());
        path.push(TargetComponent {
            query_component: QueryComponent::new(query.subset.to_string()),
            branch: 0,
            kind: TargetComponentKind::Subset,
        });
        for (level, &node_id) in nodes.iter().enumerate().skip(1) {
            let node = table.node(node_id);
            path.push(TargetComponent {
                query_component: query
                    .path
                    .get(level - 1)
                    .cloned()
                    .unwrap_or_else(|| QueryComponent::new(node.tag.clone())),
                branch: node.node_idx,
                kind: TargetComponentKind::for_typ(node.typ),
            });
        }
        target.set_path(path);

        let endpoint_node = table.node(endpoint);
        target.node_idx = endpoint_node.node_idx;
        target.type_info = endpoint_node.type_info.clone();
        target.dim_paths = table.dim_paths(endpoint);
        target.export_dim_idxs = table.dim_idxs(endpoint);
        target
    }

    fn warn_unresolved(&self, name: &str, queries: &[Query], subset: &str) {
        let query_strs = match queries {
            [] => String::from("<none>"),
            [query] => query.query_str.clone(),
            _ => {
                let joined: Vec<&str> =
                    queries.iter().map(|q| q.query_str.as_str()).collect();
                format!("[{}]", joined.join(", "))
            }
        };
        self.sink.warn(&format!(
            "query {query_strs} for \"{name}\" did not apply to subset {subset}"
        ));
    }
}
