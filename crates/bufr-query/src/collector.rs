use std::sync::Arc;

use bufr_model::Typ;
use smallvec::SmallVec;

use crate::frame::{DataField, DataFrame};
use crate::masks::ProcessingMasks;
use crate::offset_array::OffsetArray;
use crate::provider::DataProvider;
use crate::target::Targets;
use crate::MISSING_VALUE;

#[derive(Debug, Clone, Default)]
struct NodeData {
    values: Vec<f64>,
    counts: Vec<i32>,
}

/// Walk one subset's value inventory and extract a [`DataFrame`] for the
/// resolved targets.
///
/// Fixed replications do not carry their arity as an inventory value, so
/// occurrence counts are reconstructed by tracing the nested sequences and
/// counting body entries; since the trace is needed for fixed replications
/// anyway, it is done uniformly for every replication type.
pub(crate) fn collect_frame(
    targets: &Targets,
    masks: &ProcessingMasks,
    provider: &impl DataProvider,
) -> DataFrame {
    let inode = provider.inode();
    let isc = provider.isc(inode);

    // Counts accrue on the node after each replication marker (its body),
    // hence the extra slot past isc.
    let mut data_table: OffsetArray<NodeData> = OffsetArray::new(inode, isc + 1);

    // Replication markers currently open, and for each the node at which it
    // closes (0: closes with the enclosing sequence).
    let mut current_path: SmallVec<[usize; 8]> = SmallVec::new();
    let mut current_returns: SmallVec<[usize; 8]> = SmallVec::new();
    let mut return_node_idx: isize = -1;
    let mut last_nonzero_return_idx: isize = -1;

    for cursor in 1..=provider.n_val() {
        let node_idx = provider.inv(cursor);

        if masks.is_value_node(node_idx) {
            if let Some(node_data) = data_table.get_mut(node_idx) {
                node_data.values.push(provider.val(cursor));
            }
        }

        let jmpb = provider.jmpb(node_idx);
        if jmpb > 0 && masks.is_path_node(jmpb) {
            let typ = provider.typ(node_idx);
            let opens_occurrence = match typ {
                Typ::Repeat | Typ::StackedRepeat => true,
                Typ::Sequence => matches!(
                    provider.typ(jmpb),
                    Typ::Sequence | Typ::DelayedBinary | Typ::FixedRep
                ),
                _ => false,
            };
            if opens_occurrence {
                if let Some(count) = data_table
                    .get_mut(node_idx)
                    .and_then(|node_data| node_data.counts.last_mut())
                {
                    *count += 1;
                }
            }
        }

        if !current_path.is_empty() {
            let top = current_path[current_path.len() - 1];
            if node_idx as isize == return_node_idx
                || cursor == provider.n_val()
                || (current_path.len() > 1 && node_idx == top + 1)
            {
                // Unwind to the first open level with a live return target.
                // Delayed replications re-enter their body head once on loop
                // exit, so they over-count by one at close.
                let floor = last_nonzero_return_idx.max(0) as usize;
                while current_returns.len() > floor {
                    current_returns.pop();
                    if let Some(seq_node) = current_path.pop() {
                        let seq_typ = provider.typ(seq_node);
                        if matches!(seq_typ, Typ::DelayedRep | Typ::DelayedRepStacked) {
                            if let Some(count) = data_table
                                .get_mut(seq_node + 1)
                                .and_then(|node_data| node_data.counts.last_mut())
                            {
                                *count -= 1;
                            }
                        }
                    }
                }

                last_nonzero_return_idx = current_returns.len() as isize - 1;
                return_node_idx = if current_returns.is_empty() {
                    0
                } else {
                    current_returns[last_nonzero_return_idx as usize] as isize
                };
            }
        }

        if masks.is_path_node(node_idx) && provider.typ(node_idx).is_replication() {
            if provider.typ(node_idx) == Typ::DelayedBinary && provider.val(cursor) == 0.0 {
                // The gated sub-tree is absent; nothing opens.
            } else {
                current_path.push(node_idx);
                let close_target = provider.link(node_idx);
                current_returns.push(close_target);

                if close_target != 0 {
                    last_nonzero_return_idx = current_returns.len() as isize - 1;
                    return_node_idx = close_target as isize;
                } else {
                    last_nonzero_return_idx = 0;
                    return_node_idx = 0;

                    // Closes with an enclosing sequence: find the nearest
                    // open level whose container has a live close target.
                    if cursor != provider.n_val() {
                        for path_idx in (0..current_path.len()).rev() {
                            return_node_idx =
                                provider.link(provider.jmpb(current_path[path_idx])) as isize;
                            last_nonzero_return_idx =
                                (current_returns.len() - path_idx) as isize;
                            if return_node_idx != 0 {
                                break;
                            }
                        }
                    }
                }
            }

            // A new occurrence run of the replicated body begins; its
            // element count accrues from zero as entries stream in.
            if let Some(node_data) = data_table.get_mut(node_idx + 1) {
                node_data.counts.push(0);
            }
        }
    }

    let fields = targets
        .iter()
        .map(|target| {
            if target.node_idx == 0 {
                return DataField {
                    target: Arc::clone(target),
                    data: vec![MISSING_VALUE],
                    seq_counts: vec![vec![1]],
                };
            }

            let mut seq_counts = Vec::with_capacity(target.seq_path.len() + 1);
            seq_counts.push(vec![1]);
            for &seq_node in &target.seq_path {
                seq_counts.push(
                    data_table
                        .get(seq_node + 1)
                        .map(|node_data| node_data.counts.clone())
                        .unwrap_or_default(),
                );
            }

            DataField {
                target: Arc::clone(target),
                data: data_table
                    .get(target.node_idx)
                    .map(|node_data| node_data.values.clone())
                    .unwrap_or_default(),
                seq_counts,
            }
        })
        .collect();

    DataFrame::new(fields)
}
