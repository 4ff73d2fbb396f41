use std::sync::Arc;

use crate::target::{Target, Targets};

/// Collected values for one target in one subset.
///
/// `seq_counts` holds one vector per path level: `seq_counts[0]` is the
/// implicit message dimension (`[1]`), `seq_counts[k + 1]` the occurrence
/// counts of the k-th replication level along the target's `seq_path`, one
/// entry per time that level opened.
#[derive(Debug, Clone)]
pub struct DataField {
    pub target: Arc<Target>,
    pub data: Vec<f64>,
    pub seq_counts: Vec<Vec<i32>>,
}

/// The per-target data extracted from one subset.
#[derive(Debug, Clone)]
pub struct DataFrame {
    fields: Vec<DataField>,
}

impl DataFrame {
    pub(crate) fn new(fields: Vec<DataField>) -> Self {
        DataFrame { fields }
    }

    pub fn fields(&self) -> &[DataField] {
        &self.fields
    }

    pub fn field_at(&self, idx: usize) -> &DataField {
        &self.fields[idx]
    }

    /// The targets this frame was collected against, in query-set order.
    pub fn targets(&self) -> Targets {
        self.fields.iter().map(|f| Arc::clone(&f.target)).collect()
    }
}
