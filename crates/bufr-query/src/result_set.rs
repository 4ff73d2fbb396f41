use bufr_model::{split_path, TypeInfo};

use crate::data_object::{DataObject, DataValues, OverrideType};
use crate::error::QueryError;
use crate::frame::DataFrame;
use crate::MISSING_VALUE;

/// Frames collected across subsets, queryable by field name.
///
/// Frames appear in the order the caller drove subset iteration; `get`
/// assembles one field's fragments into a dense row-major array, padding
/// jagged occurrence shapes with [`MISSING_VALUE`].
#[derive(Debug, Default)]
pub struct ResultSet {
    frames: Vec<DataFrame>,
}

struct RawValues {
    data: Vec<f64>,
    dims: Vec<usize>,
    dim_paths: Vec<String>,
    info: TypeInfo,
}

impl ResultSet {
    pub fn new() -> Self {
        ResultSet::default()
    }

    pub(crate) fn add_frame(&mut self, frame: DataFrame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[DataFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop all collected frames, keeping the set reusable.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Assemble the typed N-dimensional array for a field.
    ///
    /// The element type comes from the merged type info of the field's
    /// targets, or from `override_type`; converting between numbers and
    /// strings is rejected. `group_by` is validated for dimension-path
    /// compatibility and recorded on the output object.
    pub fn get(
        &self,
        field_name: &str,
        group_by: Option<&str>,
        override_type: Option<OverrideType>,
    ) -> Result<DataObject, QueryError> {
        let raw = self.raw_values(field_name, group_by)?;

        let data = match override_type {
            Some(override_type) => {
                if override_type.is_string() != raw.info.is_string() {
                    return Err(QueryError::IncompatibleOverride {
                        field: field_name.to_string(),
                    });
                }
                DataValues::from_override(override_type, &raw.data, MISSING_VALUE)
            }
            None => DataValues::from_type_info(&raw.info, &raw.data, MISSING_VALUE),
        };

        Ok(DataObject {
            field_name: field_name.to_string(),
            group_by_field_name: group_by.unwrap_or("").to_string(),
            dims: raw.dims,
            dim_paths: raw.dim_paths,
            data,
        })
    }

    /// The Table B unit of the field's resolved target, `""` when absent.
    pub fn unit(&self, field_name: &str) -> Result<String, QueryError> {
        let first = self.frames.first().ok_or(QueryError::EmptyResultSet)?;
        first
            .fields()
            .iter()
            .find(|field| field.target.name == field_name)
            .map(|field| field.target.type_info.unit.clone())
            .ok_or_else(|| QueryError::FieldNotFound {
                field: field_name.to_string(),
            })
    }

    fn raw_values(
        &self,
        field_name: &str,
        group_by: Option<&str>,
    ) -> Result<RawValues, QueryError> {
        let first = self.frames.first().ok_or(QueryError::EmptyResultSet)?;

        let target_idx = first
            .fields()
            .iter()
            .position(|field| field.target.name == field_name)
            .ok_or_else(|| QueryError::FieldNotFound {
                field: field_name.to_string(),
            })?;

        if let Some(group_by_name) = group_by.filter(|name| !name.is_empty()) {
            self.check_group_by(first, target_idx, field_name, group_by_name)?;
        }

        // Per-level maxima across frames, jaggedness, merged type info and
        // the deepest dimension-path description any frame resolved.
        let mut dims_list: Vec<i32> = Vec::new();
        let mut jagged = false;
        let mut dim_paths: Vec<String> = Vec::new();
        let mut export_dims: Vec<usize> = Vec::new();
        let mut info = TypeInfo::default();

        for frame in &self.frames {
            let field = frame.field_at(target_idx);
            let target = &field.target;

            if dims_list.len() < field.seq_counts.len() {
                dims_list.resize(field.seq_counts.len(), 0);
            }
            for (level, counts) in field.seq_counts.iter().enumerate() {
                if counts.is_empty() {
                    break;
                }
                let frame_max = counts.iter().copied().max().unwrap_or(0);
                let new_dim = dims_list[level].max(frame_max);

                if !jagged {
                    jagged = !counts.iter().all(|&c| c == counts[0]);
                    if !jagged && dims_list[level] != 0 {
                        jagged = dims_list[level] != new_dim;
                    }
                }

                dims_list[level] = new_dim;
            }

            info.reference = info.reference.min(target.type_info.reference);
            info.bits = info.bits.max(target.type_info.bits);
            if target.type_info.scale.abs() > info.scale.abs() {
                info.scale = target.type_info.scale;
            }
            if info.unit.is_empty() {
                info.unit = target.type_info.unit.clone();
            }

            if !target.dim_paths.is_empty() && dim_paths.len() < target.dim_paths.len() {
                dim_paths = target.dim_paths.clone();
                export_dims = target.export_dim_idxs.clone();
            }
        }

        // A field with no data anywhere still needs one slot per dimension
        // for the missing value.
        let mut dims: Vec<usize> = dims_list
            .iter()
            .map(|&d| if d <= 0 { 1 } else { d as usize })
            .collect();
        if dims.is_empty() {
            dims.push(1);
        }

        let row_length: usize = dims[1..].iter().product();
        let total_rows = self.frames.len();
        let mut data = vec![MISSING_VALUE; total_rows * row_length];

        for (frame_idx, frame) in self.frames.iter().enumerate() {
            let field = frame.field_at(target_idx);
            let fragment = &field.data;

            if jagged {
                self.place_jagged(
                    fragment,
                    &field.seq_counts,
                    &dims,
                    frame_idx * row_length,
                    &mut data,
                );
            } else {
                let start = frame_idx * row_length;
                let len = fragment.len().min(row_length);
                data[start..start + len].copy_from_slice(&fragment[..len]);
            }
        }

        dims[0] = total_rows;
        let dims: Vec<usize> = export_dims
            .iter()
            .filter_map(|&idx| dims.get(idx).copied())
            .collect();

        Ok(RawValues {
            data,
            dims,
            dim_paths,
            info,
        })
    }

    /// Land each fragment value on its hyperslab boundary, leaving missing
    /// padding in the gaps.
    ///
    /// For level `k` and occurrence `i` the pad width is
    /// `prod(dims[k..]) - counts[k][i] * prod(dims[k+1..])`; indices past an
    /// occurrence's kept region shift upward by it, innermost level first.
    fn place_jagged(
        &self,
        fragment: &[f64],
        seq_counts: &[Vec<i32>],
        dims: &[usize],
        row_offset: usize,
        data: &mut [f64],
    ) {
        let mut idxs: Vec<usize> = (0..fragment.len()).collect();
        let levels = dims.len().min(seq_counts.len());

        for dim_idx in (0..levels).rev() {
            let stride: usize = dims[dim_idx..].iter().product();
            let substride: usize = dims[dim_idx + 1..].iter().product();

            for (insert_idx, &count) in seq_counts[dim_idx].iter().enumerate() {
                let kept = count.max(0) as usize * substride;
                let num_inserts = stride.saturating_sub(kept);
                if num_inserts == 0 {
                    continue;
                }
                let boundary = (stride * insert_idx + stride) as isize - num_inserts as isize - 1;
                for idx in idxs.iter_mut() {
                    if *idx as isize > boundary {
                        *idx += num_inserts;
                    }
                }
            }
        }

        for (value_idx, &slot) in idxs.iter().enumerate() {
            if let Some(out) = data.get_mut(row_offset + slot) {
                *out = fragment[value_idx];
            }
        }
    }

    fn check_group_by(
        &self,
        frame: &DataFrame,
        target_idx: usize,
        field_name: &str,
        group_by_name: &str,
    ) -> Result<(), QueryError> {
        let group_by_target = frame
            .fields()
            .iter()
            .find(|field| field.target.name == group_by_name)
            .map(|field| &field.target)
            .ok_or_else(|| QueryError::FieldNotFound {
                field: group_by_name.to_string(),
            })?;
        let target = &frame.field_at(target_idx).target;

        let group_by_path = group_by_target
            .dim_paths
            .last()
            .cloned()
            .unwrap_or_default();
        let field_path = target.dim_paths.last().cloned().unwrap_or_default();

        let group_by_comps = split_path(&group_by_path);
        let field_comps = split_path(&field_path);

        for idx in 1..group_by_comps.len().min(field_comps.len()) {
            if group_by_comps[idx] != field_comps[idx] {
                return Err(QueryError::IncompatibleGroupBy {
                    group_by: group_by_name.to_string(),
                    group_by_path,
                    field: field_name.to_string(),
                    field_path,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::DataField;
    use crate::target::Target;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn frame_for(target: &Arc<Target>, data: Vec<f64>, seq_counts: Vec<Vec<i32>>) -> DataFrame {
        DataFrame::new(vec![DataField {
            target: Arc::clone(target),
            data,
            seq_counts,
        }])
    }

    fn leaf_target(name: &str) -> Arc<Target> {
        Arc::new(Target {
            name: name.to_string(),
            query_str: format!("*/{name}"),
            node_idx: 3,
            seq_path: vec![2],
            dim_paths: vec!["*".to_string(), "*/OBS".to_string()],
            export_dim_idxs: vec![0, 1],
            ..Target::default()
        })
    }

    #[test]
    fn uniform_frames_copy_contiguously() {
        let target = leaf_target("x");
        let mut set = ResultSet::new();
        set.add_frame(frame_for(&target, vec![1.0, 2.0], vec![vec![1], vec![2]]));
        set.add_frame(frame_for(&target, vec![3.0, 4.0], vec![vec![1], vec![2]]));

        let object = set.get("x", None, Some(OverrideType::Double)).unwrap();
        assert_eq!(object.dims, [2, 2]);
        assert_eq!(
            object.data,
            DataValues::Float64(vec![1.0, 2.0, 3.0, 4.0])
        );
    }

    #[test]
    fn jagged_frames_pad_with_missing() {
        let target = leaf_target("x");
        let mut set = ResultSet::new();
        set.add_frame(frame_for(&target, vec![1.0, 2.0], vec![vec![1], vec![2]]));
        set.add_frame(frame_for(&target, vec![3.0], vec![vec![1], vec![1]]));

        let object = set.get("x", None, Some(OverrideType::Double)).unwrap();
        assert_eq!(object.dims, [2, 2]);
        assert_eq!(
            object.data,
            DataValues::Float64(vec![1.0, 2.0, 3.0, MISSING_VALUE])
        );
    }

    #[test]
    fn zero_dims_lift_to_missing_slots() {
        let target = leaf_target("x");
        let mut set = ResultSet::new();
        set.add_frame(frame_for(&target, vec![], vec![vec![1], vec![0]]));

        let object = set.get("x", None, Some(OverrideType::Double)).unwrap();
        assert_eq!(object.dims, [1, 1]);
        assert_eq!(object.data, DataValues::Float64(vec![MISSING_VALUE]));
    }

    #[test]
    fn get_before_any_frames_is_an_error() {
        let set = ResultSet::new();
        assert!(matches!(
            set.get("x", None, None),
            Err(QueryError::EmptyResultSet)
        ));
    }

    #[test]
    fn unknown_fields_are_reported() {
        let target = leaf_target("x");
        let mut set = ResultSet::new();
        set.add_frame(frame_for(&target, vec![1.0], vec![vec![1], vec![1]]));

        assert!(matches!(
            set.get("y", None, None),
            Err(QueryError::FieldNotFound { .. })
        ));
    }
}
