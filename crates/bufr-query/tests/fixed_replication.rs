//! Fixed replications carry no counts in the inventory; the collector
//! reconstructs them structurally.


use bufr_model::QuerySet;
use bufr_query::{DataValues, QueryRunner, ResultSet};
use pretty_assertions::assert_eq;
use subset_builder::{query, Instance, Node, SubsetTemplate};

#[test]
fn fixed_arity_counts_are_reconstructed() {
    let template = SubsetTemplate::new(
        "NC000010",
        vec![Node::fixed_rep("LOC", vec![Node::num("LAT")])],
    );
    let data = Instance::new().occurrences(
        "LOC",
        (1..=4)
            .map(|i| Instance::new().values("LAT", [i as f64]))
            .collect(),
    );

    let mut query_set = QuerySet::new();
    query_set.add("latitude", query("*/LOC/LAT"));

    let mut runner = QueryRunner::new(query_set);
    let mut results = ResultSet::new();
    runner.accumulate(&template.provider(&data), &mut results).unwrap();

    // One instance, arity four.
    let field = results.frames()[0].field_at(0);
    assert_eq!(field.seq_counts, vec![vec![1], vec![4]]);

    let object = results.get("latitude", None, None).unwrap();
    assert_eq!(object.dims, [1, 4]);
    assert_eq!(object.data, DataValues::Float64(vec![1.0, 2.0, 3.0, 4.0]));
}

#[test]
fn fixed_replication_nested_in_delayed() {
    let template = SubsetTemplate::new(
        "NC000010",
        vec![Node::delayed_rep(
            "OBS",
            vec![Node::fixed_rep("LOC", vec![Node::num("LAT")])],
        )],
    );
    let data = Instance::new().occurrences(
        "OBS",
        vec![
            Instance::new().occurrences(
                "LOC",
                vec![
                    Instance::new().values("LAT", [1.0]),
                    Instance::new().values("LAT", [2.0]),
                ],
            ),
            Instance::new().occurrences(
                "LOC",
                vec![
                    Instance::new().values("LAT", [3.0]),
                    Instance::new().values("LAT", [4.0]),
                ],
            ),
        ],
    );

    let mut query_set = QuerySet::new();
    query_set.add("latitude", query("*/OBS/LOC/LAT"));

    let mut runner = QueryRunner::new(query_set);
    let mut results = ResultSet::new();
    runner.accumulate(&template.provider(&data), &mut results).unwrap();

    let field = results.frames()[0].field_at(0);
    assert_eq!(field.seq_counts, vec![vec![1], vec![2], vec![2, 2]]);

    let object = results.get("latitude", None, None).unwrap();
    assert_eq!(object.dims, [1, 2, 2]);
    assert_eq!(object.data, DataValues::Float64(vec![1.0, 2.0, 3.0, 4.0]));
}
