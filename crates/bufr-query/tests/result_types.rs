//! Element-type dispatch, overrides, and character data.


use bufr_model::{QuerySet, TypeInfo};
use bufr_query::{DataValues, OverrideType, QueryError, QueryRunner, ResultSet};
use pretty_assertions::assert_eq;
use subset_builder::{query, Instance, Node, SubsetTemplate};

fn run_one(template: &SubsetTemplate, data: &Instance, name: &str, q: &str) -> ResultSet {
    let mut query_set = QuerySet::new();
    query_set.add(name, query(q));
    let mut runner = QueryRunner::new(query_set);
    let mut results = ResultSet::new();
    runner.accumulate(&template.provider(data), &mut results).unwrap();
    results
}

#[test]
fn code_table_elements_come_back_as_unsigned_ints() {
    let template = SubsetTemplate::new(
        "NC000040",
        vec![Node::num_with_info(
            "CLTP",
            TypeInfo {
                scale: 0,
                reference: 0,
                bits: 16,
                unit: "CODE TABLE".to_string(),
            },
        )],
    );
    let results = run_one(
        &template,
        &Instance::new().values("CLTP", [5.0]),
        "cloud_type",
        "*/CLTP",
    );

    let object = results.get("cloud_type", None, None).unwrap();
    assert_eq!(object.data, DataValues::UInt32(vec![5]));
}

#[test]
fn negative_reference_elements_come_back_signed() {
    let template = SubsetTemplate::new(
        "NC000040",
        vec![Node::num_with_info(
            "TDIF",
            TypeInfo {
                scale: 0,
                reference: -1024,
                bits: 12,
                unit: "NUMERIC".to_string(),
            },
        )],
    );
    let results = run_one(
        &template,
        &Instance::new().values("TDIF", [-3.0]),
        "difference",
        "*/TDIF",
    );

    let object = results.get("difference", None, None).unwrap();
    assert_eq!(object.data, DataValues::Int32(vec![-3]));
}

#[test]
fn wide_unsigned_elements_use_64_bits() {
    let template = SubsetTemplate::new(
        "NC000040",
        vec![Node::num_with_info(
            "BIGV",
            TypeInfo {
                scale: 0,
                reference: 0,
                bits: 40,
                unit: "NUMERIC".to_string(),
            },
        )],
    );
    let results = run_one(
        &template,
        &Instance::new().values("BIGV", [1e10]),
        "big",
        "*/BIGV",
    );

    let object = results.get("big", None, None).unwrap();
    assert_eq!(object.data, DataValues::UInt64(vec![10_000_000_000]));
}

#[test]
fn character_elements_decode_to_strings() {
    let template = SubsetTemplate::new("NC000040", vec![Node::chr("STID")]);
    let results = run_one(
        &template,
        &Instance::new().strings("STID", &["KTLX"]),
        "station",
        "*/STID",
    );

    let object = results.get("station", None, None).unwrap();
    assert_eq!(object.data, DataValues::Str(vec!["KTLX".to_string()]));
    assert_eq!(results.unit("station").unwrap(), "CCITT IA5");
}

#[test]
fn overrides_pick_the_element_type() {
    let template = SubsetTemplate::new("NC000040", vec![Node::num("TEMP")]);
    let data = Instance::new().values("TEMP", [273.6]);
    let results = run_one(&template, &data, "temperature", "*/TEMP");

    match results
        .get("temperature", None, Some(OverrideType::Int))
        .unwrap()
        .data
    {
        DataValues::Int32(values) => assert_eq!(values, [274]),
        other => panic!("expected Int32, got {other:?}"),
    }

    match results
        .get("temperature", None, Some(OverrideType::Float))
        .unwrap()
        .data
    {
        DataValues::Float32(values) => assert_eq!(values, [273.6f32]),
        other => panic!("expected Float32, got {other:?}"),
    }
}

#[test]
fn numeric_string_override_mismatches_are_rejected() {
    let template = SubsetTemplate::new(
        "NC000040",
        vec![Node::num("TEMP"), Node::chr("STID")],
    );
    let data = Instance::new()
        .values("TEMP", [273.6])
        .strings("STID", &["KTLX"]);

    let mut query_set = QuerySet::new();
    query_set.add("temperature", query("*/TEMP"));
    query_set.add("station", query("*/STID"));
    let mut runner = QueryRunner::new(query_set);
    let mut results = ResultSet::new();
    runner.accumulate(&template.provider(&data), &mut results).unwrap();

    assert!(matches!(
        results.get("temperature", None, Some(OverrideType::String)),
        Err(QueryError::IncompatibleOverride { .. })
    ));
    assert!(matches!(
        results.get("station", None, Some(OverrideType::Int)),
        Err(QueryError::IncompatibleOverride { .. })
    ));
}

#[test]
fn override_spellings_parse() {
    assert_eq!("int64".parse::<OverrideType>().unwrap(), OverrideType::Int64);
    assert!("uint8".parse::<OverrideType>().is_err());
}

#[test]
fn get_on_an_empty_result_set_fails() {
    let set = ResultSet::new();
    assert!(matches!(
        set.get("anything", None, None),
        Err(QueryError::EmptyResultSet)
    ));
    assert!(matches!(
        set.unit("anything"),
        Err(QueryError::EmptyResultSet)
    ));
}

#[test]
fn unknown_fields_fail() {
    let template = SubsetTemplate::new("NC000040", vec![Node::num("TEMP")]);
    let results = run_one(
        &template,
        &Instance::new().values("TEMP", [1.0]),
        "temperature",
        "*/TEMP",
    );
    assert!(matches!(
        results.get("dewpoint", None, None),
        Err(QueryError::FieldNotFound { .. })
    ));
    assert!(matches!(
        results.unit("dewpoint"),
        Err(QueryError::FieldNotFound { .. })
    ));
}
