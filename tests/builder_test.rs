//! Tests for HierarchyBuilder

use rstest::rstest;
use serde_json::json;

use springtree::domain::{
    records_from_values, FieldNames, Hierarchy, HierarchyBuilder, NodeKey, Record, StructureError,
};
use springtree::util::testing::init_test_setup;

fn build(records: &[Record]) -> Result<Option<Hierarchy>, StructureError> {
    init_test_setup();
    HierarchyBuilder::default().build(records)
}

fn child_keys(h: &Hierarchy, key: &NodeKey) -> Vec<NodeKey> {
    let node = h.get(key).expect("node exists");
    node.children
        .iter()
        .filter_map(|&c| h.node(c))
        .map(|c| c.key.clone())
        .collect()
}

/// (key, parent key, children keys, depth, height) for every node in pre-order
fn shape(h: &Hierarchy) -> Vec<(NodeKey, Option<NodeKey>, Vec<NodeKey>, usize, usize)> {
    h.iter()
        .map(|(_, node)| {
            (
                node.key.clone(),
                node.parent.and_then(|p| h.node(p)).map(|p| p.key.clone()),
                child_keys(h, &node.key),
                node.depth,
                node.height,
            )
        })
        .collect()
}

#[test]
fn given_flat_list_when_building_then_children_of_root() {
    // Arrange
    let records = vec![Record::new("a", None, "A"), Record::new("b", None, "B")];

    // Act
    let h = build(&records).unwrap().expect("hierarchy");

    // Assert
    assert_eq!(h.root_node().label.as_deref(), Some("ROOT"));
    assert_eq!(
        child_keys(&h, &NodeKey::Root),
        vec![NodeKey::from("a"), NodeKey::from("b")]
    );
    for id in ["a", "b"] {
        let node = h.get(&NodeKey::from(id)).unwrap();
        assert_eq!(node.depth, 1);
        assert_eq!(node.height, 0);
    }
}

#[test]
fn given_chain_when_building_then_single_path_of_depth_three() {
    let records = vec![
        Record::new("a", None, "A"),
        Record::new("b", Some("a"), "B"),
        Record::new("c", Some("b"), "C"),
    ];

    let h = build(&records).unwrap().expect("hierarchy");

    assert_eq!(h.depth(), 3);
    assert_eq!(h.leaves().len(), 1);
    let c = h.find(&NodeKey::from("c")).unwrap();
    let path: Vec<_> = h
        .ancestors(c)
        .into_iter()
        .filter_map(|i| h.node(i))
        .map(|n| n.to_string())
        .collect();
    assert_eq!(path, vec!["C", "B", "A", "ROOT"]);
}

#[rstest]
#[case::orphan(
    vec![Record::new("x", Some("missing"), "X")],
    StructureError::MissingParent { id: "x".into(), parent_id: "missing".into() }
)]
#[case::duplicate(
    vec![Record::new("a", None, "A"), Record::new("a", None, "A again")],
    StructureError::DuplicateId("a".into())
)]
#[case::self_reference(
    vec![Record::new("a", Some("a"), "A")],
    StructureError::SelfReference("a".into())
)]
fn given_inconsistent_records_when_building_then_structure_error(
    #[case] records: Vec<Record>,
    #[case] expected: StructureError,
) {
    assert_eq!(build(&records).unwrap_err(), expected);
}

#[test]
fn given_loop_detached_from_root_when_building_then_cycle_error() {
    let records = vec![
        Record::new("a", None, "A"),
        Record::new("x", Some("y"), "X"),
        Record::new("y", Some("x"), "Y"),
    ];

    let err = build(&records).unwrap_err();

    assert!(matches!(err, StructureError::Cycle(ref id) if id == "x"));
}

#[test]
fn given_empty_records_when_building_then_no_hierarchy() {
    assert!(build(&[]).unwrap().is_none());
}

#[test]
fn given_record_named_null_when_building_then_not_confused_with_root() {
    let records = vec![
        Record::new("null", None, "literal null"),
        Record::new("a", Some("null"), "A"),
    ];

    let h = build(&records).unwrap().expect("hierarchy");

    assert_eq!(child_keys(&h, &NodeKey::Root), vec![NodeKey::from("null")]);
    assert_eq!(child_keys(&h, &NodeKey::from("null")), vec![NodeKey::from("a")]);
}

#[test]
fn given_same_input_twice_when_building_then_isomorphic() {
    let records = vec![
        Record::new("a", None, "A"),
        Record::new("b", Some("a"), "B"),
        Record::new("c", None, "C"),
        Record::new("d", Some("b"), "D"),
        Record::new("e", Some("a"), "E"),
    ];

    let first = build(&records).unwrap().unwrap();
    let second = build(&records.clone()).unwrap().unwrap();

    assert_eq!(shape(&first), shape(&second));
}

#[test]
fn given_mixed_heights_when_building_then_children_ordered_by_height() {
    let records = vec![
        Record::new("deep", None, "Deep"),
        Record::new("deep-child", Some("deep"), "Deep child"),
        Record::new("leaf1", None, "Leaf 1"),
        Record::new("leaf2", None, "Leaf 2"),
    ];

    let h = build(&records).unwrap().unwrap();

    assert_eq!(
        child_keys(&h, &NodeKey::Root),
        vec![
            NodeKey::from("leaf1"),
            NodeKey::from("leaf2"),
            NodeKey::from("deep")
        ]
    );
}

#[test]
fn given_records_when_building_then_every_parent_relation_round_trips() {
    let records = vec![
        Record::new("a", None, "A"),
        Record::new("b", Some("a"), "B"),
        Record::new("c", Some("a"), "C"),
        Record::new("d", None, "D"),
        Record::new("e", Some("c"), "E"),
    ];

    let h = build(&records).unwrap().unwrap();

    assert_eq!(h.len(), records.len() + 1);
    for record in &records {
        let node = h.get(&NodeKey::from(record.id.as_str())).unwrap();
        let parent = h.node(node.parent.unwrap()).unwrap();
        let expected = record
            .parent_id
            .as_deref()
            .map_or(NodeKey::Root, NodeKey::from);
        assert_eq!(parent.key, expected);
    }
}

#[test]
fn given_json_objects_with_custom_fields_when_building_then_uses_them() {
    let values = vec![
        json!({"key": 1, "up": null, "title": "One"}),
        json!({"key": 2, "up": 1, "title": "Two"}),
        json!({"key": 3, "up": "", "title": null}),
    ];
    let fields = FieldNames {
        id: "key".into(),
        parent_id: "up".into(),
        label: "title".into(),
    };

    let records = records_from_values(&values, &fields).unwrap();
    let h = build(&records).unwrap().unwrap();

    assert_eq!(
        child_keys(&h, &NodeKey::Root),
        vec![NodeKey::from("3"), NodeKey::from("1")]
    );
    assert_eq!(child_keys(&h, &NodeKey::from("1")), vec![NodeKey::from("2")]);
    assert_eq!(h.get(&NodeKey::from("3")).unwrap().label, None);
}

#[test]
fn given_float_and_integer_spellings_of_an_id_when_building_then_linked() {
    let values = vec![
        json!({"id": 1.0, "name": "One"}),
        json!({"id": "b", "parentId": 1, "name": "B"}),
        json!({"id": 2, "parentId": 1.0, "name": "Two"}),
    ];

    let records = records_from_values(&values, &FieldNames::default()).unwrap();
    let h = build(&records).unwrap().unwrap();

    assert_eq!(child_keys(&h, &NodeKey::Root), vec![NodeKey::from("1")]);
    assert_eq!(
        child_keys(&h, &NodeKey::from("1")),
        vec![NodeKey::from("b"), NodeKey::from("2")]
    );
}
