//! Tests for the category registry: construction, traversal, ordering, lookup

use std::cmp::Ordering;

use rstest::{fixture, rstest};

use fortnum::domain::{AttrValue, Definition, DomainError, NodeId, Registry};

struct Colors {
    registry: Registry,
    color: NodeId,
    red: NodeId,
    green: NodeId,
    blue: NodeId,
}

#[fixture]
fn colors() -> Colors {
    let mut registry = Registry::new();
    let color = registry
        .define(Definition::new("Color").leaf("Red").leaf("Green").leaf("Blue"))
        .unwrap();
    let red = registry.deserialize(color, "Red").unwrap();
    let green = registry.deserialize(color, "Green").unwrap();
    let blue = registry.deserialize(color, "Blue").unwrap();
    Colors {
        registry,
        color,
        red,
        green,
        blue,
    }
}

fn names(registry: &Registry, ids: &[NodeId]) -> Vec<String> {
    ids.iter()
        .map(|id| registry.name(*id).unwrap().to_string())
        .collect()
}

// ============================================================
// Children
// ============================================================

#[rstest]
fn given_tree_when_listing_children_then_declaration_order_is_stable(colors: Colors) {
    let first: Vec<NodeId> = colors
        .registry
        .children(colors.color)
        .unwrap()
        .map(|c| c.id())
        .collect();
    let second: Vec<NodeId> = colors
        .registry
        .get(colors.color)
        .unwrap()
        .into_iter()
        .map(|c| c.id())
        .collect();

    assert_eq!(first, vec![colors.red, colors.green, colors.blue]);
    assert_eq!(first, second);
    assert_eq!(colors.registry.child_count(colors.color).unwrap(), 3);
}

#[rstest]
fn given_leaf_when_inspecting_then_handle_exists_with_zero_children(colors: Colors) {
    let red = colors.registry.get(colors.red).unwrap();
    assert_eq!(red.len(), 0);
    assert!(red.is_leaf());
    assert_eq!(red.children().count(), 0);
}

#[rstest]
fn given_tree_when_listing_choices_then_pairs_name_with_name(colors: Colors) {
    let choices = colors.registry.choices(colors.color).unwrap();
    assert_eq!(
        choices,
        vec![
            ("Red".to_string(), "Red".to_string()),
            ("Green".to_string(), "Green".to_string()),
            ("Blue".to_string(), "Blue".to_string()),
        ]
    );
}

// ============================================================
// Owners
// ============================================================

#[rstest]
#[case("Red", 0)]
#[case("Green", 1)]
#[case("Blue", 2)]
fn given_single_owner_when_inspecting_then_parent_and_rank_match(
    colors: Colors,
    #[case] name: &str,
    #[case] rank: usize,
) {
    let id = colors.registry.deserialize(colors.color, name).unwrap();

    assert_eq!(colors.registry.parent(id).unwrap(), Some(colors.color));
    assert_eq!(
        colors.registry.parent_index(id, colors.color).unwrap(),
        Some(rank)
    );
}

#[test]
fn given_node_with_two_owners_when_asking_for_parent_then_fails_with_multiple_owners() {
    let mut registry = Registry::new();
    let shared = registry.leaf("Shared").unwrap();
    let a = registry
        .define(Definition::new("A").leaf("First").child(shared))
        .unwrap();
    let b = registry.define(Definition::new("B").child(shared)).unwrap();

    let err = registry.parent(shared).unwrap_err();
    assert_eq!(
        err,
        DomainError::MultipleOwners {
            node: "Shared".into(),
            owners: vec!["A".into(), "B".into()],
        }
    );
    assert_eq!(registry.parents(shared).unwrap(), &[a, b]);
    assert_eq!(registry.parent_index(shared, a).unwrap(), Some(1));
    assert_eq!(registry.parent_index(shared, b).unwrap(), Some(0));
    // the first owner is still recorded on the node itself
    assert_eq!(registry.node(shared).unwrap().parent, Some(a));
    assert_eq!(registry.root(shared).unwrap(), a);
}

#[test]
fn given_leaf_under_shared_subtree_when_walking_up_then_follows_first_owner() {
    let mut registry = Registry::new();
    let shared = registry.define(Definition::new("Shared").leaf("Leaf")).unwrap();
    let a = registry.define(Definition::new("A").child(shared)).unwrap();
    let _b = registry.define(Definition::new("B").child(shared)).unwrap();
    let leaf = registry.deserialize(shared, "Leaf").unwrap();

    assert_eq!(registry.root(leaf).unwrap(), a);
    assert_eq!(
        names(&registry, &registry.ancestors(leaf, true, false).unwrap()),
        vec!["Shared", "A"]
    );
    assert_eq!(
        names(&registry, &registry.family(leaf).unwrap()),
        vec!["A", "Shared", "Leaf"]
    );
    assert_eq!(
        names(&registry, &registry.family(shared).unwrap()),
        vec!["A", "Shared", "Leaf"]
    );
}

// ============================================================
// Traversal
// ============================================================

#[test]
fn given_nested_tree_when_computing_family_then_equals_ancestors_self_descendants() {
    let mut registry = Registry::new();
    let root = registry
        .define(
            Definition::new("Vehicle")
                .nested(
                    Definition::new("Land")
                        .nested(Definition::new("Car").leaf("Sedan").leaf("Coupe"))
                        .leaf("Bike"),
                )
                .leaf("Sea"),
        )
        .unwrap();
    let land = registry.deserialize(root, "Land").unwrap();
    let car = registry.deserialize(land, "Car").unwrap();

    let family = registry.family(car).unwrap();
    let mut expected = registry.ancestors(car, false, false).unwrap();
    expected.push(car);
    expected.extend(registry.descendants(car, false).unwrap().map(|n| n.id()));

    assert_eq!(family, expected);
    assert_eq!(
        names(&registry, &family),
        vec!["Vehicle", "Land", "Car", "Sedan", "Coupe"]
    );
    assert_eq!(registry.root(car).unwrap(), root);
}

#[test]
fn given_handle_when_walking_then_matches_registry_walk() {
    let mut registry = Registry::new();
    let root = registry
        .define(Definition::new("A").nested(Definition::new("B").leaf("C")).leaf("D"))
        .unwrap();
    let b = registry.deserialize(root, "B").unwrap();
    let c = registry.get(registry.deserialize(b, "C").unwrap()).unwrap();

    let ancestors: Vec<_> = c.ancestors(true, false).unwrap().iter().map(|n| n.name()).collect();
    assert_eq!(ancestors, vec!["B", "A"]);
    assert_eq!(c.root().unwrap().name(), "A");

    let walk: Vec<_> = registry
        .get(root)
        .unwrap()
        .descendants(true)
        .map(|n| n.name())
        .collect();
    assert_eq!(walk, vec!["A", "B", "C", "D"]);
}

// ============================================================
// Ordering
// ============================================================

#[rstest]
fn given_siblings_when_comparing_then_follow_declaration_order(colors: Colors) {
    let r = &colors.registry;
    assert!(r.lt(colors.red, colors.blue).unwrap());
    assert!(r.gt(colors.blue, colors.red).unwrap());
    assert_eq!(r.compare(colors.green, colors.blue).unwrap(), Ordering::Less);

    let red = r.get(colors.red).unwrap();
    let blue = r.get(colors.blue).unwrap();
    assert!(red < blue);
    assert!(blue > red);
}

#[rstest]
fn given_unrelated_nodes_when_comparing_then_fails(colors: Colors) {
    let mut registry = colors.registry;
    let size = registry
        .define(Definition::new("Size").leaf("Small"))
        .unwrap();
    let small = registry.deserialize(size, "Small").unwrap();

    let err = registry.compare(colors.red, small).unwrap_err();
    assert!(matches!(err, DomainError::NoCommonOwner { .. }));
    assert!(registry.get(colors.red).unwrap().try_cmp(&registry.get(small).unwrap()).is_err());
}

#[test]
fn given_two_shared_owners_when_comparing_then_uses_first_owner_of_left() {
    let mut registry = Registry::new();
    let x = registry.leaf("X").unwrap();
    let y = registry.leaf("Y").unwrap();
    let first = registry
        .define(Definition::new("First").child(x).child(y))
        .unwrap();
    let _second = registry
        .define(Definition::new("Second").child(y).child(x))
        .unwrap();

    assert_eq!(registry.common_parent(x, y).unwrap(), first);
    assert!(registry.lt(x, y).unwrap());
}

// ============================================================
// Serialization
// ============================================================

#[rstest]
fn given_child_when_serializing_and_deserializing_then_recovers_node(colors: Colors) {
    for id in [colors.red, colors.green, colors.blue] {
        let name = colors.registry.serialize(id).unwrap();
        assert_eq!(colors.registry.deserialize(colors.color, &name).unwrap(), id);
    }
}

#[rstest]
fn given_unknown_name_when_deserializing_then_lists_choices(colors: Colors) {
    let err = colors
        .registry
        .deserialize(colors.color, "Purple")
        .unwrap_err();

    match err {
        DomainError::DoesNotExist { name, choices, .. } => {
            assert_eq!(name, "Purple");
            assert_eq!(choices, vec!["Red", "Green", "Blue"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================
// Item classes and related links
// ============================================================

#[test]
fn given_item_class_constraint_when_defining_then_only_matching_nodes_become_children() {
    let mut registry = Registry::new();
    let thing = registry.define_item("Thing", None).unwrap();
    let vehicle = registry.define_item("Vehicle", Some(thing)).unwrap();
    let other = registry.define_item("Other", None).unwrap();

    let root = registry
        .define(
            Definition::new("Things")
                .item_class(thing)
                .nested(Definition::new("Car").item(vehicle))
                .nested(Definition::new("Rock").item(other))
                .leaf("Plain"),
        )
        .unwrap();

    let children: Vec<_> = registry
        .children(root)
        .unwrap()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(children, vec!["Car"]);
}

#[test]
fn given_related_name_when_defining_then_owner_is_linked_onto_item() {
    let mut registry = Registry::new();
    let vehicle = registry.define_item("Vehicle", None).unwrap();

    let color = registry
        .define(
            Definition::new("Color")
                .related_name("colors")
                .nested(Definition::new("Red").item(vehicle))
                .leaf("Green"),
        )
        .unwrap();
    let size = registry
        .define(
            Definition::new("Size")
                .related_name("colors")
                .nested(Definition::new("Big").item(vehicle)),
        )
        .unwrap();

    let links = registry.related(vehicle, "colors").unwrap();
    assert_eq!(links.iter().collect::<Vec<_>>(), vec![color, size]);
}

#[test]
fn given_related_set_on_base_item_when_linking_subclass_then_base_set_collects() {
    let mut registry = Registry::new();
    let thing = registry.define_item("Thing", None).unwrap();
    let vehicle = registry.define_item("Vehicle", Some(thing)).unwrap();

    let size = registry
        .define(
            Definition::new("Size")
                .related_name("tags")
                .nested(Definition::new("Big").item(thing)),
        )
        .unwrap();
    let color = registry
        .define(
            Definition::new("Color")
                .related_name("tags")
                .nested(Definition::new("Red").item(vehicle)),
        )
        .unwrap();

    let base: Vec<_> = registry.related(thing, "tags").unwrap().iter().collect();
    assert_eq!(base, vec![size, color]);
    assert!(!registry.item(vehicle).unwrap().attributes.contains_key("tags"));
    let inherited: Vec<_> = registry.related(vehicle, "tags").unwrap().iter().collect();
    assert_eq!(inherited, vec![size, color]);
}

#[test]
fn given_plain_attribute_when_linking_then_fails_and_leaves_registry_untouched() {
    let mut registry = Registry::new();
    let vehicle = registry.define_item("Vehicle", None).unwrap();
    registry
        .set_item_attribute(vehicle, "colors", "taken")
        .unwrap();

    let result = registry.define(
        Definition::new("Color")
            .related_name("colors")
            .nested(Definition::new("Red").item(vehicle)),
    );

    assert_eq!(
        result.unwrap_err(),
        DomainError::UnableToLink {
            item: "Vehicle".into(),
            attribute: "colors".into(),
            existing: "taken".into(),
        }
    );
    assert!(registry.is_empty());
    assert_eq!(
        registry.item(vehicle).unwrap().attributes["colors"],
        AttrValue::Plain("taken".into())
    );
}
