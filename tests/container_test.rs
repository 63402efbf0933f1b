//! Container classification against real origin locations.

mod common;

use common::fixtures::{SHOP_ORIGIN, descriptor, registry, shop_registry};
use common::mock::MockOriginResolver;
use plantarch::adapters::origin::ArtifactOriginResolver;
use plantarch::domain::container::{ContainerRegistry, UNKNOWN_CONTAINER};
use plantarch::domain::model::{DeclaredKind, TypeUniverse};

fn classified() -> ContainerRegistry {
    let registry = shop_registry();
    let mut containers = ContainerRegistry::new(Box::new(ArtifactOriginResolver::new()));
    let mut names: Vec<&String> = registry.type_ids().collect();
    names.sort();
    for name in names {
        containers.classify(&registry, name);
    }
    containers
}

#[test]
fn test_types_are_bucketed_by_artifact() {
    let containers = classified();
    assert_eq!(containers.container_of("shop.Car").name, "shop");
    assert_eq!(containers.container_of("shop.Garage").name, "shop");
    assert_eq!(containers.container_of("lib.Clock").name, "clock-1.0.jar");
    assert_eq!(containers.container_of("java.util.List").name, "jrt");
}

#[test]
fn test_nested_and_unknown_types_land_in_unknown() {
    let containers = classified();
    assert!(containers.container_of("shop.Car$Builder").is_unknown());
    assert!(containers.container_of("never.Seen").is_unknown());
    assert!(containers.container_of("shop.Car$Builder").hidden);
}

#[test]
fn test_member_counts() {
    let containers = classified();
    let shop = containers.by_name("shop").unwrap();
    assert_eq!(shop.members.len(), 5);
    let unknown = containers.by_name(UNKNOWN_CONTAINER).unwrap();
    assert_eq!(unknown.members.len(), 1);
}

#[test]
fn test_flags_apply_to_existing_and_later_members() {
    let registry = shop_registry();
    let mut containers = ContainerRegistry::new(Box::new(ArtifactOriginResolver::new()));
    assert!(containers.is_visible(&registry, "shop.Car"));

    containers.set_hidden("shop", true);
    assert!(!containers.is_visible(&registry, "shop.Car"));
    assert!(!containers.is_visible(&registry, "shop.Seat"));

    containers.set_hidden("shop", false);
    assert!(containers.is_visible(&registry, "shop.Seat"));
}

#[test]
fn test_unknown_cannot_be_revealed() {
    let registry = shop_registry();
    let mut containers = ContainerRegistry::new(Box::new(ArtifactOriginResolver::new()));
    containers.set_hidden(UNKNOWN_CONTAINER, false);
    containers.set_expanded(UNKNOWN_CONTAINER, true);
    assert!(!containers.is_visible(&registry, "shop.Car$Builder"));
    assert!(!containers.container_of("shop.Car$Builder").expanded);
}

#[test]
fn test_first_classification_wins() {
    let origin = format!("{SHOP_ORIGIN}A.class");
    let registry = registry(TypeUniverse {
        project_root: None,
        types: vec![descriptor("shop.A", DeclaredKind::Class, &origin)],
    });
    let mut containers =
        ContainerRegistry::new(Box::new(MockOriginResolver::new().with(&origin, "alpha")));

    let first = containers.classify(&registry, "shop.A");
    let second = containers.classify(&registry, "shop.A");
    assert_eq!(first, second);
    assert_eq!(containers.get(first).name, "alpha");
}

#[test]
fn test_unresolved_origin_is_unknown() {
    let registry = registry(TypeUniverse {
        project_root: None,
        types: vec![descriptor("x.A", DeclaredKind::Class, "file:/somewhere/else/A.class")],
    });
    let mut containers = ContainerRegistry::new(Box::new(MockOriginResolver::new()));
    assert_eq!(containers.classify(&registry, "x.A"), ContainerRegistry::UNKNOWN);
}
