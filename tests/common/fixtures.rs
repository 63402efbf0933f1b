//! Test fixture generators for integration tests.
#![allow(dead_code)]

use plantarch::adapters::nesting::JvmNestingDetector;
use plantarch::domain::model::{
    Access, DeclaredKind, FieldInfo, MethodInfo, MethodModifiers, TypeDescriptor, TypeRef,
    TypeUniverse,
};
use plantarch::domain::type_registry::TypeRegistry;

pub const SHOP_ORIGIN: &str = "file:/repo/shop/target/classes/shop/";
pub const CLOCK_ORIGIN: &str = "jar:file:/home/dev/.m2/clock-1.0.jar!/lib/Clock.class";
pub const JRT_ORIGIN: &str = "jrt:/java.base/java/util/List.class";

pub fn descriptor(name: &str, kind: DeclaredKind, origin: &str) -> TypeDescriptor {
    let mut d = TypeDescriptor::new(name, kind);
    d.origin = Some(origin.to_string());
    d
}

pub fn field(name: &str, type_ref: TypeRef) -> FieldInfo {
    FieldInfo {
        name: name.to_string(),
        type_ref,
        nullable: false,
    }
}

pub fn nullable_field(name: &str, type_ref: TypeRef) -> FieldInfo {
    FieldInfo {
        nullable: true,
        ..field(name, type_ref)
    }
}

pub fn method(name: &str, parameters: Vec<TypeRef>, return_type: Option<TypeRef>) -> MethodInfo {
    MethodInfo {
        name: name.to_string(),
        parameters,
        return_type,
        modifiers: MethodModifiers::default(),
    }
}

pub fn list_of(element: &str) -> TypeRef {
    TypeRef::generic("java.util.List", vec![TypeRef::of(element)])
}

/// A small car shop: data classes with a bidirectional one-to-many, a service using them and a
/// library type from a jar.
///
/// - `shop.Car` (data, implements `shop.Vehicle`): `seats: List<Seat>`, `engine: Engine`
/// - `shop.Seat` (data): `car: Car`
/// - `shop.Garage`: field `clock: lib.Clock`, `park(Car)`, accesses `Car.drive`, `Clock.now`,
///   `Clock.zone`
/// - `shop.Car$Builder`: member type, lands in "unknown"
pub fn shop_universe() -> TypeUniverse {
    let shop = |simple: &str| format!("{SHOP_ORIGIN}{simple}.class");

    let vehicle = descriptor("shop.Vehicle", DeclaredKind::Interface, &shop("Vehicle"));

    let mut car = descriptor("shop.Car", DeclaredKind::Class, &shop("Car"));
    car.is_data = true;
    car.interfaces = vec!["shop.Vehicle".into()];
    car.fields = vec![
        field("seats", list_of("shop.Seat")),
        field("engine", TypeRef::of("shop.Engine")),
    ];
    car.methods = vec![method("drive", vec![], None)];

    let mut seat = descriptor("shop.Seat", DeclaredKind::Class, &shop("Seat"));
    seat.is_data = true;
    seat.fields = vec![field("car", TypeRef::of("shop.Car"))];

    let mut engine = descriptor("shop.Engine", DeclaredKind::Class, &shop("Engine"));
    engine.methods = vec![method("start", vec![], None)];

    let mut garage = descriptor("shop.Garage", DeclaredKind::Class, &shop("Garage"));
    garage.fields = vec![field("clock", TypeRef::of("lib.Clock"))];
    garage.methods = vec![method("park", vec![TypeRef::of("shop.Car")], None)];
    garage.accesses_from_self = vec![
        Access::new("shop.Garage", "shop.Car", "drive"),
        Access::new("shop.Garage", "lib.Clock", "now"),
        Access::new("shop.Garage", "lib.Clock", "zone"),
    ];

    let builder = descriptor("shop.Car$Builder", DeclaredKind::Class, &shop("Car$Builder"));

    let mut clock = descriptor("lib.Clock", DeclaredKind::Class, CLOCK_ORIGIN);
    clock.methods = vec![method("now", vec![], Some(TypeRef::of("long")))];

    let list = descriptor("java.util.List", DeclaredKind::Interface, JRT_ORIGIN);

    TypeUniverse {
        project_root: None,
        types: vec![vehicle, car, seat, engine, garage, builder, clock, list],
    }
}

pub fn registry(universe: TypeUniverse) -> TypeRegistry {
    TypeRegistry::from_universe(universe, &JvmNestingDetector)
}

pub fn shop_registry() -> TypeRegistry {
    registry(shop_universe())
}

/// Serialize a universe the way an extractor would write it.
pub fn universe_json(universe: &TypeUniverse) -> String {
    serde_json::to_string_pretty(universe).unwrap()
}
