//! Type universe: the structural facts a collaborator extracts from compiled artifacts.
//!
//! This is the contract between an extractor (bytecode reader, classpath scanner, ...) and the
//! relation engine. Everything here is plain data; derived facts (shape, subtypes, reverse access
//! edges) are computed once by [`TypeRegistry`](crate::domain::type_registry::TypeRegistry).

use serde::{Deserialize, Serialize};

/// Fully-qualified type name, e.g. `com.acme.billing.Invoice`.
pub type TypeId = String;

/// All types known for one analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeUniverse {
    /// Root of the analysed project, if the extractor knows it.
    #[serde(default)]
    pub project_root: Option<String>,
    pub types: Vec<TypeDescriptor>,
}

/// Structural description of one type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    pub name: TypeId,
    pub kind: DeclaredKind,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Value/record-shaped type (Kotlin `data class`, Java record, Lombok `@Value`, ...).
    #[serde(default, rename = "data")]
    pub is_data: bool,
    #[serde(default)]
    pub annotations: Vec<String>,
    /// `None` lets the registry infer nesting from the binary name.
    #[serde(default)]
    pub nesting: Option<Nesting>,
    /// Location the backing artifact was loaded from (`jrt:/...`, `jar:file:/...!/...`,
    /// `file:/.../target/classes/...`).
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub superclass: Option<TypeId>,
    #[serde(default)]
    pub interfaces: Vec<TypeId>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub methods: Vec<MethodInfo>,
    #[serde(default)]
    pub enum_constants: Vec<String>,
    /// Member accesses performed by code of this type.
    #[serde(default)]
    pub accesses_from_self: Vec<Access>,
    /// Member accesses other types perform on this type.
    #[serde(default)]
    pub accesses_to_self: Vec<Access>,
    /// Types holding call, reference or other dependency edges to this type.
    #[serde(default)]
    pub dependents: Vec<TypeId>,
}

impl TypeDescriptor {
    /// Minimal descriptor; the remaining facts default to empty.
    pub fn new(name: impl Into<TypeId>, kind: DeclaredKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_abstract: false,
            is_data: false,
            annotations: Vec::new(),
            nesting: None,
            origin: None,
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            enum_constants: Vec::new(),
            accesses_from_self: Vec::new(),
            accesses_to_self: Vec::new(),
            dependents: Vec::new(),
        }
    }
}

/// Kind as declared in source. The closed classification used by inference and rendering is
/// [`TypeShape`](crate::domain::type_registry::TypeShape).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

/// Where a type is declared relative to other types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nesting {
    TopLevel,
    Member,
    Local,
    Anonymous,
    Synthetic,
}

/// Reference to a (possibly generic, possibly array) type as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Raw type name; arrays carry a `[]` suffix per dimension.
    pub name: TypeId,
    #[serde(default)]
    pub arguments: Vec<TypeRef>,
}

impl TypeRef {
    pub fn of(name: impl Into<TypeId>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<TypeId>, arguments: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Raw name with array dimensions stripped.
    pub fn element_name(&self) -> &str {
        self.name.trim_end_matches("[]")
    }

    pub fn is_array(&self) -> bool {
        self.name.ends_with("[]")
    }

    /// Every raw type this reference mentions: itself (array dimensions stripped) followed by its
    /// generic arguments, depth first.
    pub fn raw_types(&self) -> Vec<&str> {
        let mut out = vec![self.element_name()];
        for arg in &self.arguments {
            out.extend(arg.raw_types());
        }
        out
    }

    /// Short display form: simple names, generic arguments kept (`List<Seat>`).
    pub fn display(&self) -> String {
        let base = simple_name(&self.name);
        if self.arguments.is_empty() {
            base.to_string()
        } else {
            let args: Vec<String> = self.arguments.iter().map(TypeRef::display).collect();
            format!("{}<{}>", base, args.join(", "))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub nullable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodModifiers {
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "native")]
    pub is_native: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default, rename = "private")]
    pub is_private: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<TypeRef>,
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    #[serde(default)]
    pub modifiers: MethodModifiers,
}

impl MethodInfo {
    /// JVM-style descriptor used to tell overloads apart: `name(A,B)R`.
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
        let ret = self
            .return_type
            .as_ref()
            .map(|r| r.name.as_str())
            .unwrap_or("void");
        format!("{}({}){}", self.name, params.join(","), ret)
    }
}

/// One member access edge: code in `origin` touches `member` declared on `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Access {
    pub origin: TypeId,
    pub target: TypeId,
    pub member: String,
}

impl Access {
    pub fn new(origin: impl Into<TypeId>, target: impl Into<TypeId>, member: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            target: target.into(),
            member: member.into(),
        }
    }
}

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// Last dotted segment of a qualified name.
pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Package part of a qualified name (empty for the default package).
pub fn package_of(name: &str) -> &str {
    name.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_types_walks_generic_arguments_and_strips_arrays() {
        let r = TypeRef::generic(
            "java.util.Map",
            vec![
                TypeRef::of("java.lang.String"),
                TypeRef::generic("java.util.List", vec![TypeRef::of("com.acme.Seat[]")]),
            ],
        );
        assert_eq!(
            r.raw_types(),
            vec!["java.util.Map", "java.lang.String", "java.util.List", "com.acme.Seat"]
        );
    }

    #[test]
    fn display_uses_simple_names() {
        let r = TypeRef::generic("java.util.List", vec![TypeRef::of("com.acme.Seat")]);
        assert_eq!(r.display(), "List<Seat>");
        assert_eq!(TypeRef::of("int").display(), "int");
    }

    #[test]
    fn descriptor_parses_camel_case_json() {
        let json = r#"{
            "name": "com.acme.Car",
            "kind": "class",
            "data": true,
            "origin": "file:/repo/app/target/classes/com/acme/Car.class",
            "fields": [{"name": "seats", "type": {"name": "java.util.List", "arguments": [{"name": "com.acme.Seat"}]}}],
            "accessesFromSelf": [{"origin": "com.acme.Car", "target": "com.acme.Engine", "member": "start"}]
        }"#;
        let d: TypeDescriptor = serde_json::from_str(json).unwrap();
        assert!(d.is_data);
        assert_eq!(d.fields[0].type_ref.arguments[0].name, "com.acme.Seat");
        assert!(!d.fields[0].nullable);
        assert_eq!(d.accesses_from_self[0].member, "start");
        assert!(d.nesting.is_none());
    }

    #[test]
    fn method_signature_distinguishes_overloads() {
        let a = MethodInfo {
            name: "add".into(),
            parameters: vec![TypeRef::of("int")],
            return_type: None,
            modifiers: MethodModifiers::default(),
        };
        let b = MethodInfo {
            name: "add".into(),
            parameters: vec![TypeRef::of("long")],
            return_type: Some(TypeRef::of("boolean")),
            modifiers: MethodModifiers::default(),
        };
        assert_eq!(a.signature(), "add(int)void");
        assert_ne!(a.signature(), b.signature());
    }

    #[test]
    fn names_split_on_last_dot() {
        assert_eq!(simple_name("com.acme.Car"), "Car");
        assert_eq!(package_of("com.acme.Car"), "com.acme");
        assert_eq!(package_of("Car"), "");
    }
}
