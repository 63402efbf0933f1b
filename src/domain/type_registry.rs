//! Type Registry - indexed view over the type universe
//!
//! Descriptors are ingested once; everything inference and rendering ask repeatedly (shape,
//! direct subtypes, reverse access edges, assignability) is derived here up front.

use crate::domain::model::{Access, DeclaredKind, Nesting, TypeDescriptor, TypeId, TypeUniverse};
use crate::domain::ports::NestingDetector;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Closed structural classification, computed once per type at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeShape {
    Class,
    /// Value/record-shaped class (data class, record, persistence entity)
    Data,
    Abstract,
    Interface,
    Enum,
}

impl TypeShape {
    pub fn of(descriptor: &TypeDescriptor) -> Self {
        match descriptor.kind {
            DeclaredKind::Interface | DeclaredKind::Annotation => TypeShape::Interface,
            DeclaredKind::Enum => TypeShape::Enum,
            DeclaredKind::Record => TypeShape::Data,
            DeclaredKind::Class if descriptor.is_abstract => TypeShape::Abstract,
            DeclaredKind::Class if is_data_shaped(descriptor) => TypeShape::Data,
            DeclaredKind::Class => TypeShape::Class,
        }
    }

    /// PlantUML declaration keyword
    pub fn keyword(self) -> &'static str {
        match self {
            TypeShape::Class | TypeShape::Data => "class",
            TypeShape::Abstract => "abstract",
            TypeShape::Interface => "interface",
            TypeShape::Enum => "enum",
        }
    }

    pub fn is_interface(self) -> bool {
        self == TypeShape::Interface
    }
}

const DATA_ANNOTATIONS: &[&str] = &[
    "javax.persistence.Entity",
    "javax.persistence.Embeddable",
    "jakarta.persistence.Entity",
    "jakarta.persistence.Embeddable",
];

fn is_data_shaped(descriptor: &TypeDescriptor) -> bool {
    descriptor.is_data
        || descriptor
            .annotations
            .iter()
            .any(|a| DATA_ANNOTATIONS.contains(&a.as_str()))
}

/// Well-known collection types; anything assignable to one of them is a collection too.
const COLLECTION_TYPES: &[&str] = &[
    "java.lang.Iterable",
    "java.util.Collection",
    "java.util.List",
    "java.util.Set",
    "java.util.SortedSet",
    "java.util.Queue",
    "java.util.Deque",
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.TreeSet",
    "kotlin.collections.Iterable",
    "kotlin.collections.Collection",
    "kotlin.collections.List",
    "kotlin.collections.Set",
    "kotlin.collections.MutableCollection",
    "kotlin.collections.MutableList",
    "kotlin.collections.MutableSet",
];

/// Type information stored in the registry
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub descriptor: TypeDescriptor,
    pub shape: TypeShape,
    pub nesting: Nesting,
}

impl TypeInfo {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

/// Type Registry - stores all type descriptors and the indexes derived from them
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeId, TypeInfo>,
    /// child -> parent, for superclasses and interfaces alike
    hierarchy: DiGraph<TypeId, ()>,
    hierarchy_nodes: HashMap<TypeId, NodeIndex>,
    direct_subclasses: HashMap<TypeId, BTreeSet<TypeId>>,
    direct_implementors: HashMap<TypeId, BTreeSet<TypeId>>,
    accesses_to: HashMap<TypeId, Vec<Access>>,
    dependents: HashMap<TypeId, BTreeSet<TypeId>>,
}

impl TypeRegistry {
    /// Create a new empty type registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a whole universe. Later descriptors with a duplicate name replace earlier ones.
    pub fn from_universe(universe: TypeUniverse, nesting: &dyn NestingDetector) -> Self {
        let mut registry = Self::new();
        for descriptor in universe.types {
            registry.register(descriptor, nesting);
        }
        registry.index_reverse_edges();
        registry
    }

    fn register(&mut self, descriptor: TypeDescriptor, nesting: &dyn NestingDetector) {
        let shape = TypeShape::of(&descriptor);
        let nesting = descriptor
            .nesting
            .unwrap_or_else(|| nesting.detect(&descriptor.name));

        let child = self.hierarchy_node(&descriptor.name);
        if let Some(parent) = &descriptor.superclass {
            let p = self.hierarchy_node(parent);
            self.hierarchy.add_edge(child, p, ());
            self.direct_subclasses
                .entry(parent.clone())
                .or_default()
                .insert(descriptor.name.clone());
        }
        for interface in &descriptor.interfaces {
            let p = self.hierarchy_node(interface);
            self.hierarchy.add_edge(child, p, ());
            self.direct_implementors
                .entry(interface.clone())
                .or_default()
                .insert(descriptor.name.clone());
        }

        self.types.insert(
            descriptor.name.clone(),
            TypeInfo {
                descriptor,
                shape,
                nesting,
            },
        );
    }

    fn hierarchy_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.hierarchy_nodes.get(name) {
            return idx;
        }
        let idx = self.hierarchy.add_node(name.to_string());
        self.hierarchy_nodes.insert(name.to_string(), idx);
        idx
    }

    /// Union of explicitly reported incoming accesses and the outgoing accesses of every other
    /// type, keyed by target.
    fn index_reverse_edges(&mut self) {
        let mut seen: HashSet<Access> = HashSet::new();
        let mut accesses_to: HashMap<TypeId, Vec<Access>> = HashMap::new();
        let mut dependents: HashMap<TypeId, BTreeSet<TypeId>> = HashMap::new();

        for info in self.types.values() {
            let d = &info.descriptor;
            let incoming = d.accesses_to_self.iter().filter(|a| a.target == d.name);
            for access in d.accesses_from_self.iter().chain(incoming) {
                if seen.insert(access.clone()) {
                    accesses_to
                        .entry(access.target.clone())
                        .or_default()
                        .push(access.clone());
                }
            }
            if !d.dependents.is_empty() {
                dependents
                    .entry(d.name.clone())
                    .or_default()
                    .extend(d.dependents.iter().cloned());
            }
        }
        for list in accesses_to.values_mut() {
            list.sort_by(|a, b| (&a.origin, &a.member).cmp(&(&b.origin, &b.member)));
        }

        self.accesses_to = accesses_to;
        self.dependents = dependents;
    }

    /// Get type information by name
    pub fn get(&self, type_id: &str) -> Option<&TypeInfo> {
        self.types.get(type_id)
    }

    /// Check if a type exists in the registry
    pub fn contains(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    pub fn shape(&self, type_id: &str) -> Option<TypeShape> {
        self.types.get(type_id).map(|t| t.shape)
    }

    /// Get all type names
    pub fn type_ids(&self) -> impl Iterator<Item = &TypeId> {
        self.types.keys()
    }

    /// Get count of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// True when a value of `source` can be used where `target` is expected
    /// (same type, or `target` is a direct or transitive supertype).
    pub fn is_assignable_from(&self, target: &str, source: &str) -> bool {
        if target == source {
            return true;
        }
        match (self.hierarchy_nodes.get(source), self.hierarchy_nodes.get(target)) {
            (Some(&s), Some(&t)) => has_path_connecting(&self.hierarchy, s, t, None),
            _ => false,
        }
    }

    pub fn is_collection(&self, type_id: &str) -> bool {
        COLLECTION_TYPES.contains(&type_id)
            || COLLECTION_TYPES
                .iter()
                .any(|c| self.is_assignable_from(c, type_id))
    }

    /// Classes whose declared superclass is exactly `type_id`
    pub fn direct_subclasses(&self, type_id: &str) -> impl Iterator<Item = &TypeId> {
        self.direct_subclasses.get(type_id).into_iter().flatten()
    }

    /// Types that list `type_id` among their own declared interfaces
    pub fn direct_implementors(&self, type_id: &str) -> impl Iterator<Item = &TypeId> {
        self.direct_implementors.get(type_id).into_iter().flatten()
    }

    pub fn accesses_from(&self, type_id: &str) -> &[Access] {
        self.types
            .get(type_id)
            .map(|t| t.descriptor.accesses_from_self.as_slice())
            .unwrap_or(&[])
    }

    pub fn accesses_to(&self, type_id: &str) -> &[Access] {
        self.accesses_to
            .get(type_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every type with an access or a dependency edge directed at `type_id`
    pub fn incoming_types(&self, type_id: &str) -> BTreeSet<&str> {
        let mut out: BTreeSet<&str> = self
            .accesses_to(type_id)
            .iter()
            .map(|a| a.origin.as_str())
            .collect();
        if let Some(deps) = self.dependents.get(type_id) {
            out.extend(deps.iter().map(String::as_str));
        }
        out
    }

    /// Types declared in `package` or one of its sub-packages, sorted
    pub fn types_in_package(&self, package: &str) -> Vec<&TypeId> {
        let prefix = format!("{package}.");
        let mut out: Vec<&TypeId> = self
            .types
            .keys()
            .filter(|name| {
                crate::domain::model::package_of(name) == package || name.starts_with(&prefix)
            })
            .collect();
        out.sort();
        out
    }
}
