//! Relation Inference Engine
//!
//! Derives hierarchy, structure and usage edges for a focus set. Every pass runs over all focus
//! types before the next pass starts (implements, extends, composition, typed usage, uses,
//! used-by), so merged actions accumulate in a stable order.

use crate::domain::container::ContainerRegistry;
use crate::domain::graph::RelationGraph;
use crate::domain::model::{FieldInfo, TypeId, TypeRef, is_primitive};
use crate::domain::relation::{Cardinality, Relation, RelationKind};
use crate::domain::type_registry::{TypeRegistry, TypeShape};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Which diagram the relations are inferred for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiagramKind {
    /// Dependency graph: hierarchy, aggregation/composition and usage
    #[default]
    Class,
    /// Entity-relationship graph: hierarchy and cardinality edges only
    Entity,
}

/// Toggles and colors for the three typed usage scans
#[derive(Debug, Clone, Default)]
pub struct InferenceOptions {
    pub mode: DiagramKind,
    pub member_hidden: bool,
    pub parameter_hidden: bool,
    pub return_hidden: bool,
    pub member_color: Option<String>,
    pub parameter_color: Option<String>,
    pub return_color: Option<String>,
}

pub struct RelationInference<'a> {
    universe: &'a TypeRegistry,
    options: &'a InferenceOptions,
}

impl<'a> RelationInference<'a> {
    pub fn new(universe: &'a TypeRegistry, options: &'a InferenceOptions) -> Self {
        Self { universe, options }
    }

    pub fn infer(&self, focus: &BTreeSet<TypeId>, containers: &mut ContainerRegistry) -> RelationGraph {
        let mut graph = RelationGraph::new();
        self.infer_into(focus, containers, &mut graph);
        graph
    }

    /// Add inferred relations to an existing graph (which may already hold actor interactions).
    pub fn infer_into(
        &self,
        focus: &BTreeSet<TypeId>,
        containers: &mut ContainerRegistry,
        graph: &mut RelationGraph,
    ) {
        let mut run = Run {
            universe: self.universe,
            containers,
            graph,
        };

        let sources: Vec<&str> = focus
            .iter()
            .map(String::as_str)
            .filter(|s| run.is_visible(s))
            .collect();
        debug!(focus = focus.len(), visible = sources.len(), mode = ?self.options.mode, "Inferring relations");

        for s in &sources {
            self.add_implements(&mut run, s);
        }
        for s in &sources {
            self.add_extends(&mut run, s);
        }
        for s in &sources {
            match self.options.mode {
                DiagramKind::Class => self.add_aggregation(&mut run, s),
                DiagramKind::Entity => self.add_cardinality(&mut run, s),
            }
        }
        if self.options.mode == DiagramKind::Entity {
            return;
        }
        for s in &sources {
            self.add_typed_usage(&mut run, s);
        }
        for s in &sources {
            self.add_uses(&mut run, s);
        }
        for s in &sources {
            self.add_used_by(&mut run, s, focus);
        }
    }

    fn add_implements(&self, run: &mut Run<'_>, s: &str) {
        let Some(info) = self.universe.get(s) else {
            return;
        };
        for interface in &info.descriptor.interfaces {
            run.emit(Relation::new(s, interface.as_str(), RelationKind::Implements));
        }
        if info.shape == TypeShape::Interface {
            for implementor in self.universe.direct_implementors(s) {
                run.emit(Relation::new(s, implementor.as_str(), RelationKind::ImplementedBy));
            }
        }
    }

    fn add_extends(&self, run: &mut Run<'_>, s: &str) {
        let Some(info) = self.universe.get(s) else {
            return;
        };
        if let Some(parent) = &info.descriptor.superclass {
            run.emit(Relation::new(s, parent.as_str(), RelationKind::Extends));
        }
        for child in self.universe.direct_subclasses(s) {
            run.emit(Relation::new(s, child.as_str(), RelationKind::ExtendedBy));
        }
    }

    /// Class mode: data-shaped types aggregate collection elements and compose scalar fields.
    fn add_aggregation(&self, run: &mut Run<'_>, s: &str) {
        for (field, target, many) in self.structural_targets(s) {
            let kind = if many {
                RelationKind::Aggregates
            } else {
                RelationKind::Composes
            };
            debug!(source = s, field = %field.name, target, "Structural edge");
            run.emit(Relation::new(s, target, kind));
        }
    }

    /// Entity mode: every field of a data-shaped type becomes a cardinality edge.
    fn add_cardinality(&self, run: &mut Run<'_>, s: &str) {
        for (field, target, many) in self.structural_targets(s) {
            let cardinality = match (many, field.nullable) {
                (true, false) => Cardinality::ONE_TO_MANY,
                (true, true) => Cardinality::ZERO_OR_ONE_TO_MANY,
                (false, false) => Cardinality::ONE_TO_UNKNOWN,
                (false, true) => Cardinality::ZERO_OR_ONE_TO_UNKNOWN,
            };
            run.emit(Relation::new(s, target, RelationKind::Cardinality(cardinality)));
        }
    }

    /// Field targets of a data-shaped type, fields sorted by name: `(field, target, is_many)`.
    fn structural_targets(&self, s: &str) -> Vec<(&'a FieldInfo, &'a str, bool)> {
        let Some(info) = self.universe.get(s) else {
            return Vec::new();
        };
        if info.shape != TypeShape::Data {
            return Vec::new();
        }

        let mut fields: Vec<&FieldInfo> = info.descriptor.fields.iter().collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));

        let mut out = Vec::new();
        for field in fields {
            let type_ref = &field.type_ref;
            if type_ref.is_array() || self.universe.is_collection(type_ref.element_name()) {
                for element in self.element_types(type_ref, s, &field.name) {
                    out.push((field, element, true));
                }
            } else if !is_primitive(type_ref.element_name()) {
                out.push((field, type_ref.element_name(), false));
            }
        }
        out
    }

    /// Distinct resolvable element types of a collection or array field.
    fn element_types(&self, type_ref: &'a TypeRef, owner: &str, field: &str) -> Vec<&'a str> {
        let candidates: Vec<&'a str> = if type_ref.is_array() {
            vec![type_ref.element_name()]
        } else {
            type_ref.arguments.iter().map(TypeRef::element_name).collect()
        };

        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for candidate in candidates {
            if !self.universe.contains(candidate) {
                debug!(owner, field, element = candidate, "Skipping unresolvable element type");
                continue;
            }
            if seen.insert(candidate) {
                out.push(candidate);
            }
        }
        out
    }

    fn add_typed_usage(&self, run: &mut Run<'_>, s: &str) {
        let Some(info) = self.universe.get(s) else {
            return;
        };
        let d = &info.descriptor;
        let o = self.options;

        if !o.member_hidden {
            let refs = d.fields.iter().map(|f| &f.type_ref);
            self.emit_typed(run, s, refs, RelationKind::UsesAsMember, &o.member_color);
        }
        if !o.parameter_hidden {
            let refs = d.methods.iter().flat_map(|m| m.parameters.iter());
            self.emit_typed(run, s, refs, RelationKind::UsesAsParameter, &o.parameter_color);
        }
        if !o.return_hidden {
            let refs = d.methods.iter().filter_map(|m| m.return_type.as_ref());
            self.emit_typed(run, s, refs, RelationKind::UsesAsReturn, &o.return_color);
        }
    }

    fn emit_typed<'r>(
        &self,
        run: &mut Run<'_>,
        s: &str,
        refs: impl Iterator<Item = &'r TypeRef>,
        kind: RelationKind,
        color: &Option<String>,
    ) {
        let targets: BTreeSet<&str> = refs
            .flat_map(TypeRef::raw_types)
            .filter(|t| !is_primitive(t))
            .filter(|t| *t != s)
            .filter(|t| !self.universe.is_assignable_from(t, s))
            .collect();
        for t in targets {
            run.emit(Relation::new(s, t, kind).with_color(color.clone()));
        }
    }

    fn add_uses(&self, run: &mut Run<'_>, s: &str) {
        let mut by_target: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for access in self.universe.accesses_from(s) {
            by_target
                .entry(access.target.as_str())
                .or_default()
                .insert(access.member.as_str());
        }

        for (target, members) in by_target {
            if target == s || self.universe.is_assignable_from(target, s) {
                continue;
            }
            let action = members.into_iter().collect::<Vec<_>>().join("\n");
            run.emit(Relation::new(s, target, RelationKind::Uses).with_action(Some(action)));
        }
    }

    /// Types pointing at `s` get one uses-edge each. Focus types are skipped: their own uses
    /// scan already produced the edge. Non-focus types only get this single filtered edge.
    fn add_used_by(&self, run: &mut Run<'_>, s: &str, focus: &BTreeSet<TypeId>) {
        for t in self.universe.incoming_types(s) {
            if t == s || self.universe.is_assignable_from(s, t) || focus.contains(t) {
                continue;
            }
            let members: BTreeSet<&str> = self
                .universe
                .accesses_to(s)
                .iter()
                .filter(|a| a.origin == t)
                .map(|a| a.member.as_str())
                .collect();
            let action = members.into_iter().collect::<Vec<_>>().join("\n");
            run.emit(Relation::new(s, t, RelationKind::UsedBy).with_action(Some(action)));
        }
    }
}

/// Mutable state of one inference run
struct Run<'r> {
    universe: &'r TypeRegistry,
    containers: &'r mut ContainerRegistry,
    graph: &'r mut RelationGraph,
}

impl Run<'_> {
    fn is_visible(&mut self, type_id: &str) -> bool {
        self.containers.is_visible(self.universe, type_id)
    }

    /// Insert when both endpoints are visible. Both are classified either way.
    fn emit(&mut self, relation: Relation) {
        let source_visible = match relation.source_type() {
            Some(source) => self.is_visible(source),
            None => true,
        };
        let target_visible = self.is_visible(&relation.target);
        if source_visible && target_visible {
            self.graph.insert(relation);
        }
    }
}
