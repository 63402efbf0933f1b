//! Diagram Renderer - PlantUML text for a coarsened relation graph
//!
//! Output is fully determined by the registry state and the relation set: every section is
//! sorted, relation lines are de-duplicated.

use crate::domain::container::{Container, ContainerRegistry};
use crate::domain::graph::RelationGraph;
use crate::domain::model::TypeId;
use crate::domain::relation::{Endpoint, Relation, RelationKind};
use crate::domain::type_registry::{TypeInfo, TypeRegistry, TypeShape};
use std::collections::{BTreeMap, BTreeSet};

/// How accumulated member names (relation actions) are shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MemberDisplay {
    #[default]
    None,
    /// As a member compartment on the type that owns the members
    Definition,
    /// As arrow labels
    Arrow,
}

const EXTERNAL_MARKER: &str = " #ccc";
const DATA_MARKER: &str = " <<data>> #afa";
const ENUM_MARKER: &str = " #afa";

pub struct DiagramRenderer<'a> {
    universe: &'a TypeRegistry,
    containers: &'a ContainerRegistry,
    focus: &'a BTreeSet<TypeId>,
    display: MemberDisplay,
}

impl<'a> DiagramRenderer<'a> {
    pub fn new(
        universe: &'a TypeRegistry,
        containers: &'a ContainerRegistry,
        focus: &'a BTreeSet<TypeId>,
    ) -> Self {
        Self {
            universe,
            containers,
            focus,
            display: MemberDisplay::None,
        }
    }

    pub fn with_display(mut self, display: MemberDisplay) -> Self {
        self.display = display;
        self
    }

    /// Class diagram: actors, declarations, container summaries, relations.
    pub fn render_class(&self, relations: &RelationGraph, title: &str, caption: &str) -> String {
        let mut lines = vec!["@startuml".to_string()];
        lines.extend(self.actor_lines(relations));

        let annotations = match self.display {
            MemberDisplay::Definition => member_annotations(relations),
            _ => BTreeMap::new(),
        };
        let declared = self.declared_types();
        let groups: [&[TypeShape]; 3] = [
            &[TypeShape::Class, TypeShape::Data],
            &[TypeShape::Interface, TypeShape::Abstract],
            &[TypeShape::Enum],
        ];
        for group in groups {
            for info in declared.iter().filter(|t| group.contains(&t.shape)) {
                let members = annotations.get(info.name()).map(|m| m.iter().map(String::as_str));
                lines.push(self.class_declaration(info, members));
            }
        }

        let mut blocks: Vec<String> = self
            .containers
            .containers()
            .filter(|c| !c.hidden && !c.expanded && !c.members.is_empty())
            .map(container_block)
            .collect();
        blocks.sort();
        lines.extend(blocks);

        lines.extend(self.relation_lines(relations));
        push_footer(&mut lines, title, caption);
        lines.join("\n")
    }

    /// Entity-relationship diagram: declarations with fields, combiner diagnostics, relations.
    pub fn render_entity(
        &self,
        relations: &RelationGraph,
        title: &str,
        caption: &str,
        diagnostics: &[String],
    ) -> String {
        let mut lines = vec!["@startuml".to_string()];
        lines.extend(self.actor_lines(relations));
        for info in self.declared_types() {
            lines.push(self.entity_declaration(info));
        }
        lines.extend(diagnostics.iter().map(|d| format!("' {d}")));
        lines.extend(self.relation_lines(relations));
        push_footer(&mut lines, title, caption);
        lines.join("\n")
    }

    /// Types of visible, expanded containers, sorted by name
    fn declared_types(&self) -> Vec<&'a TypeInfo> {
        let mut out: Vec<&TypeInfo> = self
            .containers
            .containers()
            .filter(|c| !c.hidden && c.expanded)
            .flat_map(|c| c.members.iter())
            .filter_map(|name| self.universe.get(name))
            .collect();
        out.sort_by(|a, b| a.name().cmp(b.name()));
        out
    }

    fn marker(&self, info: &TypeInfo) -> &'static str {
        if !self.focus.contains(info.name()) {
            return EXTERNAL_MARKER;
        }
        match info.shape {
            TypeShape::Data => DATA_MARKER,
            TypeShape::Enum => ENUM_MARKER,
            _ => "",
        }
    }

    fn class_declaration<'m>(
        &self,
        info: &TypeInfo,
        members: Option<impl Iterator<Item = &'m str>>,
    ) -> String {
        let mut line = format!("{} {}{}", info.shape.keyword(), info.name(), self.marker(info));
        if let Some(members) = members {
            line.push_str(" {\n--");
            for m in members {
                line.push_str("\n    ");
                line.push_str(m);
            }
            line.push_str("\n}");
        }
        line
    }

    fn entity_declaration(&self, info: &TypeInfo) -> String {
        let d = &info.descriptor;
        let head = format!("{} {}", info.shape.keyword(), d.name);
        if !self.focus.contains(&d.name) {
            return format!("{head}{EXTERNAL_MARKER}");
        }
        let body: Vec<String> = if info.shape == TypeShape::Enum {
            d.enum_constants.clone()
        } else {
            d.fields
                .iter()
                .map(|f| format!("{} : {}", f.name, f.type_ref.display()))
                .collect()
        };
        if body.is_empty() {
            format!("{head}{DATA_MARKER}")
        } else {
            format!("{head}{DATA_MARKER} {{\n{}\n}}", body.join("\n"))
        }
    }

    /// Actors with at least one drawn interaction
    fn actor_lines(&self, relations: &RelationGraph) -> Vec<String> {
        let actors: BTreeSet<&str> = relations
            .relations()
            .filter(|r| self.relation_line(r).is_some())
            .filter_map(Relation::actor)
            .collect();
        actors.into_iter().map(|a| format!("() {a}")).collect()
    }

    fn relation_lines(&self, relations: &RelationGraph) -> Vec<String> {
        let lines: BTreeSet<String> = relations
            .relations()
            .filter_map(|r| self.relation_line(r))
            .collect();
        lines.into_iter().collect()
    }

    /// One relation line, or `None` when the coarsening rule suppresses it.
    ///
    /// An actor counts as a visible source side. A type source side is visible when its
    /// container is; it only redirects to a container summary when its own container is expanded.
    pub fn relation_line(&self, relation: &Relation) -> Option<String> {
        if let Some(forward) = relation.to_forward() {
            return self.relation_line(&forward);
        }
        let target = self.containers.container_of(&relation.target);
        if target.hidden {
            return None;
        }

        let (source_name, redirect) = match &relation.source {
            Endpoint::Actor(actor) => (actor.as_str(), !target.expanded),
            Endpoint::Type(source) => {
                let container = self.containers.container_of(source);
                if container.hidden || (!container.expanded && !target.expanded) {
                    return None;
                }
                (source.as_str(), container.expanded && !target.expanded)
            }
        };

        let target_name = if redirect {
            target.node_id().to_string()
        } else {
            relation.target.clone()
        };
        let mut line = format!("{} {} {}", source_name, relation.arrow(), target_name);

        let label = match relation.kind {
            RelationKind::ActorInteraction => relation.label.clone(),
            _ if self.display == MemberDisplay::Arrow => {
                relation.action.as_ref().map(|a| a.replace('\n', "\\n"))
            }
            _ => None,
        };
        if let Some(label) = label {
            line.push_str(" : ");
            line.push_str(&label);
        }
        Some(line)
    }
}

/// Member names per owning type. Uses-edges name members of the target; used-by edges name
/// members of their source (the used type).
fn member_annotations(relations: &RelationGraph) -> BTreeMap<&str, BTreeSet<String>> {
    let mut out: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
    for r in relations.relations() {
        let Some(action) = &r.action else {
            continue;
        };
        let owner = match r.kind {
            RelationKind::UsedBy => r.source_type(),
            RelationKind::Uses
            | RelationKind::UsesAsMember
            | RelationKind::UsesAsParameter
            | RelationKind::UsesAsReturn => Some(r.target.as_str()),
            _ => None,
        };
        if let Some(owner) = owner {
            out.entry(owner)
                .or_default()
                .extend(action.lines().map(String::from));
        }
    }
    out
}

fn container_block(container: &Container) -> String {
    let members: Vec<&str> = container.members.iter().map(String::as_str).collect();
    format!(
        "object \"{}\" as {}{} {{\n{}\n}}",
        container.name,
        container.node_id(),
        EXTERNAL_MARKER,
        members.join("\n")
    )
}

fn push_footer(lines: &mut Vec<String>, title: &str, caption: &str) {
    lines.push(format!("title\n{title}\nendtitle"));
    lines.push(format!("caption\n{caption}\nendcaption"));
    lines.push("skinparam linetype polyline".to_string());
    lines.push("@enduml".to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DeclaredKind, Nesting, TypeDescriptor, TypeUniverse};
    use crate::domain::ports::{NestingDetector, OriginResolver};

    struct TopLevel;
    impl NestingDetector for TopLevel {
        fn detect(&self, _: &str) -> Nesting {
            Nesting::TopLevel
        }
    }

    struct OriginIsName;
    impl OriginResolver for OriginIsName {
        fn container_name(&self, origin: &str) -> Option<String> {
            Some(origin.to_string())
        }
    }

    fn fixture() -> (TypeRegistry, ContainerRegistry) {
        let mut a = TypeDescriptor::new("app.A", DeclaredKind::Class);
        a.origin = Some("app".into());
        let mut b = TypeDescriptor::new("lib.B", DeclaredKind::Class);
        b.origin = Some("lib".into());
        let universe = TypeRegistry::from_universe(
            TypeUniverse {
                project_root: None,
                types: vec![a, b],
            },
            &TopLevel,
        );
        let mut containers = ContainerRegistry::new(Box::new(OriginIsName));
        containers.classify(&universe, "app.A");
        containers.classify(&universe, "lib.B");
        containers.set_expanded("app", true);
        (universe, containers)
    }

    #[test]
    fn test_edge_into_closed_container_targets_its_summary() {
        let (universe, mut containers) = fixture();
        let focus = BTreeSet::from(["app.A".to_string()]);
        let uses = Relation::new("app.A", "lib.B", RelationKind::Uses);

        let line = DiagramRenderer::new(&universe, &containers, &focus).relation_line(&uses);
        assert_eq!(line.as_deref(), Some("app.A ..> c_lib"));

        containers.set_expanded("lib", true);
        let line = DiagramRenderer::new(&universe, &containers, &focus).relation_line(&uses);
        assert_eq!(line.as_deref(), Some("app.A ..> lib.B"));
    }

    #[test]
    fn test_hidden_target_suppresses_edge() {
        let (universe, mut containers) = fixture();
        containers.set_hidden("lib", true);
        let focus = BTreeSet::new();
        let uses = Relation::new("app.A", "lib.B", RelationKind::Uses);
        assert!(DiagramRenderer::new(&universe, &containers, &focus).relation_line(&uses).is_none());
    }

    #[test]
    fn test_closed_to_closed_is_suppressed_but_actor_is_not() {
        let (universe, mut containers) = fixture();
        containers.set_expanded("app", false);
        let focus = BTreeSet::new();
        let renderer = DiagramRenderer::new(&universe, &containers, &focus);
        let back = Relation::new("lib.B", "app.A", RelationKind::Uses);
        assert_eq!(renderer.relation_line(&back), None);

        let actor = Relation::interaction("User", "lib.B", "open");
        assert_eq!(
            renderer.relation_line(&actor).as_deref(),
            Some("User .right.> c_lib : open")
        );
    }

    #[test]
    fn test_arrow_mode_labels_actions() {
        let (universe, mut containers) = fixture();
        containers.set_expanded("lib", true);
        let focus = BTreeSet::new();
        let uses = Relation::new("app.A", "lib.B", RelationKind::Uses)
            .with_action(Some("open\nclose".into()));
        let line = DiagramRenderer::new(&universe, &containers, &focus)
            .with_display(MemberDisplay::Arrow)
            .relation_line(&uses);
        assert_eq!(line.as_deref(), Some("app.A ..> lib.B : open\\nclose"));
    }

    #[test]
    fn test_class_document_layout() {
        let (universe, containers) = fixture();
        let focus = BTreeSet::from(["app.A".to_string()]);
        let mut graph = RelationGraph::new();
        graph.insert(Relation::new("app.A", "lib.B", RelationKind::Uses));

        let text = DiagramRenderer::new(&universe, &containers, &focus).render_class(&graph, "T", "D");
        assert_eq!(
            text,
            "@startuml\n\
             class app.A\n\
             object \"lib\" as c_lib #ccc {\nlib.B\n}\n\
             app.A ..> c_lib\n\
             title\nT\nendtitle\n\
             caption\nD\nendcaption\n\
             skinparam linetype polyline\n\
             @enduml"
        );
    }

    #[test]
    fn test_inverse_hierarchy_is_drawn_child_to_parent() {
        let (universe, mut containers) = fixture();
        containers.set_expanded("lib", true);
        let focus = BTreeSet::new();
        let renderer = DiagramRenderer::new(&universe, &containers, &focus);

        let extended_by = Relation::new("lib.B", "app.A", RelationKind::ExtendedBy);
        assert_eq!(
            renderer.relation_line(&extended_by).as_deref(),
            Some("app.A -up-|> lib.B")
        );
        let implemented_by = Relation::new("lib.B", "app.A", RelationKind::ImplementedBy);
        assert_eq!(
            renderer.relation_line(&implemented_by).as_deref(),
            Some("app.A .up.|> lib.B")
        );
    }

    #[test]
    fn test_actor_without_drawn_edge_is_not_declared() {
        let (universe, mut containers) = fixture();
        containers.set_hidden("lib", true);
        let focus = BTreeSet::new();
        let mut graph = RelationGraph::new();
        graph.insert(Relation::interaction("Robot", "lib.B", "tick"));
        graph.insert(Relation::interaction("User", "app.A", "open"));

        let text = DiagramRenderer::new(&universe, &containers, &focus).render_class(&graph, "T", "D");
        assert!(text.starts_with("@startuml\n() User\n"));
        assert!(!text.contains("Robot"));
    }
}
