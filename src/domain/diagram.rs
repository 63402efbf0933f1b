//! Diagram facade: focus selection, container flags and actor interactions for one render.

use crate::domain::container::ContainerRegistry;
use crate::domain::erm;
use crate::domain::graph::RelationGraph;
use crate::domain::inference::{DiagramKind, InferenceOptions, RelationInference};
use crate::domain::model::TypeId;
use crate::domain::ports::OriginResolver;
use crate::domain::relation::Relation;
use crate::domain::render::{DiagramRenderer, MemberDisplay};
use crate::domain::type_registry::TypeRegistry;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// One class or entity-relationship diagram over a shared type universe.
///
/// Owns its container registry, so concurrent diagrams never share visibility state.
pub struct Diagram<'a> {
    universe: &'a TypeRegistry,
    containers: ContainerRegistry,
    focus: BTreeSet<TypeId>,
    /// Containers the caller hid; revealing focus containers never un-hides them
    hidden: BTreeSet<String>,
    interactions: Vec<Relation>,
    options: InferenceOptions,
    display: MemberDisplay,
    title: String,
    description: String,
}

impl<'a> Diagram<'a> {
    pub fn class(universe: &'a TypeRegistry, resolver: Box<dyn OriginResolver>) -> Self {
        Self::with_containers(universe, ContainerRegistry::new(resolver), DiagramKind::Class)
    }

    /// Entity diagrams start with every container hidden; focus containers are revealed.
    pub fn entity(universe: &'a TypeRegistry, resolver: Box<dyn OriginResolver>) -> Self {
        let containers = ContainerRegistry::with_default_hidden(resolver, true);
        Self::with_containers(universe, containers, DiagramKind::Entity)
    }

    fn with_containers(universe: &'a TypeRegistry, containers: ContainerRegistry, mode: DiagramKind) -> Self {
        Self {
            universe,
            containers,
            focus: BTreeSet::new(),
            hidden: BTreeSet::new(),
            interactions: Vec::new(),
            options: InferenceOptions {
                mode,
                ..Default::default()
            },
            display: MemberDisplay::None,
            title: String::new(),
            description: String::new(),
        }
    }

    pub fn titled(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.title = title.into();
        self.description = description.into();
        self
    }

    /// Replace the scan options. The diagram kind chosen at construction is kept.
    pub fn with_options(mut self, options: InferenceOptions) -> Self {
        let mode = self.options.mode;
        self.options = InferenceOptions { mode, ..options };
        self
    }

    pub fn with_display(mut self, display: MemberDisplay) -> Self {
        self.display = display;
        self
    }

    pub fn kind(&self) -> DiagramKind {
        self.options.mode
    }

    /// Add a type to the focus set. Returns `false` if the universe does not know it.
    pub fn analyze_type(&mut self, type_id: &str) -> bool {
        if !self.universe.contains(type_id) {
            return false;
        }
        self.focus.insert(type_id.to_string());
        true
    }

    /// Add every type of `package` and its sub-packages. Returns how many were found.
    pub fn analyze_package(&mut self, package: &str) -> usize {
        let types = self.universe.types_in_package(package);
        let count = types.len();
        self.focus.extend(types.into_iter().cloned());
        debug!(package, count, "Added package to focus");
        count
    }

    pub fn focus(&self) -> &BTreeSet<TypeId> {
        &self.focus
    }

    pub fn containers(&self) -> &ContainerRegistry {
        &self.containers
    }

    pub fn containers_mut(&mut self) -> &mut ContainerRegistry {
        &mut self.containers
    }

    /// Hide a container for this diagram, focus types inside it included.
    pub fn hide_container(&mut self, name: &str) {
        self.containers.set_hidden(name, true);
        self.hidden.insert(name.to_string());
    }

    /// Record that `actor` invokes `member` on `type_id`.
    pub fn add_interaction(&mut self, actor: &str, type_id: &str, member: &str) {
        self.interactions
            .push(Relation::interaction(actor, type_id, member));
    }

    /// Infer, combine (entity diagrams) and render.
    pub fn to_plantuml(&mut self) -> String {
        self.reveal_focus_containers();

        let mut graph = RelationGraph::new();
        for relation in &self.interactions {
            if self.containers.is_visible(self.universe, &relation.target) {
                graph.insert(relation.clone());
            } else {
                debug!(actor = ?relation.actor(), target = %relation.target, "Dropping interaction with hidden type");
            }
        }
        RelationInference::new(self.universe, &self.options).infer_into(
            &self.focus,
            &mut self.containers,
            &mut graph,
        );

        let renderer = DiagramRenderer::new(self.universe, &self.containers, &self.focus)
            .with_display(self.display);
        let text = match self.options.mode {
            DiagramKind::Class => renderer.render_class(&graph, &self.title, &self.description),
            DiagramKind::Entity => {
                let report = erm::combine(&mut graph);
                renderer.render_entity(&graph, &self.title, &self.description, &report.unmatched)
            }
        };
        info!(
            focus = self.focus.len(),
            relations = graph.len(),
            containers = self.containers.len(),
            "Rendered diagram"
        );
        text
    }

    fn reveal_focus_containers(&mut self) {
        let names: BTreeSet<String> = self
            .focus
            .iter()
            .map(|t| {
                let id = self.containers.classify(self.universe, t);
                self.containers.get(id).name.clone()
            })
            .collect();
        for name in names {
            self.containers.set_expanded(&name, true);
            if self.options.mode == DiagramKind::Entity && !self.hidden.contains(&name) {
                self.containers.set_hidden(&name, false);
            }
        }
    }
}
