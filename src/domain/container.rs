//! Container Registry - origin buckets that group types for coarsening
//!
//! A type's container is decided once, from where its artifact was loaded, and cached for the
//! rest of the run. Flags live on the container, so hiding or expanding a bucket applies to
//! every type classified into it, before or after the flag change.

use crate::domain::model::{Nesting, TypeId};
use crate::domain::ports::OriginResolver;
use crate::domain::type_registry::TypeRegistry;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Index into the registry's container arena
pub type ContainerId = usize;

/// Sentinel bucket for everything that cannot be attributed to an origin
pub const UNKNOWN_CONTAINER: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    pub hidden: bool,
    pub expanded: bool,
    /// Types classified into this container so far
    pub members: BTreeSet<TypeId>,
    node_id: String,
}

impl Container {
    fn new(name: &str, hidden: bool, node_id: String) -> Self {
        Self {
            name: name.to_string(),
            hidden,
            expanded: false,
            members: BTreeSet::new(),
            node_id,
        }
    }

    /// Diagram node identifier for the container summary block, unique within its registry
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_CONTAINER
    }
}

/// `c_` plus the name with every non-alphanumeric character replaced by `_`
fn sanitized_id(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("c_{sanitized}")
}

pub struct ContainerRegistry {
    containers: Vec<Container>,
    node_ids: HashSet<String>,
    by_name: HashMap<String, ContainerId>,
    assignments: HashMap<TypeId, ContainerId>,
    resolver: Box<dyn OriginResolver>,
    hidden_by_default: bool,
}

impl ContainerRegistry {
    pub const UNKNOWN: ContainerId = 0;

    pub fn new(resolver: Box<dyn OriginResolver>) -> Self {
        Self::with_default_hidden(resolver, false)
    }

    /// Registry whose newly created containers start hidden (entity diagrams).
    pub fn with_default_hidden(resolver: Box<dyn OriginResolver>, hidden_by_default: bool) -> Self {
        let unknown_id = sanitized_id(UNKNOWN_CONTAINER);
        let unknown = Container::new(UNKNOWN_CONTAINER, true, unknown_id.clone());
        let mut by_name = HashMap::new();
        by_name.insert(UNKNOWN_CONTAINER.to_string(), Self::UNKNOWN);
        Self {
            containers: vec![unknown],
            node_ids: HashSet::from([unknown_id]),
            by_name,
            assignments: HashMap::new(),
            resolver,
            hidden_by_default,
        }
    }

    /// Assign `type_id` to its container. The first classification wins.
    pub fn classify(&mut self, universe: &TypeRegistry, type_id: &str) -> ContainerId {
        if let Some(&id) = self.assignments.get(type_id) {
            return id;
        }

        let id = match self.resolve_name(universe, type_id) {
            Some(name) => self.get_or_create(&name),
            None => Self::UNKNOWN,
        };
        self.assignments.insert(type_id.to_string(), id);
        self.containers[id].members.insert(type_id.to_string());
        id
    }

    fn resolve_name(&self, universe: &TypeRegistry, type_id: &str) -> Option<String> {
        let info = universe.get(type_id)?;
        if info.nesting != Nesting::TopLevel {
            return None;
        }
        let origin = info.descriptor.origin.as_deref()?;
        self.resolver.container_name(origin)
    }

    pub fn get_or_create(&mut self, name: &str) -> ContainerId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.containers.len();
        let node_id = self.unique_node_id(name);
        self.containers
            .push(Container::new(name, self.hidden_by_default, node_id));
        self.by_name.insert(name.to_string(), id);
        debug!(container = name, hidden = self.hidden_by_default, "Created container");
        id
    }

    /// Names that sanitize to an id already taken get a numeric suffix (`c_a_b_jar_2`).
    fn unique_node_id(&mut self, name: &str) -> String {
        let base = sanitized_id(name);
        let mut candidate = base.clone();
        let mut n = 2;
        while self.node_ids.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        self.node_ids.insert(candidate.clone());
        candidate
    }

    pub fn set_hidden(&mut self, name: &str, hidden: bool) {
        if name == UNKNOWN_CONTAINER {
            debug!("Ignoring visibility change on the unknown container");
            return;
        }
        let id = self.get_or_create(name);
        self.containers[id].hidden = hidden;
    }

    pub fn set_expanded(&mut self, name: &str, expanded: bool) {
        if name == UNKNOWN_CONTAINER {
            debug!("Ignoring expansion change on the unknown container");
            return;
        }
        let id = self.get_or_create(name);
        self.containers[id].expanded = expanded;
    }

    pub fn get(&self, id: ContainerId) -> &Container {
        &self.containers[id]
    }

    pub fn by_name(&self, name: &str) -> Option<&Container> {
        self.by_name.get(name).map(|&id| &self.containers[id])
    }

    /// Container a type was classified into; unclassified types count as unknown.
    pub fn container_of(&self, type_id: &str) -> &Container {
        let id = self
            .assignments
            .get(type_id)
            .copied()
            .unwrap_or(Self::UNKNOWN);
        &self.containers[id]
    }

    pub fn is_visible(&mut self, universe: &TypeRegistry, type_id: &str) -> bool {
        let id = self.classify(universe, type_id);
        !self.containers[id].hidden
    }

    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

impl std::fmt::Debug for ContainerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerRegistry")
            .field("containers", &self.containers)
            .field("assignments", &self.assignments.len())
            .field("hidden_by_default", &self.hidden_by_default)
            .finish()
    }
}
