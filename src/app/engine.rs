use crate::adapters::nesting::JvmNestingDetector;
use crate::adapters::origin::ArtifactOriginResolver;
use crate::adapters::universe::JsonUniverseSource;
use crate::app::dto::*;
use crate::domain::container::ContainerRegistry;
use crate::domain::diagram::Diagram;
use crate::domain::inference::DiagramKind;
use crate::domain::model::TypeUniverse;
use crate::domain::ports::TypeUniverseSource;
use crate::domain::type_registry::TypeRegistry;
use anyhow::{Context as _, Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Shared, reloadable view of one type universe. Every render builds its own containers and
/// relations; only the immutable registry is shared.
#[derive(Clone)]
pub struct DiagramEngine {
    inner: Arc<RwLock<EngineData>>,
}

struct EngineData {
    universe_path: Option<PathBuf>,
    project_root: Option<String>,
    registry: Arc<TypeRegistry>,
}

impl DiagramEngine {
    /// Construct an engine from an in-memory universe (tests, embedding).
    pub fn from_universe(universe: TypeUniverse) -> Self {
        Self::new(None, universe)
    }

    pub fn load_from_json(path: &Path) -> Result<Self> {
        let universe = JsonUniverseSource::new(path)
            .load()
            .context("Failed to load type universe")?;
        Ok(Self::new(Some(path.to_path_buf()), universe))
    }

    fn new(universe_path: Option<PathBuf>, universe: TypeUniverse) -> Self {
        let project_root = universe.project_root.clone();
        let registry = TypeRegistry::from_universe(universe, &JvmNestingDetector);
        info!(types = registry.len(), "Type universe loaded");
        Self {
            inner: Arc::new(RwLock::new(EngineData {
                universe_path,
                project_root,
                registry: Arc::new(registry),
            })),
        }
    }

    pub fn reload(&self) -> Result<HealthResponse> {
        let path = {
            let data = self.inner.read().map_err(|_| anyhow!("engine lock poisoned"))?;
            data.universe_path
                .clone()
                .ok_or_else(|| anyhow!("engine was not loaded from a file"))?
        };
        let fresh = Self::load_from_json(&path)?;
        let (project_root, registry) = {
            let new_data = fresh.inner.read().map_err(|_| anyhow!("engine lock poisoned"))?;
            (new_data.project_root.clone(), new_data.registry.clone())
        };

        let mut data = self.inner.write().map_err(|_| anyhow!("engine lock poisoned"))?;
        data.project_root = project_root;
        data.registry = registry;
        Ok(health_of(&data))
    }

    pub fn health(&self) -> Result<HealthResponse> {
        let data = self.inner.read().map_err(|_| anyhow!("engine lock poisoned"))?;
        Ok(health_of(&data))
    }

    fn snapshot(&self) -> Result<(Arc<TypeRegistry>, Option<String>)> {
        let data = self.inner.read().map_err(|_| anyhow!("engine lock poisoned"))?;
        Ok((data.registry.clone(), data.project_root.clone()))
    }

    /// Render one job to diagram text.
    pub fn render(&self, job: &RenderJob) -> Result<RenderResponse> {
        let (kind, params) = job.section()?;
        let (registry, project_root) = self.snapshot()?;
        let resolver = resolver_for(params, project_root);

        let mut diagram = match kind {
            DiagramKind::Class => Diagram::class(&registry, Box::new(resolver)),
            DiagramKind::Entity => Diagram::entity(&registry, Box::new(resolver)),
        }
        .titled(params.title.as_str(), params.description.as_str())
        .with_options(params.inference_options(kind))
        .with_display(params.show_use_by_method_names.into());

        for container in &params.containers_to_hide {
            diagram.hide_container(container);
        }
        for class in &params.classes_to_analyze {
            if !diagram.analyze_type(class) {
                return Err(JobError::UnknownType(class.clone()).into());
            }
        }
        for package in &params.packages_to_analyze {
            if diagram.analyze_package(package) == 0 {
                warn!(package = %package, "Package has no types in the universe");
            }
        }

        let text = diagram.to_plantuml();
        Ok(RenderResponse {
            kind: match kind {
                DiagramKind::Class => "class".into(),
                DiagramKind::Entity => "erm".into(),
            },
            diagram: drop_hidden_lines(&text, &params.classes_to_hide),
        })
    }

    /// Parse one request line and render it.
    pub fn render_line(&self, line: &str) -> Result<String> {
        let job: RenderJob = serde_json::from_str(line).context("Malformed job")?;
        Ok(self.render(&job)?.diagram)
    }

    /// Classify every type of the universe and summarise the resulting containers.
    pub fn containers(&self, project_dir: Option<&str>, module_dirs: &[String]) -> Result<Vec<ContainerSummary>> {
        let (registry, project_root) = self.snapshot()?;
        let params = DiagramParams {
            project_dir: project_dir.map(String::from),
            module_dirs: module_dirs.to_vec(),
            ..Default::default()
        };
        let mut containers = ContainerRegistry::new(Box::new(resolver_for(&params, project_root)));

        let mut names: Vec<&String> = registry.type_ids().collect();
        names.sort();
        for name in names {
            containers.classify(&registry, name);
        }

        let mut out: Vec<ContainerSummary> = containers
            .containers()
            .map(|c| ContainerSummary {
                name: c.name.clone(),
                hidden: c.hidden,
                member_count: c.members.len(),
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

fn health_of(data: &EngineData) -> HealthResponse {
    HealthResponse {
        universe_path: data
            .universe_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default(),
        project_root: data.project_root.clone(),
        type_count: data.registry.len(),
    }
}

fn resolver_for(params: &DiagramParams, project_root: Option<String>) -> ArtifactOriginResolver {
    let resolver = ArtifactOriginResolver::new().with_module_dirs(params.module_dirs.iter().cloned());
    match params.project_dir.clone().or(project_root) {
        Some(dir) => resolver.with_project_dir(dir),
        None => resolver,
    }
}

/// Drop every line that mentions one of `hidden`.
pub fn drop_hidden_lines(text: &str, hidden: &[String]) -> String {
    let hidden: Vec<&str> = hidden
        .iter()
        .map(String::as_str)
        .filter(|h| !h.is_empty())
        .collect();
    if hidden.is_empty() {
        return text.to_string();
    }
    text.lines()
        .filter(|line| !hidden.iter().any(|h| line.contains(h)))
        .collect::<Vec<_>>()
        .join("\n")
}
