use crate::domain::inference::{DiagramKind, InferenceOptions};
use crate::domain::render::MemberDisplay;
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShowMethodNames {
    #[default]
    None,
    Definition,
    Arrow,
}

impl From<ShowMethodNames> for MemberDisplay {
    fn from(value: ShowMethodNames) -> Self {
        match value {
            ShowMethodNames::None => MemberDisplay::None,
            ShowMethodNames::Definition => MemberDisplay::Definition,
            ShowMethodNames::Arrow => MemberDisplay::Arrow,
        }
    }
}

/// Parameters of one diagram request
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagramParams {
    pub title: String,
    pub description: String,
    /// Fully-qualified names of focus types
    pub classes_to_analyze: Vec<String>,
    /// Packages whose types (sub-packages included) join the focus set
    pub packages_to_analyze: Vec<String>,
    pub containers_to_hide: Vec<String>,
    /// Output lines containing any of these substrings are dropped
    pub classes_to_hide: Vec<String>,
    pub show_use_by_method_names: ShowMethodNames,
    pub project_dir: Option<String>,
    pub module_dirs: Vec<String>,
    pub member_hidden: bool,
    pub parameter_hidden: bool,
    pub return_hidden: bool,
    pub member_color: Option<String>,
    pub parameter_color: Option<String>,
    pub return_color: Option<String>,
}

impl DiagramParams {
    pub fn inference_options(&self, mode: DiagramKind) -> InferenceOptions {
        InferenceOptions {
            mode,
            member_hidden: self.member_hidden,
            parameter_hidden: self.parameter_hidden,
            return_hidden: self.return_hidden,
            member_color: self.member_color.clone(),
            parameter_color: self.parameter_color.clone(),
            return_color: self.return_color.clone(),
        }
    }
}

/// One request line. Exactly one of the two sections must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_diagrams: Option<DiagramParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub erm_diagrams: Option<DiagramParams>,
}

impl RenderJob {
    pub fn class(params: DiagramParams) -> Self {
        Self {
            class_diagrams: Some(params),
            erm_diagrams: None,
        }
    }

    pub fn entity(params: DiagramParams) -> Self {
        Self {
            class_diagrams: None,
            erm_diagrams: Some(params),
        }
    }

    pub fn section(&self) -> Result<(DiagramKind, &DiagramParams), JobError> {
        match (&self.class_diagrams, &self.erm_diagrams) {
            (Some(p), None) => Ok((DiagramKind::Class, p)),
            (None, Some(p)) => Ok((DiagramKind::Entity, p)),
            (None, None) => Err(JobError::NoSection),
            (Some(_), Some(_)) => Err(JobError::BothSections),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("job needs a classDiagrams or an ermDiagrams section")]
    NoSection,
    #[error("job has both classDiagrams and ermDiagrams sections")]
    BothSections,
    #[error("type not found in universe: {0}")]
    UnknownType(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenderResponse {
    /// `class` or `erm`
    pub kind: String,
    pub diagram: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub universe_path: String,
    pub project_root: Option<String>,
    pub type_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ContainerSummary {
    pub name: String,
    pub hidden: bool,
    pub member_count: usize,
}
