//! Sequence Recorder - call-stack session turning enter/leave notifications into a trace
//!
//! A [`RecordingSession`] is an ordinary value: the instrumentation receives it by `&mut` for
//! the duration of the one recorded call, so independent sessions can coexist.

use crate::domain::model::{MethodInfo, TypeId, package_of, simple_name};
use crate::domain::ports::Instrumentation;
use crate::domain::type_registry::TypeRegistry;
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("only one method call can be recorded per session, {0} was already recorded")]
    AlreadyRecorded(String),
    #[error("leave {owner}.{member} does not match the active frame")]
    UnbalancedLeave { owner: String, member: String },
    #[error("recording is incomplete: {0} frame(s) still active")]
    Incomplete(usize),
    #[error("no method call was selected for recording")]
    NothingToRecord,
}

/// A method identified by owner, name and signature (overloads are distinct).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodRef {
    pub owner: TypeId,
    pub member: String,
    pub signature: String,
}

impl MethodRef {
    pub fn new(owner: impl Into<TypeId>, member: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            member: member.into(),
            signature: signature.into(),
        }
    }

    pub fn of(owner: &str, method: &MethodInfo) -> Self {
        Self::new(owner, method.name.as_str(), method.signature())
    }
}

/// Participant name in the trace: simple name, nested-type suffix dropped.
fn participant(type_name: &str) -> &str {
    let simple = simple_name(type_name);
    simple.split('$').next().unwrap_or(simple)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    owner: String,
    member: String,
}

/// One emitted trace line and the stack depth it was emitted at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    pub depth: usize,
    pub text: String,
}

#[derive(Debug)]
pub struct RecordingSession {
    stack: Vec<Frame>,
    trace: Vec<TraceLine>,
    hooked: HashSet<MethodRef>,
    eligible: BTreeMap<TypeId, Vec<MethodRef>>,
    outer: Option<String>,
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSession {
    pub const ROOT: &'static str = "start";

    pub fn new() -> Self {
        Self {
            stack: vec![Frame {
                owner: Self::ROOT.to_string(),
                member: String::new(),
            }],
            trace: Vec::new(),
            hooked: HashSet::new(),
            eligible: BTreeMap::new(),
            outer: None,
        }
    }

    /// Session that hooks `methods` as their owning types load.
    pub fn with_eligible(methods: impl IntoIterator<Item = MethodRef>) -> Self {
        let mut session = Self::new();
        for method in methods {
            session
                .eligible
                .entry(method.owner.clone())
                .or_default()
                .push(method);
        }
        session
    }

    /// Owners with at least one eligible method
    pub fn eligible_types(&self) -> Vec<TypeId> {
        self.eligible.keys().cloned().collect()
    }

    /// Eligible methods of `type_id` not hooked yet in this session. A type that loads
    /// again (another class loader, a re-entrant call) gets nothing the second time.
    pub fn hooks_for_load(&mut self, type_id: &str) -> Vec<MethodRef> {
        let Some(methods) = self.eligible.get(type_id) else {
            return Vec::new();
        };
        let hooked = &mut self.hooked;
        methods
            .iter()
            .filter(|m| hooked.insert((*m).clone()))
            .cloned()
            .collect()
    }

    /// Mark `method` as hooked. Returns `false` if it already was.
    pub fn register_hook(&mut self, method: &MethodRef) -> bool {
        self.hooked.insert(method.clone())
    }

    pub fn is_hooked(&self, method: &MethodRef) -> bool {
        self.hooked.contains(method)
    }

    pub fn hook_count(&self) -> usize {
        self.hooked.len()
    }

    /// Active frames, the root excluded
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn enter(&mut self, owner: &str, member: &str) -> Result<(), RecorderError> {
        if self.depth() == 0 {
            if let Some(previous) = &self.outer {
                return Err(RecorderError::AlreadyRecorded(previous.clone()));
            }
            self.outer = Some(format!("{owner}.{member}"));
        }

        let depth = self.depth();
        let caller = self
            .stack
            .last()
            .map(|f| participant(&f.owner).to_string())
            .unwrap_or_else(|| Self::ROOT.to_string());
        let callee = participant(owner);
        self.emit(depth, format!("{caller} -> {callee}: {member}"));
        self.emit(depth, format!("activate {callee}"));
        self.stack.push(Frame {
            owner: owner.to_string(),
            member: member.to_string(),
        });
        Ok(())
    }

    /// Close the active frame. Emits no return arrow, only the deactivation.
    pub fn leave(&mut self, owner: &str, member: &str) -> Result<(), RecorderError> {
        let matches = self.depth() > 0
            && self
                .stack
                .last()
                .is_some_and(|f| f.owner == owner && f.member == member);
        if !matches {
            return Err(RecorderError::UnbalancedLeave {
                owner: owner.to_string(),
                member: member.to_string(),
            });
        }
        self.stack.pop();
        let depth = self.depth();
        self.emit(depth, format!("deactivate {}", participant(owner)));
        Ok(())
    }

    fn emit(&mut self, depth: usize, text: String) {
        self.trace.push(TraceLine { depth, text });
    }

    /// Exactly one outer call was made and everything it invoked has returned.
    pub fn is_complete(&self) -> bool {
        self.outer.is_some() && self.depth() == 0
    }

    pub fn trace(&self) -> &[TraceLine] {
        &self.trace
    }

    pub fn trace_text(&self) -> String {
        self.trace
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Sequence diagram of one recorded call
#[derive(Debug, Clone)]
pub struct SequenceDiagram {
    title: String,
    description: String,
    packages: BTreeSet<String>,
    call: Option<MethodRef>,
}

impl SequenceDiagram {
    pub fn new<I, S>(title: impl Into<String>, description: impl Into<String>, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            description: description.into(),
            packages: packages.into_iter().map(Into::into).collect(),
            call: None,
        }
    }

    /// Select the one call to record. A second selection is rejected.
    pub fn analyze_call(&mut self, call: MethodRef) -> Result<(), RecorderError> {
        if let Some(existing) = &self.call {
            return Err(RecorderError::AlreadyRecorded(format!(
                "{}.{}",
                existing.owner, existing.member
            )));
        }
        self.call = Some(call);
        Ok(())
    }

    /// Methods eligible for hooking: declared by types of the analysed packages and not
    /// abstract, native, final or private. Sorted and distinct.
    pub fn instrumentable_methods(&self, universe: &TypeRegistry) -> Vec<MethodRef> {
        let mut out: BTreeSet<MethodRef> = BTreeSet::new();
        for type_id in universe.type_ids() {
            if !self.packages.contains(package_of(type_id)) {
                continue;
            }
            let Some(info) = universe.get(type_id) else {
                continue;
            };
            for method in &info.descriptor.methods {
                let m = &method.modifiers;
                if m.is_abstract || m.is_native || m.is_final || m.is_private {
                    continue;
                }
                out.insert(MethodRef::of(type_id, method));
            }
        }
        out.into_iter().collect()
    }

    /// Hook eligible methods, run the selected call, and render the trace.
    pub fn record(&self, universe: &TypeRegistry, instrumentation: &mut dyn Instrumentation) -> Result<String> {
        let call = self.call.as_ref().ok_or(RecorderError::NothingToRecord)?;
        let mut session = RecordingSession::with_eligible(self.instrumentable_methods(universe));

        for type_id in session.eligible_types() {
            for method in session.hooks_for_load(&type_id) {
                instrumentation.register_hook(&method)?;
            }
        }
        debug!(hooks = session.hook_count(), "Registered method hooks");

        instrumentation.invoke(call, &mut session)?;
        if !session.is_complete() {
            return Err(RecorderError::Incomplete(session.depth()).into());
        }
        info!(lines = session.trace().len(), "Recorded call sequence");
        Ok(self.render(&session))
    }

    pub fn render(&self, session: &RecordingSession) -> String {
        let mut lines = vec!["@startuml".to_string(), format!("actor {}", RecordingSession::ROOT)];
        lines.extend(session.trace().iter().map(|l| l.text.clone()));
        lines.push(format!("title\n{}\nendtitle", self.title));
        lines.push(format!("caption\n{}\nendcaption", self.description));
        lines.push("skinparam linetype polyline".to_string());
        lines.push("@enduml".to_string());
        lines.join("\n")
    }
}
