//! Mock implementations for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;

use anyhow::Result;
use plantarch::domain::ports::{Instrumentation, OriginResolver};
use plantarch::domain::recorder::{MethodRef, RecordingSession};

/// Mock OriginResolver backed by a fixed origin -> container table.
#[derive(Default)]
pub struct MockOriginResolver {
    containers: HashMap<String, String>,
}

impl MockOriginResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, origin: &str, container: &str) -> Self {
        self.containers
            .insert(origin.to_string(), container.to_string());
        self
    }
}

impl OriginResolver for MockOriginResolver {
    fn container_name(&self, origin: &str) -> Option<String> {
        self.containers.get(origin).cloned()
    }
}

/// Scripted instrumentation: each `(owner, member)` runs a fixed list of nested calls. Only
/// hooked methods report to the session, like real bytecode hooks. A method already on the
/// call stack returns without running its script again.
#[derive(Default)]
pub struct MockInstrumentation {
    script: HashMap<(String, String), Vec<(String, String)>>,
    reloads: HashMap<(String, String), String>,
    active: Vec<(String, String)>,
    hooked: Vec<MethodRef>,
    pub register_calls: usize,
}

impl MockInstrumentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `owner.member` runs, it calls each of `calls` in order.
    pub fn with_calls(mut self, owner: &str, member: &str, calls: &[(&str, &str)]) -> Self {
        self.script.insert(
            (owner.to_string(), member.to_string()),
            calls
                .iter()
                .map(|(o, m)| (o.to_string(), m.to_string()))
                .collect(),
        );
        self
    }

    /// When `owner.member` runs, `type_id` is loaded again and asks the session for hooks.
    pub fn with_reload(mut self, owner: &str, member: &str, type_id: &str) -> Self {
        self.reloads.insert(
            (owner.to_string(), member.to_string()),
            type_id.to_string(),
        );
        self
    }

    pub fn hooked(&self) -> &[MethodRef] {
        &self.hooked
    }

    fn is_hooked(&self, owner: &str, member: &str) -> bool {
        self.hooked
            .iter()
            .any(|m| m.owner == owner && m.member == member)
    }

    fn run(&mut self, owner: &str, member: &str, session: &mut RecordingSession) -> Result<()> {
        let key = (owner.to_string(), member.to_string());
        let hooked = self.is_hooked(owner, member);
        if hooked {
            session.enter(owner, member)?;
        }
        if let Some(type_id) = self.reloads.get(&key).cloned() {
            for method in session.hooks_for_load(&type_id) {
                self.register_hook(&method)?;
            }
        }
        if !self.active.contains(&key) {
            let calls = self.script.get(&key).cloned().unwrap_or_default();
            self.active.push(key);
            for (o, m) in &calls {
                self.run(o, m, session)?;
            }
            self.active.pop();
        }
        if hooked {
            session.leave(owner, member)?;
        }
        Ok(())
    }
}

impl Instrumentation for MockInstrumentation {
    fn register_hook(&mut self, method: &MethodRef) -> Result<()> {
        self.register_calls += 1;
        self.hooked.push(method.clone());
        Ok(())
    }

    fn invoke(&mut self, call: &MethodRef, session: &mut RecordingSession) -> Result<()> {
        self.run(&call.owner, &call.member, session)
    }
}
