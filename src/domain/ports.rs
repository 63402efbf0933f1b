use crate::domain::model::{Nesting, TypeUniverse};
use crate::domain::recorder::{MethodRef, RecordingSession};
use anyhow::Result;

/// Type universe source port (implemented by Infrastructure)
pub trait TypeUniverseSource {
    fn load(&self) -> Result<TypeUniverse>;
}

/// Maps an artifact origin location to the name of the container it belongs to.
pub trait OriginResolver: Send + Sync {
    /// `None` means the origin is not recognised and the type lands in "unknown".
    fn container_name(&self, origin: &str) -> Option<String>;
}

/// Infers nesting from a binary type name when the extractor did not report it.
pub trait NestingDetector: Send + Sync {
    fn detect(&self, type_name: &str) -> Nesting;
}

/// Method hooking facility used by the sequence recorder.
pub trait Instrumentation {
    /// Arrange for `method` to report entry and exit to the running session.
    fn register_hook(&mut self, method: &MethodRef) -> Result<()>;

    /// Run the one recorded call. Hooked methods report through `session`; a type that
    /// loads during the call asks `session.hooks_for_load` which of its methods still need
    /// a hook.
    fn invoke(&mut self, call: &MethodRef, session: &mut RecordingSession) -> Result<()>;
}
