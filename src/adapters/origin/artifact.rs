use crate::domain::ports::OriginResolver;
use regex::Regex;
use std::sync::OnceLock;

fn archive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([^/!]+\.jar)!").expect("archive regex"))
}

fn build_output_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"/([^/]+)/(?:target|build)/classes/").expect("build output regex")
    })
}

/// Buckets origins by the artifact they were loaded from
///
/// Resolution order:
/// - `jrt:` runtime image: one bucket, `jrt`
/// - archive entries (`...foo-1.0.jar!/...`): the archive file name
/// - configured module directories: the directory's base name (longest match wins)
/// - Maven/Gradle build output (`<module>/target/classes/`, `<module>/build/classes/`): the module
/// - the project directory: its base name
#[derive(Debug, Clone, Default)]
pub struct ArtifactOriginResolver {
    project_dir: Option<String>,
    module_dirs: Vec<String>,
}

impl ArtifactOriginResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project_dir(mut self, dir: impl Into<String>) -> Self {
        self.project_dir = Some(normalize_dir(&dir.into()));
        self
    }

    pub fn with_module_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.module_dirs = dirs.into_iter().map(|d| normalize_dir(&d.into())).collect();
        self
    }
}

fn normalize_dir(dir: &str) -> String {
    dir.trim_start_matches("file:").trim_end_matches('/').to_string()
}

fn base_name(dir: &str) -> Option<String> {
    dir.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn is_under(path: &str, dir: &str) -> bool {
    path.strip_prefix(dir).is_some_and(|rest| rest.starts_with('/'))
}

impl OriginResolver for ArtifactOriginResolver {
    fn container_name(&self, origin: &str) -> Option<String> {
        if origin.starts_with("jrt:") {
            return Some("jrt".to_string());
        }
        if let Some(caps) = archive_regex().captures(origin) {
            return Some(caps[1].to_string());
        }

        let path = origin.trim_start_matches("jar:").trim_start_matches("file:");
        if let Some(dir) = self
            .module_dirs
            .iter()
            .filter(|d| is_under(path, d))
            .max_by_key(|d| d.len())
        {
            return base_name(dir);
        }
        if let Some(caps) = build_output_regex().captures(path) {
            return Some(caps[1].to_string());
        }
        match &self.project_dir {
            Some(dir) if is_under(path, dir) => base_name(dir),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_image() {
        let r = ArtifactOriginResolver::new();
        assert_eq!(
            r.container_name("jrt:/java.base/java/lang/String.class").as_deref(),
            Some("jrt")
        );
    }

    #[test]
    fn test_archive_file_name() {
        let r = ArtifactOriginResolver::new();
        assert_eq!(
            r.container_name("jar:file:/home/u/.m2/repo/guava-33.0.jar!/com/google/Foo.class")
                .as_deref(),
            Some("guava-33.0.jar")
        );
    }

    #[test]
    fn test_build_output_module() {
        let r = ArtifactOriginResolver::new();
        assert_eq!(
            r.container_name("file:/repo/billing/target/classes/a/Invoice.class").as_deref(),
            Some("billing")
        );
        assert_eq!(
            r.container_name("file:/repo/shipping/build/classes/java/main/a/Parcel.class")
                .as_deref(),
            Some("shipping")
        );
    }

    #[test]
    fn test_module_dirs_prefer_longest_match() {
        let r = ArtifactOriginResolver::new().with_module_dirs(["/repo", "/repo/core/out/"]);
        assert_eq!(
            r.container_name("file:/repo/core/out/a/X.class").as_deref(),
            Some("out")
        );
        assert_eq!(r.container_name("file:/repo/misc/a/Y.class").as_deref(), Some("repo"));
    }

    #[test]
    fn test_project_dir_and_unrecognised() {
        let r = ArtifactOriginResolver::new().with_project_dir("file:/work/shop");
        assert_eq!(r.container_name("file:/work/shop/bin/a/Z.class").as_deref(), Some("shop"));
        assert_eq!(r.container_name("file:/work/shopping/a/Z.class"), None);
        assert_eq!(r.container_name("memory:generated"), None);
    }
}
