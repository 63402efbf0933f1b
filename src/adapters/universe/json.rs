use crate::domain::model::TypeUniverse;
use crate::domain::ports::TypeUniverseSource;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Type universe read from a JSON document written by an extractor
pub struct JsonUniverseSource {
    pub path: PathBuf,
}

impl JsonUniverseSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TypeUniverseSource for JsonUniverseSource {
    fn load(&self) -> Result<TypeUniverse> {
        load_universe(&self.path)
    }
}

fn load_universe(path: &Path) -> Result<TypeUniverse> {
    use memmap2::Mmap;
    use std::fs::File;

    let file = File::open(path)
        .with_context(|| format!("Failed to open type universe: {}", path.display()))?;
    if file.metadata().map(|m| m.len() == 0).unwrap_or(false) {
        anyhow::bail!("Type universe is empty: {}", path.display());
    }
    // SAFETY: the file is opened read-only and only read while the map is alive.
    let mmap = unsafe { Mmap::map(&file).context("Failed to mmap type universe")? };
    let universe: TypeUniverse =
        serde_json::from_slice(&mmap[..]).context("Failed to parse type universe JSON")?;
    Ok(universe)
}
