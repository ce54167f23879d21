use anyhow::{Context, Result};
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Ids of every listing already observed, plus whether they came from prior state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    ids: BTreeSet<String>,
    restored: bool,
}

impl SeenSet {
    /// Empty set with no prior state behind it.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn restored<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            ids: ids.into_iter().collect(),
            restored: true,
        }
    }

    /// True when no usable prior state existed (missing or corrupt file).
    pub fn is_cold_start(&self) -> bool {
        !self.restored
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns true when the id was not present before.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

/// Durable home of the [`SeenSet`] between runs.
pub trait SeenStore {
    /// Never fails: missing or unreadable state degrades to an empty set.
    fn load(&self) -> SeenSet;
    /// Replaces the stored state entirely.
    fn save(&self, seen: &SeenSet) -> Result<()>;
}

/// Keeps the ids as a sorted JSON array in a single file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "seen".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SeenStore for JsonFileStore {
    fn load(&self) -> SeenSet {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No state file at {}, starting fresh", self.path.display());
                return SeenSet::empty();
            }
            Err(e) => {
                warn!("Failed to read state file {}: {}", self.path.display(), e);
                return SeenSet::empty();
            }
        };

        match serde_json::from_str::<Vec<String>>(&data) {
            Ok(ids) => {
                let seen = SeenSet::restored(ids);
                info!("Loaded {} seen listing ids from {}", seen.len(), self.path.display());
                seen
            }
            Err(e) => {
                warn!("State file {} is corrupt, treating as empty: {}", self.path.display(), e);
                SeenSet::empty()
            }
        }
    }

    fn save(&self, seen: &SeenSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .context(format!("Failed to create state directory: {}", parent.display()))?;
            }
        }

        let ids: Vec<&str> = seen.ids().collect();
        let json = serde_json::to_string_pretty(&ids).context("Failed to serialize seen ids")?;

        // Written beside the target and renamed over it so readers never see a partial file
        let temp_path = self.temp_path();
        let mut file = File::create(&temp_path)
            .context(format!("Failed to create state file: {}", temp_path.display()))?;
        file.write_all(json.as_bytes())
            .context(format!("Failed to write state file: {}", temp_path.display()))?;
        file.sync_all()
            .context(format!("Failed to flush state file: {}", temp_path.display()))?;
        drop(file);

        fs::rename(&temp_path, &self.path)
            .context(format!("Failed to replace state file: {}", self.path.display()))?;

        debug!("Saved {} seen listing ids to {}", seen.len(), self.path.display());
        Ok(())
    }
}

/// In-process store, mainly for exercising the watcher without touching disk.
#[derive(Default)]
pub struct MemoryStore {
    state: RefCell<Option<Vec<String>>>,
    saves: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: RefCell::new(Some(ids.into_iter().map(Into::into).collect())),
            saves: Cell::new(0),
        }
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    pub fn stored_ids(&self) -> Option<Vec<String>> {
        self.state.borrow().clone()
    }
}

impl SeenStore for MemoryStore {
    fn load(&self) -> SeenSet {
        match self.state.borrow().as_ref() {
            Some(ids) => SeenSet::restored(ids.iter().cloned()),
            None => SeenSet::empty(),
        }
    }

    fn save(&self, seen: &SeenSet) -> Result<()> {
        *self.state.borrow_mut() = Some(seen.ids().map(str::to_string).collect());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
