use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use crate::db::{BinaryRecord, ProjectConfig, ProjectDb, ProjectLayout};

/// An opened bookmarks project: layout, parsed `.bookmarks/project.json`,
/// and the database that config points at.
#[derive(Debug)]
pub struct ProjectContext {
    pub layout: ProjectLayout,
    pub config: ProjectConfig,
    pub db_path: PathBuf,
    pub db: ProjectDb,
}

impl ProjectContext {
    /// Open the project rooted at `root`.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        Self::open(ProjectLayout::new(root))
    }

    /// Read the project config from `layout` and open its database.
    ///
    /// A relative `db.path` in the config is taken relative to the project root.
    pub fn open(layout: ProjectLayout) -> Result<Self> {
        let config = read_config(&layout.project_config_path)?;
        let db_path = layout.resolve(&config.db.path);
        let db = ProjectDb::open(&db_path).with_context(|| {
            format!("Failed to open bookmarks database at {}", db_path.display())
        })?;
        debug!(project = %config.name, db = %db_path.display(), "opened bookmarks project");
        Ok(Self { layout, config, db_path, db })
    }

    /// Look up a registered binary, failing with a readable message if absent.
    pub fn require_binary(&self, name: &str) -> Result<BinaryRecord> {
        self.db
            .find_binary(name)?
            .ok_or_else(|| anyhow!("Binary '{}' is not registered in this project", name))
    }

    /// Absolute path of a registered binary (paths are stored relative to the root).
    pub fn binary_path(&self, record: &BinaryRecord) -> PathBuf {
        self.layout.resolve(&record.path)
    }
}

fn read_config(path: &Path) -> Result<ProjectConfig> {
    let body = fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read bookmarks project config at {} (run `init-project` first)",
            path.display()
        )
    })?;
    serde_json::from_str(&body)
        .with_context(|| format!("Failed to parse bookmarks project config {}", path.display()))
}
