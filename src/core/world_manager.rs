use std::path::{Path, PathBuf};

use crate::domain::world::{World, CURRENT_SCHEMA_VERSION};
use crate::errors::CodexError;
use crate::storage::{world_warnings, StorageBackend};

/// Metadata describing the outcome of a load operation.
#[derive(Debug, Clone)]
pub struct LoadMetadata {
    pub warnings: Vec<String>,
    pub path: PathBuf,
    pub name: Option<String>,
    pub schema_version: u8,
}

/// Facade that coordinates world state, persistence, and backups.
pub struct WorldManager {
    pub current: Option<World>,
    current_name: Option<String>,
    current_path: Option<PathBuf>,
    storage: Box<dyn StorageBackend>,
}

impl WorldManager {
    pub fn new(storage: Box<dyn StorageBackend>) -> Self {
        Self {
            current: None,
            current_name: None,
            current_path: None,
            storage,
        }
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn load(&mut self, name: &str) -> Result<LoadMetadata, CodexError> {
        let world = self.storage.load(name)?;
        self.ensure_schema_support(world.schema_version)?;
        let path = self.storage.world_path(name);
        self.apply_load(world, path, Some(name.to_string()))
    }

    pub fn load_from_path(&mut self, path: &Path) -> Result<LoadMetadata, CodexError> {
        let world = self.storage.load_from_path(path)?;
        self.ensure_schema_support(world.schema_version)?;
        self.apply_load(world, path.to_path_buf(), None)
    }

    pub fn save(&mut self) -> Result<PathBuf, CodexError> {
        let world = self
            .current
            .as_ref()
            .ok_or_else(|| CodexError::Storage("no world loaded".into()))?;
        if let Some(name) = self.current_name.clone() {
            let path = self.storage.save(world, &name)?;
            self.current_path = Some(path.clone());
            Ok(path)
        } else if let Some(path) = self.current_path.clone() {
            self.storage.save_to_path(world, &path)?;
            Ok(path)
        } else {
            Err(CodexError::Storage(
                "unable to determine save target for current world".into(),
            ))
        }
    }

    pub fn save_as(&mut self, name: &str) -> Result<PathBuf, CodexError> {
        let world = self
            .current
            .as_ref()
            .ok_or_else(|| CodexError::Storage("no world loaded".into()))?;
        let path = self.storage.save(world, name)?;
        self.current_name = Some(name.to_string());
        self.current_path = Some(path.clone());
        Ok(path)
    }

    pub fn save_to_path(&mut self, path: &Path) -> Result<(), CodexError> {
        let world = self
            .current
            .as_ref()
            .ok_or_else(|| CodexError::Storage("no world loaded".into()))?;
        self.storage.save_to_path(world, path)?;
        self.current_path = Some(path.to_path_buf());
        self.current_name = None;
        Ok(())
    }

    pub fn backup(&self, note: Option<&str>) -> Result<PathBuf, CodexError> {
        let name = self
            .current_name
            .as_deref()
            .ok_or_else(|| CodexError::Storage("current world is unnamed".into()))?;
        let world = self
            .current
            .as_ref()
            .ok_or_else(|| CodexError::Storage("no world loaded".into()))?;
        self.storage.backup(world, name, note)
    }

    pub fn list_backups(&self, name: &str) -> Result<Vec<String>, CodexError> {
        self.storage.list_backups(name)
    }

    pub fn restore_backup(&mut self, name: &str, backup_name: &str) -> Result<LoadMetadata, CodexError> {
        let world = self.storage.restore(name, backup_name)?;
        self.ensure_schema_support(world.schema_version)?;
        let path = self.storage.world_path(name);
        self.apply_load(world, path, Some(name.to_string()))
    }

    pub fn list_worlds(&self) -> Result<Vec<String>, CodexError> {
        self.storage.list_worlds()
    }

    pub fn last_opened(&self) -> Result<Option<String>, CodexError> {
        self.storage.last_world()
    }

    pub fn record_last_opened(&self, name: Option<&str>) -> Result<(), CodexError> {
        self.storage.record_last_world(name)
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn set_current(&mut self, world: World, path: Option<PathBuf>, name: Option<String>) {
        self.current = Some(world);
        self.current_path = path;
        self.current_name = name;
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.current_name = None;
        self.current_path = None;
    }

    fn ensure_schema_support(&self, schema_version: u8) -> Result<(), CodexError> {
        if schema_version > CURRENT_SCHEMA_VERSION {
            return Err(CodexError::Storage(format!(
                "world schema v{} is newer than supported v{}",
                schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        Ok(())
    }

    fn apply_load(
        &mut self,
        world: World,
        path: PathBuf,
        name: Option<String>,
    ) -> Result<LoadMetadata, CodexError> {
        let warnings = world_warnings(&world);
        let schema_version = world.schema_version;
        tracing::info!(world = %world.name, ?path, "world loaded");
        self.current = Some(world);
        self.current_path = Some(path.clone());
        self.current_name = name.clone();
        Ok(LoadMetadata {
            warnings,
            path,
            name,
            schema_version,
        })
    }
}
