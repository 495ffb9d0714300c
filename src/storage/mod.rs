pub mod json_backend;

use std::path::{Path, PathBuf};

use crate::{domain::world::World, errors::CodexError};

pub type Result<T> = std::result::Result<T, CodexError>;

/// Abstraction over persistence backends capable of storing worlds and
/// snapshots. The category store itself never fetches data: its owner loads
/// the collection through one of these and hands it in.
pub trait StorageBackend: Send + Sync {
    fn save(&self, world: &World, name: &str) -> Result<PathBuf>;
    fn load(&self, name: &str) -> Result<World>;
    fn list_worlds(&self) -> Result<Vec<String>>;
    fn world_path(&self, name: &str) -> PathBuf;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn backup(&self, world: &World, name: &str, note: Option<&str>) -> Result<PathBuf>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<World>;
    fn last_world(&self) -> Result<Option<String>>;
    fn record_last_world(&self, name: Option<&str>) -> Result<()>;

    /// Optional helpers for ad-hoc file operations. Default implementations
    /// forward to the shared path-based readers/writers.
    fn save_to_path(&self, world: &World, path: &Path) -> Result<()> {
        json_backend::save_world_to_path(world, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<World> {
        json_backend::load_world_from_path(path)
    }
}

pub use json_backend::{world_warnings, JsonStorage};
