use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{self, ensure_dir},
    domain::world::World,
    errors::CodexError,
};

use super::{Result, StorageBackend};

const WORLD_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

#[derive(Clone)]
pub struct JsonStorage {
    worlds_dir: PathBuf,
    backups_dir: PathBuf,
    state_file: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = root.unwrap_or_else(utils::app_data_dir);
        ensure_dir(&app_root)?;
        let worlds_dir = utils::worlds_dir_in(&app_root);
        let backups_dir = utils::backups_dir_in(&app_root);
        ensure_dir(&worlds_dir)?;
        ensure_dir(&backups_dir)?;
        let state_file = utils::state_file_in(&app_root);
        Ok(Self {
            worlds_dir,
            backups_dir,
            state_file,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    fn read_state(&self) -> Result<StoreState> {
        if self.state_file.exists() {
            let data = fs::read_to_string(&self.state_file)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(StoreState::default())
        }
    }

    fn write_backup_file(&self, world: &World, name: &str, note: Option<&str>) -> Result<PathBuf> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut file_stem = format!("{}_{}", canonical_name(name), timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            file_stem.push('_');
            file_stem.push_str(&label);
        }
        let path = dir.join(format!("{}.{}", file_stem, WORLD_EXTENSION));
        let json = serde_json::to_string_pretty(world)?;
        write_atomic(&path, &json)?;
        self.prune_backups(name)?;
        Ok(path)
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let backups = self.list_backups(name)?;
        if backups.len() <= self.retention {
            return Ok(());
        }
        for entry in backups.iter().skip(self.retention) {
            let path = self.backup_dir(name).join(entry);
            let _ = fs::remove_file(path);
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, world: &World, name: &str) -> Result<PathBuf> {
        let path = self.world_path(name);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(world)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        Ok(path)
    }

    fn load(&self, name: &str) -> Result<World> {
        let path = self.world_path(name);
        if !path.exists() {
            return Err(CodexError::Storage(format!("world `{}` not found", name)));
        }
        load_world_from_path(&path)
    }

    fn list_worlds(&self) -> Result<Vec<String>> {
        if !self.worlds_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.worlds_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(WORLD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn world_path(&self, name: &str) -> PathBuf {
        self.worlds_dir
            .join(format!("{}.{}", canonical_name(name), WORLD_EXTENSION))
    }

    fn list_backups(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(WORLD_EXTENSION) {
                continue;
            }
            let file_name = match path.file_name().and_then(|stem| stem.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            entries.push(file_name);
        }
        entries.sort_by(|a, b| parse_backup_timestamp(b).cmp(&parse_backup_timestamp(a)));
        Ok(entries)
    }

    fn backup(&self, world: &World, name: &str, note: Option<&str>) -> Result<PathBuf> {
        self.write_backup_file(world, name, note)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<World> {
        let backup_path = self.backup_dir(name).join(backup_name);
        if !backup_path.exists() {
            return Err(CodexError::Storage(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let target = self.world_path(name);
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        fs::copy(&backup_path, &target)?;
        load_world_from_path(&target)
    }

    fn last_world(&self) -> Result<Option<String>> {
        let state = self.read_state()?;
        Ok(state.last_world)
    }

    fn record_last_world(&self, name: Option<&str>) -> Result<()> {
        let mut state = self.read_state()?;
        state.last_world = name.map(canonical_name);
        let data = serde_json::to_string_pretty(&state)?;
        write_atomic(&self.state_file, &data)?;
        Ok(())
    }
}

pub fn save_world_to_path(world: &World, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(world)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_world_from_path(path: &Path) -> Result<World> {
    let data = fs::read_to_string(path)?;
    let world: World = serde_json::from_str(&data)?;
    Ok(world)
}

/// Load-time integrity report. Dangling parent references are warnings, not
/// errors: the store tolerates orphans by design and keeps them editable.
pub fn world_warnings(world: &World) -> Vec<String> {
    let ids: HashSet<&str> = world
        .categories
        .iter()
        .map(|category| category.id.as_str())
        .collect();
    let mut warnings = Vec::new();

    if ids.len() != world.categories.len() {
        let mut seen = HashSet::new();
        for category in &world.categories {
            if !seen.insert(category.id.as_str()) {
                warnings.push(format!("duplicate category id `{}`", category.id));
            }
        }
    }

    for category in &world.categories {
        if let Some(parent) = category.parent_ref() {
            if !ids.contains(parent) {
                warnings.push(format!(
                    "category `{}` references unknown parent `{}`",
                    category.id, parent
                ));
            }
        }
    }
    warnings
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    last_world: Option<String>,
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "world".into()
    } else {
        sanitized
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if ch.is_whitespace() || matches!(ch, '-' | '.') {
            if !sanitized.is_empty() && !last_dash {
                sanitized.push('-');
                last_dash = true;
            }
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = name.split('_').collect();
    if parts.len() < 3 {
        return None;
    }
    let date_part = parts.get(parts.len() - 2)?;
    let time_part = parts.last()?;
    if !is_digits(date_part, 8) || !time_part.ends_with(".json") {
        return None;
    }
    let time_digits = &time_part[..time_part.len() - 5];
    if !is_digits(time_digits, 4) {
        return None;
    }
    let raw = format!("{}{}", date_part, time_digits);
    NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::Category;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage =
            JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).expect("json storage");
        (storage, temp)
    }

    fn sample_world() -> World {
        let mut world = World::new("Aldmere");
        world.add_category(Category::new("Regions"));
        world
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir();
        let world = sample_world();
        storage.save(&world, "aldmere").expect("save world");
        let loaded = storage.load("aldmere").expect("load world");
        assert_eq!(loaded.name, "Aldmere");
        assert_eq!(loaded.category_count(), 1);
    }

    #[test]
    fn backup_writes_timestamped_files() {
        let (storage, _guard) = storage_with_temp_dir();
        let world = sample_world();
        storage.save(&world, "aldmere").expect("save world");
        storage
            .backup(&world, "aldmere", Some("pre edit"))
            .expect("create backup");
        let backups = storage.list_backups("aldmere").expect("list backups");
        assert!(
            !backups.is_empty(),
            "expected at least one backup file to be created"
        );
        assert!(backups[0].contains("pre-edit"));
    }

    #[test]
    fn list_worlds_reports_saved_names() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.save(&sample_world(), "aldmere").unwrap();
        storage.save(&sample_world(), "Vharen Reach").unwrap();
        let names = storage.list_worlds().unwrap();
        assert_eq!(names, ["aldmere", "vharen_reach"]);
    }

    #[test]
    fn warnings_flag_dangling_parents() {
        let mut world = World::new("Test");
        let mut lost = Category::new("Lost");
        lost.parent_id = Some("cat-gone".into());
        world.add_category(lost);
        let warnings = world_warnings(&world);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("unknown parent"));
    }

    #[test]
    fn record_last_world_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir();
        assert_eq!(storage.last_world().unwrap(), None);
        storage.record_last_world(Some("Aldmere")).unwrap();
        assert_eq!(storage.last_world().unwrap().as_deref(), Some("aldmere"));
    }
}
