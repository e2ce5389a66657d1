//! [`ConfigStore`] – reads/writes the operator-edited `settings.yaml`.
//!
//! The store owns both the authoritative in-memory [`WorldState`] and the
//! on-disk copy.  Mutations (`apply_object_pose`, `apply_zone`, `reload`)
//! are serialized under a single write lock; readers only ever see a
//! complete snapshot, never a half-applied one.  Writes go through a
//! temp-file-then-rename so a crash mid-write cannot corrupt the file.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use gantry_types::{GantryError, ObjectRecord, Pose, WorldState, Zone};
use parking_lot::RwLock;
use tracing::{debug, info};

/// Owner of the world model.  Create one per process with
/// [`ConfigStore::load`] and share it behind an `Arc`.
///
/// # Example
///
/// ```rust,no_run
/// use gantry_store::ConfigStore;
/// use gantry_types::Pose;
///
/// let store = ConfigStore::load("deployment/config/settings.yaml").unwrap();
/// let snapshot = store.snapshot();
/// store
///     .apply_object_pose("yellow_cube", Pose::new(0.10, 0.20, 0.05))
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    state: RwLock<WorldState>,
}

impl ConfigStore {
    /// Load and validate the settings file at `path`.
    ///
    /// # Errors
    ///
    /// [`GantryError::ConfigLoad`] when the file is missing, is not valid
    /// YAML for the expected schema, or fails
    /// [`WorldState::validate`] (bad thresholds, non-positive tolerances,
    /// inverted workspace extents).
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, GantryError> {
        let path = path.into();
        let state = read_world(&path)?;
        info!(
            path = %path.display(),
            zones = state.zones.len(),
            objects = state.objects.len(),
            "world model loaded"
        );
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Path of the backing settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// An immutable copy of the current world state.  Never exposes the
    /// internal lock-guarded value, so callers cannot observe a torn read.
    pub fn snapshot(&self) -> WorldState {
        self.state.read().clone()
    }

    /// Set `object_id`'s pose, persist the full world state, and return the
    /// new snapshot.
    ///
    /// The in-memory update and the file write happen under one exclusive
    /// section.  If the write fails the in-memory state is rolled back to
    /// its pre-mutation value and [`GantryError::Persistence`] is returned –
    /// there is no partial success.
    pub fn apply_object_pose(
        &self,
        object_id: &str,
        pose: Pose,
    ) -> Result<WorldState, GantryError> {
        let mut state = self.state.write();
        let previous = state.objects.get(object_id).cloned();
        state
            .objects
            .entry(object_id.to_string())
            .or_insert_with(ObjectRecord::default)
            .pose = Some(pose);

        if let Err(e) = persist(&self.path, &state) {
            match previous {
                Some(record) => {
                    state.objects.insert(object_id.to_string(), record);
                }
                None => {
                    state.objects.remove(object_id);
                }
            }
            return Err(e);
        }
        debug!(object_id, "object pose persisted");
        Ok(state.clone())
    }

    /// Operator upsert of a zone definition.  Same exclusive-section and
    /// rollback discipline as [`apply_object_pose`][Self::apply_object_pose].
    ///
    /// # Errors
    ///
    /// [`GantryError::ConfigLoad`] for a non-positive tolerance,
    /// [`GantryError::Persistence`] when the write fails.
    pub fn apply_zone(&self, key: &str, zone: Zone) -> Result<WorldState, GantryError> {
        if zone.tolerance_m <= 0.0 {
            return Err(GantryError::ConfigLoad(format!(
                "zone '{key}' tolerance_m {} must be positive",
                zone.tolerance_m
            )));
        }
        let mut state = self.state.write();
        let previous = state.zones.insert(key.to_string(), zone);

        if let Err(e) = persist(&self.path, &state) {
            match previous {
                Some(zone) => {
                    state.zones.insert(key.to_string(), zone);
                }
                None => {
                    state.zones.remove(key);
                }
            }
            return Err(e);
        }
        debug!(key, "zone persisted");
        Ok(state.clone())
    }

    /// Re-read the backing file after an external edit.  Fails exactly like
    /// [`load`][Self::load]; on failure the previous in-memory state is
    /// kept untouched.
    pub fn reload(&self) -> Result<WorldState, GantryError> {
        let fresh = read_world(&self.path)?;
        let mut state = self.state.write();
        *state = fresh.clone();
        info!(zones = fresh.zones.len(), objects = fresh.objects.len(), "world model reloaded");
        Ok(fresh)
    }
}

fn read_world(path: &Path) -> Result<WorldState, GantryError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| GantryError::ConfigLoad(format!("{}: {e}", path.display())))?;
    let state: WorldState = serde_yaml::from_str(&raw)
        .map_err(|e| GantryError::ConfigLoad(format!("{}: {e}", path.display())))?;
    state.validate()?;
    Ok(state)
}

/// Write the full document to a sibling temp file, then atomically rename it
/// over the settings file.  A crash mid-write leaves either the old file or
/// the new one, never a truncated hybrid.
fn persist(path: &Path, state: &WorldState) -> Result<(), GantryError> {
    let raw = serde_yaml::to_string(state)
        .map_err(|e| GantryError::Persistence(format!("serialize: {e}")))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| GantryError::Persistence(format!("temp file in {}: {e}", dir.display())))?;
    tmp.write_all(raw.as_bytes())
        .map_err(|e| GantryError::Persistence(format!("write: {e}")))?;
    tmp.persist(path)
        .map_err(|e| GantryError::Persistence(format!("replace {}: {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SETTINGS: &str = "\
safety:
  confidence_threshold: 0.6
  speed_scale: 0.5
  force_threshold_newton: 20.0
zones:
  \"1\":
    center_pose:
      x: 0.1
      y: 0.2
      z: 0.05
    tolerance_m: 0.02
objects:
  yellow_cube:
    pose:
      x: 0.35
      y: 0.15
      z: 0.05
workspace:
  bounds_m:
    x: [0.0, 1.0]
    y: [0.0, 0.6]
llm:
  provider: openai
  model: gpt-4o-mini
";

    fn settings_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("settings.yaml");
        fs::write(&path, SETTINGS).expect("write settings");
        path
    }

    #[test]
    fn load_reads_valid_settings() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(settings_file(&dir)).unwrap();
        let world = store.snapshot();
        assert_eq!(world.zones.len(), 1);
        assert!((world.zones["1"].tolerance_m - 0.02).abs() < f64::EPSILON);
        assert_eq!(world.llm.as_ref().unwrap().provider, "openai");
    }

    #[test]
    fn load_missing_file_is_config_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigStore::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, GantryError::ConfigLoad(_)));
    }

    #[test]
    fn load_malformed_yaml_is_config_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "safety: [not, a, map\n").unwrap();
        assert!(matches!(
            ConfigStore::load(&path),
            Err(GantryError::ConfigLoad(_))
        ));
    }

    #[test]
    fn load_rejects_schema_violation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(
            &path,
            SETTINGS.replace("speed_scale: 0.5", "speed_scale: 1.5"),
        )
        .unwrap();
        assert!(ConfigStore::load(&path).is_err());
    }

    #[test]
    fn apply_object_pose_persists_and_reloads_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = settings_file(&dir);
        let store = ConfigStore::load(&path).unwrap();

        let pose = Pose::new(0.10, 0.20, 0.05);
        let world = store.apply_object_pose("yellow_cube", pose).unwrap();
        assert_eq!(world.objects["yellow_cube"].pose, Some(pose));

        // A fresh load from disk must see the exact same values.
        let fresh = ConfigStore::load(&path).unwrap().snapshot();
        assert_eq!(fresh.objects["yellow_cube"].pose, Some(pose));
        assert_eq!(fresh, world);
    }

    #[test]
    fn apply_object_pose_creates_new_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(settings_file(&dir)).unwrap();
        let world = store
            .apply_object_pose("red_cube", Pose::new(0.5, 0.5, 0.05))
            .unwrap();
        assert!(world.objects.contains_key("red_cube"));
    }

    #[test]
    fn failed_persist_rolls_back_in_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = settings_file(&dir);
        let store = ConfigStore::load(&path).unwrap();
        let before = store.snapshot();

        // Make the write fail: replace the settings file with a directory
        // so the temp-file rename cannot succeed.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let err = store
            .apply_object_pose("yellow_cube", Pose::new(0.9, 0.9, 0.1))
            .unwrap_err();
        assert!(matches!(err, GantryError::Persistence(_)));
        // No partial success: memory matches the pre-mutation snapshot.
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn apply_zone_upserts_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = settings_file(&dir);
        let store = ConfigStore::load(&path).unwrap();

        let zone = Zone {
            center_pose: Pose::new(0.7, 0.3, 0.05),
            tolerance_m: 0.04,
        };
        store.apply_zone("2", zone.clone()).unwrap();

        let fresh = ConfigStore::load(&path).unwrap().snapshot();
        assert_eq!(fresh.zones["2"], zone);
    }

    #[test]
    fn apply_zone_rejects_non_positive_tolerance() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(settings_file(&dir)).unwrap();
        let err = store
            .apply_zone(
                "2",
                Zone {
                    center_pose: Pose::new(0.0, 0.0, 0.0),
                    tolerance_m: 0.0,
                },
            )
            .unwrap_err();
        assert!(matches!(err, GantryError::ConfigLoad(_)));
        assert!(!store.snapshot().zones.contains_key("2"));
    }

    #[test]
    fn reload_picks_up_external_edit() {
        let dir = tempfile::tempdir().unwrap();
        let path = settings_file(&dir);
        let store = ConfigStore::load(&path).unwrap();

        fs::write(&path, SETTINGS.replace("tolerance_m: 0.02", "tolerance_m: 0.05")).unwrap();
        let world = store.reload().unwrap();
        assert!((world.zones["1"].tolerance_m - 0.05).abs() < f64::EPSILON);
        assert_eq!(store.snapshot(), world);
    }

    #[test]
    fn reload_failure_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = settings_file(&dir);
        let store = ConfigStore::load(&path).unwrap();
        let before = store.snapshot();

        fs::write(&path, "safety: {broken").unwrap();
        assert!(store.reload().is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn snapshot_is_detached_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(settings_file(&dir)).unwrap();
        let mut snapshot = store.snapshot();
        snapshot.zones.clear();
        // Mutating the snapshot must not affect the store.
        assert_eq!(store.snapshot().zones.len(), 1);
    }

    #[test]
    fn persisted_file_round_trips_byte_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = settings_file(&dir);
        let store = ConfigStore::load(&path).unwrap();
        store
            .apply_object_pose("yellow_cube", Pose::new(0.1, 0.2, 0.05))
            .unwrap();

        let first = fs::read_to_string(&path).unwrap();
        // Loading and re-persisting the same state writes the same bytes.
        let again = ConfigStore::load(&path).unwrap();
        again
            .apply_object_pose("yellow_cube", Pose::new(0.1, 0.2, 0.05))
            .unwrap();
        let second = fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
    }
}
