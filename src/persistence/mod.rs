pub mod storage;

use crate::config::Config;
use crate::creature::parameter::ParameterKind;
use crate::creature::Creature;
use crate::error::SimError;
use crate::species::{Maturity, SpeciesCatalog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk form of a creature: identity plus its latest parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub timestamp: DateTime<Utc>,
    pub species: String,
    pub name: String,
    pub age: u64,
    pub maturity: Maturity,
    #[serde(default)]
    pub stage_age: u64,
    pub params: BTreeMap<ParameterKind, f64>,
}

impl PersistedRecord {
    /// Real hours between the save and `now`. Clock skew counts as zero.
    pub fn elapsed_hours(&self, now: DateTime<Utc>) -> f64 {
        let millis = (now - self.timestamp).num_milliseconds().max(0);
        millis as f64 / 3_600_000.0
    }
}

/// Writes the record, copying any previous save to a timestamped backup first.
pub fn save_record(record: &PersistedRecord, config: &Config) -> Result<PathBuf, SimError> {
    let path = Path::new(&config.persistence.save_path);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }

    // The previous save stays in place until the new one is fully on disk.
    let json = serde_json::to_string_pretty(record)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;

    if path.exists() && config.persistence.keep_backups > 0 {
        let backup = storage::create_backup_path(path, Utc::now());
        fs::copy(path, &backup)?;
        storage::cleanup_old_backups(path, config.persistence.keep_backups)?;
    }

    fs::rename(&tmp, path)?;

    Ok(path.to_path_buf())
}

/// Reads the save file. A file that does not parse is moved aside and reported as
/// [`SimError::CorruptPersistedState`] so the caller can start over.
pub fn load_record(config: &Config) -> Result<Option<PersistedRecord>, SimError> {
    let path = Path::new(&config.persistence.save_path);
    if !path.exists() {
        log::info!("No saved creature found at {:?}", path);
        return Ok(None);
    }

    log::info!("Loading creature from: {:?}", path);
    let content = fs::read(path)?;

    match serde_json::from_slice::<PersistedRecord>(&content) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            log::error!("Failed to parse save file: {}. Moving it aside.", e);

            let quarantine = storage::create_quarantine_path(path, Utc::now());
            if let Err(rename_err) = fs::rename(path, &quarantine) {
                log::error!("Failed to move corrupt save file: {}", rename_err);
            } else {
                log::info!("Corrupt save moved to: {}", quarantine.display());
            }

            Err(SimError::CorruptPersistedState(e.to_string()))
        }
    }
}

/// Rebuilds the creature a record describes, catching up on the time since it was saved.
pub fn restore(
    record: &PersistedRecord,
    catalog: &SpeciesCatalog,
    now: DateTime<Utc>,
    config: &Config,
) -> Result<Creature, SimError> {
    let species = catalog.get(&record.species).map_err(|e| SimError::CorruptPersistedState(e.to_string()))?;
    Creature::from_persisted_record(
        record,
        species,
        record.elapsed_hours(now),
        config.simulation.game_days_per_real_hour,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.persistence.save_path = dir.join("creature.save").to_string_lossy().to_string();
        config.persistence.keep_backups = 2;
        config
    }

    #[test]
    fn test_save_and_load_record() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let catalog = SpeciesCatalog::builtin();
        let creature = Creature::new(catalog.get("dog").unwrap(), "Rex").unwrap();
        let record = creature.to_persisted_record(Utc::now());

        let path = save_record(&record, &config).unwrap();
        assert!(path.exists());

        let loaded = load_record(&config).unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_record_json_shape() {
        let catalog = SpeciesCatalog::builtin();
        let creature = Creature::new(catalog.get("cat").unwrap(), "Whiskers").unwrap();
        let json = serde_json::to_value(creature.to_persisted_record(Utc::now())).unwrap();

        assert_eq!(json["species"], "cat");
        assert_eq!(json["maturity"], "cub");
        assert_eq!(json["params"]["Satiety"], 5.0);
        assert_eq!(json["params"]["Health"], 10.0);
    }

    #[test]
    fn test_missing_save_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        assert!(load_record(&config).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_save_is_quarantined() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::write(&config.persistence.save_path, "{ not json").unwrap();

        let err = load_record(&config).unwrap_err();
        assert!(matches!(err, SimError::CorruptPersistedState(_)));
        assert!(!Path::new(&config.persistence.save_path).exists());
        assert!(load_record(&config).unwrap().is_none());
    }

    #[test]
    fn test_invalid_utf8_save_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::write(&config.persistence.save_path, [0xff, 0xfe, 0x00, b'{']).unwrap();

        assert!(matches!(
            load_record(&config),
            Err(SimError::CorruptPersistedState(_))
        ));
        assert!(!Path::new(&config.persistence.save_path).exists());
    }

    #[test]
    fn test_failed_save_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let catalog = SpeciesCatalog::builtin();
        let creature = Creature::new(catalog.get("cat").unwrap(), "Whiskers").unwrap();
        let first = creature.to_persisted_record(Utc::now());
        save_record(&first, &config).unwrap();

        // A directory where the temp file should go makes the write fail.
        let tmp = Path::new(&config.persistence.save_path).with_extension("tmp");
        fs::create_dir(&tmp).unwrap();
        let mut older = creature.clone();
        older.advance(3);
        assert!(save_record(&older.to_persisted_record(Utc::now()), &config).is_err());

        let loaded = load_record(&config).unwrap().unwrap();
        assert_eq!(loaded, first);
    }

    #[test]
    fn test_non_numeric_param_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let json = r#"{"timestamp": "2024-01-01T00:00:00Z", "species": "cat", "name": "x",
            "age": 1, "maturity": "cub", "params": {"Health": "full", "Satiety": 3}}"#;
        fs::write(&config.persistence.save_path, json).unwrap();

        assert!(matches!(
            load_record(&config),
            Err(SimError::CorruptPersistedState(_))
        ));
    }

    #[test]
    fn test_saves_rotate_backups() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let catalog = SpeciesCatalog::builtin();
        let creature = Creature::new(catalog.get("mouse").unwrap(), "Pip").unwrap();

        for _ in 0..5 {
            save_record(&creature.to_persisted_record(Utc::now()), &config).unwrap();
        }

        let backups = storage::list_backups(Path::new(&config.persistence.save_path));
        assert!(backups.len() <= 2);
        assert!(Path::new(&config.persistence.save_path).exists());
    }

    #[test]
    fn test_restore_catches_up() {
        let config = Config::default();
        let catalog = SpeciesCatalog::builtin();
        let creature = Creature::new(catalog.get("cat").unwrap(), "Whiskers").unwrap();
        let saved_at = Utc::now();
        let record = creature.to_persisted_record(saved_at);

        let restored = restore(&record, &catalog, saved_at + Duration::hours(4), &config).unwrap();
        assert_eq!(restored.age(), 2);
        assert_eq!(restored.parameter(ParameterKind::Satiety).unwrap().value(), 3.0);
    }

    #[test]
    fn test_restore_unknown_species_is_corrupt() {
        let config = Config::default();
        let catalog = SpeciesCatalog::builtin();
        let creature = Creature::new(catalog.get("cat").unwrap(), "Whiskers").unwrap();
        let mut record = creature.to_persisted_record(Utc::now());
        record.species = "griffin".to_string();

        assert!(matches!(
            restore(&record, &catalog, Utc::now(), &config),
            Err(SimError::CorruptPersistedState(_))
        ));
    }
}
