//! Plan persistence.
//!
//! Plans live in a key-value map keyed by plan id. The [`PlanStore`] trait
//! supplies the load/list/save/create/delete contract on top of two raw
//! operations; storage failures degrade to "nothing stored" instead of
//! reaching the caller.

use crate::fileio;
use crate::workout::{calculate_total_time, count_intervals};
use crate::{Error, PlanDraft, Result, WorkoutPlan};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub type PlanMap = BTreeMap<String, WorkoutPlan>;

/// Storage for workout plans
pub trait PlanStore {
    /// Read every stored plan
    fn read_all(&self) -> Result<PlanMap>;

    /// Replace the stored plans
    fn write_all(&mut self, plans: &PlanMap) -> Result<()>;

    /// Look up a plan; `None` when missing or unreadable
    fn load_plan(&self, id: &str) -> Option<WorkoutPlan> {
        self.read_or_empty().remove(id)
    }

    /// All plans, most recently updated first
    fn list_plans(&self) -> Vec<WorkoutPlan> {
        let mut plans: Vec<_> = self.read_or_empty().into_values().collect();
        plans.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        plans
    }

    /// Validate, refresh `updated_at` and persist a plan
    ///
    /// Only validation failures are returned; write failures are logged.
    fn save_plan(&mut self, plan: &mut WorkoutPlan) -> Result<()> {
        plan.validate()?;
        plan.touch();

        let mut plans = self.read_or_empty();
        plans.insert(plan.id.clone(), plan.clone());
        if let Err(e) = self.write_all(&plans) {
            tracing::warn!("Failed to save plan {}: {}", plan.id, e);
            return Ok(());
        }
        tracing::info!("Saved plan {} ({})", plan.id, plan.name);
        Ok(())
    }

    /// Create and persist a plan with a fresh id and timestamps
    fn create_plan(&mut self, draft: PlanDraft) -> Result<WorkoutPlan> {
        let mut plan = WorkoutPlan::from_draft(draft);
        self.save_plan(&mut plan)?;
        Ok(plan)
    }

    /// Delete a plan, returning whether it existed and was removed
    fn delete_plan(&mut self, id: &str) -> bool {
        let mut plans = self.read_or_empty();
        if plans.remove(id).is_none() {
            return false;
        }
        match self.write_all(&plans) {
            Ok(()) => {
                tracing::info!("Deleted plan {}", id);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to delete plan {}: {}", id, e);
                false
            }
        }
    }

    #[doc(hidden)]
    fn read_or_empty(&self) -> PlanMap {
        self.read_all().unwrap_or_else(|e| {
            tracing::warn!("Unable to read plans: {}. Treating store as empty.", e);
            PlanMap::new()
        })
    }
}

/// Derived fields shown when listing plans
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PlanSummary {
    pub id: String,
    pub name: String,
    pub total_time: u32,
    pub interval_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&WorkoutPlan> for PlanSummary {
    fn from(plan: &WorkoutPlan) -> Self {
        Self {
            id: plan.id.clone(),
            name: plan.name.clone(),
            total_time: calculate_total_time(plan),
            interval_count: count_intervals(plan),
            updated_at: plan.updated_at,
        }
    }
}

/// Plans kept in memory only
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    plans: PlanMap,
}

impl PlanStore for MemoryStore {
    fn read_all(&self) -> Result<PlanMap> {
        Ok(self.plans.clone())
    }

    fn write_all(&mut self, plans: &PlanMap) -> Result<()> {
        self.plans = plans.clone();
        Ok(())
    }
}

/// Plans kept in a single JSON file with file locking
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `plans.json` inside a data directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("plans.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanStore for JsonFileStore {
    fn read_all(&self) -> Result<PlanMap> {
        let Some(contents) = fileio::read_shared(&self.path)? else {
            tracing::debug!("No plan file at {:?}", self.path);
            return Ok(PlanMap::new());
        };

        let plans: PlanMap = serde_json::from_str(&contents)
            .map_err(|e| Error::Storage(format!("corrupt plan file {:?}: {}", self.path, e)))?;
        tracing::debug!("Loaded {} plans from {:?}", plans.len(), self.path);
        Ok(plans)
    }

    fn write_all(&mut self, plans: &PlanMap) -> Result<()> {
        let contents = serde_json::to_vec_pretty(plans)?;
        fileio::replace_atomically(&self.path, &contents)?;
        tracing::debug!("Wrote {} plans to {:?}", plans.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::tests::{rest, run, set};

    fn draft(name: &str) -> PlanDraft {
        PlanDraft {
            name: name.into(),
            description: "test".into(),
            warmup_time: 60,
            cooldown_time: 60,
            items: vec![set(2, vec![run(30), rest(15)])],
        }
    }

    #[test]
    fn test_create_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::in_dir(temp_dir.path());

        let created = store.create_plan(draft("Intervals")).unwrap();
        let loaded = store.load_plan(&created.id).unwrap();

        assert_eq!(loaded, created);
        assert_eq!(PlanSummary::from(&loaded).total_time, 210);
        assert_eq!(PlanSummary::from(&loaded).interval_count, 6);
    }

    #[test]
    fn test_missing_plan_is_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());
        assert!(store.load_plan("nope").is_none());
        assert!(store.list_plans().is_empty());
    }

    #[test]
    fn test_validation_blocks_persistence() {
        let mut store = MemoryStore::default();

        let mut bad = draft("");
        assert!(matches!(store.create_plan(bad.clone()), Err(Error::Validation(_))));
        bad.name = "Named".into();
        bad.items.clear();
        assert!(matches!(store.create_plan(bad), Err(Error::Validation(_))));

        assert!(store.list_plans().is_empty());
    }

    #[test]
    fn test_save_refreshes_updated_at_and_lists_newest_first() {
        let mut store = MemoryStore::default();
        let mut first = store.create_plan(draft("First")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.create_plan(draft("Second")).unwrap();

        let stamp = first.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(5));
        first.description = "edited".into();
        store.save_plan(&mut first).unwrap();
        assert!(first.updated_at > stamp);

        let names: Vec<String> = store.list_plans().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_delete() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::in_dir(temp_dir.path());
        let plan = store.create_plan(draft("Doomed")).unwrap();

        assert!(store.delete_plan(&plan.id));
        assert!(!store.delete_plan(&plan.id));
        assert!(store.load_plan(&plan.id).is_none());
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());
        std::fs::write(store.path(), "{ invalid json }").unwrap();

        assert!(matches!(store.read_all(), Err(Error::Storage(_))));
        assert!(store.list_plans().is_empty());
        assert!(store.load_plan("anything").is_none());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::in_dir(temp_dir.path());
        store.create_plan(draft("One")).unwrap();
        store.create_plan(draft("Two")).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "plans.json")
            .collect();
        assert!(extras.is_empty(), "unexpected files: {:?}", extras);
        assert_eq!(store.list_plans().len(), 2);
    }

    #[test]
    fn test_unwritable_store_degrades_silently() {
        let temp_dir = tempfile::tempdir().unwrap();
        // a directory where the plan file should be makes every write fail
        let path = temp_dir.path().join("plans.json");
        std::fs::create_dir_all(&path).unwrap();
        let mut store = JsonFileStore::new(&path);

        let created = store.create_plan(draft("Lost"));
        assert!(created.is_ok());
        assert!(store.list_plans().is_empty());
    }
}
