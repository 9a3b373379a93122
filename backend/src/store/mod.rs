//! Deployment store: durable per-distributor lifecycle records.
//!
//! One JSON file per deployment under the store directory, loaded into an
//! in-memory map at startup, with a secondary index from internal release
//! id to deployment ids so "all deployments for this release" never scans.
//!
//! The whole store sits behind one mutex; concurrent fan-out tasks upsert
//! distinct keys but share the map and the index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

use crate::api::logs::log_warning;
use crate::error::StoreResult;
use crate::models::{
    DeploymentFilter, DistributorId, ReleaseDeployment, ReleaseStatus, ValidationIssue,
};

/// Directory where deployments are stored (relative to current dir).
const DEFAULT_STORE_DIR: &str = ".songcast/deployments";

/// Optional fields applied together with a status transition.
#[derive(Debug, Clone, Default)]
pub struct StatusDetails {
    pub external_id: Option<String>,
    pub errors: Option<Vec<ValidationIssue>>,
    pub tracking_link: Option<String>,
}

#[derive(Default)]
struct State {
    deployments: HashMap<String, ReleaseDeployment>,
    by_release: HashMap<String, Vec<String>>,
}

/// Durable keyed map of deployment id to [`ReleaseDeployment`].
pub struct DeploymentStore {
    store_dir: PathBuf,
    state: Mutex<State>,
}

impl DeploymentStore {
    /// Store in the default dot-directory.
    pub fn new() -> Self {
        Self::with_dir(DEFAULT_STORE_DIR)
    }

    /// Store in a custom directory, loading existing records from disk.
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        let store = Self {
            store_dir: PathBuf::from(dir.as_ref()),
            state: Mutex::new(State::default()),
        };
        store.load_all();
        store
    }

    fn load_all(&self) {
        if !self.store_dir.exists() {
            return;
        }
        let entries = match std::fs::read_dir(&self.store_dir) {
            Ok(e) => e,
            Err(_) => return,
        };

        let mut state = self.state.lock().expect("store mutex poisoned");
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Ok(content) = std::fs::read_to_string(&path) {
                    if let Ok(deployment) = serde_json::from_str::<ReleaseDeployment>(&content) {
                        index_deployment(&mut state, &deployment);
                        state.deployments.insert(deployment.id.clone(), deployment);
                    }
                }
            }
        }
    }

    /// Upsert a deployment record and keep the release index current.
    pub fn save(&self, deployment: &ReleaseDeployment) -> StoreResult<()> {
        std::fs::create_dir_all(&self.store_dir)?;
        let path = self.store_dir.join(format!("{}.json", deployment.id));
        let content = serde_json::to_string_pretty(deployment)?;
        std::fs::write(&path, content)?;

        let mut state = self.state.lock().expect("store mutex poisoned");
        index_deployment(&mut state, deployment);
        state
            .deployments
            .insert(deployment.id.clone(), deployment.clone());
        Ok(())
    }

    /// Create and persist a new deployment record for one submission.
    pub fn create(
        &self,
        internal_release_id: &str,
        distributor_id: DistributorId,
        status: ReleaseStatus,
        title: Option<String>,
        artist: Option<String>,
    ) -> StoreResult<ReleaseDeployment> {
        let mut deployment = ReleaseDeployment::new(internal_release_id, distributor_id, status);
        deployment.title = title;
        deployment.artist = artist;
        self.save(&deployment)?;
        Ok(deployment)
    }

    /// Transition a deployment's status and re-save it.
    ///
    /// Unknown ids return `Ok(None)`, never an error. Deployments already in
    /// a terminal status are returned unchanged; leaving a terminal state
    /// means creating a new deployment row.
    pub fn update_status(
        &self,
        deployment_id: &str,
        status: ReleaseStatus,
        details: StatusDetails,
    ) -> StoreResult<Option<ReleaseDeployment>> {
        let current = match self.get(deployment_id) {
            Some(d) => d,
            None => return Ok(None),
        };

        if current.status.is_terminal() {
            if current.status != status {
                log_warning(format!(
                    "Deployment {} is terminal ({:?}), ignoring transition to {:?}",
                    deployment_id, current.status, status
                ));
            }
            return Ok(Some(current));
        }

        let mut deployment = current;
        let now = Utc::now().to_rfc3339();
        deployment.status = status;
        deployment.last_updated_at = now.clone();
        deployment.last_checked_at = now;
        if let Some(external_id) = details.external_id {
            deployment.external_id = Some(external_id);
        }
        if let Some(errors) = details.errors {
            deployment.errors = errors;
        }
        if let Some(link) = details.tracking_link {
            deployment.tracking_link = Some(link);
        }

        self.save(&deployment)?;
        Ok(Some(deployment))
    }

    /// Fetch one deployment by id.
    pub fn get(&self, deployment_id: &str) -> Option<ReleaseDeployment> {
        let state = self.state.lock().expect("store mutex poisoned");
        state.deployments.get(deployment_id).cloned()
    }

    /// All deployments of one internal release, via the secondary index.
    pub fn for_release(&self, internal_release_id: &str) -> Vec<ReleaseDeployment> {
        let state = self.state.lock().expect("store mutex poisoned");
        state
            .by_release
            .get(internal_release_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.deployments.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All deployments, optionally filtered, ordered by submission time.
    pub fn all(&self, filter: Option<&DeploymentFilter>) -> Vec<ReleaseDeployment> {
        let state = self.state.lock().expect("store mutex poisoned");
        let mut deployments: Vec<ReleaseDeployment> = state
            .deployments
            .values()
            .filter(|d| filter.map(|f| f.matches(d)).unwrap_or(true))
            .cloned()
            .collect();
        deployments.sort_by(|a, b| {
            a.submitted_at
                .cmp(&b.submitted_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        deployments
    }

    /// Explicit store reset; the only way deployment rows are ever deleted.
    pub fn clear(&self) -> StoreResult<()> {
        let mut state = self.state.lock().expect("store mutex poisoned");
        for id in state.deployments.keys() {
            let path = self.store_dir.join(format!("{}.json", id));
            let _ = std::fs::remove_file(path);
        }
        state.deployments.clear();
        state.by_release.clear();
        Ok(())
    }
}

impl Default for DeploymentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn index_deployment(state: &mut State, deployment: &ReleaseDeployment) {
    let ids = state
        .by_release
        .entry(deployment.internal_release_id.clone())
        .or_default();
    if !ids.contains(&deployment.id) {
        ids.push(deployment.id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_and_get() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::with_dir(dir.path());

        let deployment = store
            .create(
                "rel-1",
                DistributorId::Tunecore,
                ReleaseStatus::Validating,
                Some("Title".into()),
                Some("Artist".into()),
            )
            .unwrap();

        let fetched = store.get(&deployment.id).unwrap();
        assert_eq!(fetched.internal_release_id, "rel-1");
        assert_eq!(fetched.status, ReleaseStatus::Validating);
        assert_eq!(fetched.title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_release_index_serves_queries() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::with_dir(dir.path());

        store
            .create("rel-1", DistributorId::Tunecore, ReleaseStatus::Validating, None, None)
            .unwrap();
        store
            .create("rel-1", DistributorId::Cdbaby, ReleaseStatus::Validating, None, None)
            .unwrap();
        store
            .create("rel-2", DistributorId::Tunecore, ReleaseStatus::Validating, None, None)
            .unwrap();

        assert_eq!(store.for_release("rel-1").len(), 2);
        assert_eq!(store.for_release("rel-2").len(), 1);
        assert!(store.for_release("rel-3").is_empty());
    }

    #[test]
    fn test_update_status_unknown_id_is_none() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::with_dir(dir.path());
        let result = store
            .update_status("no-such-id", ReleaseStatus::Live, StatusDetails::default())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_terminal_status_update_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::with_dir(dir.path());
        let deployment = store
            .create("rel-1", DistributorId::Tunecore, ReleaseStatus::Processing, None, None)
            .unwrap();

        let first = store
            .update_status(&deployment.id, ReleaseStatus::Failed, StatusDetails::default())
            .unwrap()
            .unwrap();
        let second = store
            .update_status(&deployment.id, ReleaseStatus::Failed, StatusDetails::default())
            .unwrap()
            .unwrap();

        // Same stored record, no duplicate history.
        assert_eq!(first.status, second.status);
        assert_eq!(first.last_updated_at, second.last_updated_at);
    }

    #[test]
    fn test_terminal_status_never_overwritten() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::with_dir(dir.path());
        let deployment = store
            .create("rel-1", DistributorId::Tunecore, ReleaseStatus::Processing, None, None)
            .unwrap();

        store
            .update_status(&deployment.id, ReleaseStatus::Rejected, StatusDetails::default())
            .unwrap();
        let after = store
            .update_status(&deployment.id, ReleaseStatus::Live, StatusDetails::default())
            .unwrap()
            .unwrap();

        assert_eq!(after.status, ReleaseStatus::Rejected);
    }

    #[test]
    fn test_update_applies_details() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::with_dir(dir.path());
        let deployment = store
            .create("rel-1", DistributorId::Cdbaby, ReleaseStatus::Processing, None, None)
            .unwrap();

        let updated = store
            .update_status(
                &deployment.id,
                ReleaseStatus::Delivered,
                StatusDetails {
                    external_id: Some("CDB-42".into()),
                    errors: None,
                    tracking_link: Some("https://members.cdbaby.com/releases/42".into()),
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.external_id.as_deref(), Some("CDB-42"));
        assert!(updated.tracking_link.is_some());
    }

    #[test]
    fn test_records_survive_reload() {
        let dir = tempdir().unwrap();
        let id = {
            let store = DeploymentStore::with_dir(dir.path());
            store
                .create("rel-1", DistributorId::Tunecore, ReleaseStatus::Delivered, None, None)
                .unwrap()
                .id
        };

        let reloaded = DeploymentStore::with_dir(dir.path());
        let deployment = reloaded.get(&id).unwrap();
        assert_eq!(deployment.status, ReleaseStatus::Delivered);
        assert_eq!(reloaded.for_release("rel-1").len(), 1);
    }

    #[test]
    fn test_clear_removes_everything() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::with_dir(dir.path());
        store
            .create("rel-1", DistributorId::Tunecore, ReleaseStatus::Validating, None, None)
            .unwrap();

        store.clear().unwrap();
        assert!(store.all(None).is_empty());

        let reloaded = DeploymentStore::with_dir(dir.path());
        assert!(reloaded.all(None).is_empty());
    }

    #[test]
    fn test_filtered_listing() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::with_dir(dir.path());
        store
            .create("rel-1", DistributorId::Tunecore, ReleaseStatus::Live, None, None)
            .unwrap();
        store
            .create("rel-1", DistributorId::Cdbaby, ReleaseStatus::Failed, None, None)
            .unwrap();

        let filter = DeploymentFilter {
            status: Some(ReleaseStatus::Failed),
            ..Default::default()
        };
        let failed = store.all(Some(&filter));
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].distributor_id, DistributorId::Cdbaby);
    }
}
