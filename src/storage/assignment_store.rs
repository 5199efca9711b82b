// Persistent ship <-> contract assignment storage
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("assignment store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("assignment store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ship -> contract (one each) and contract -> ships (many)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignments {
    #[serde(rename = "shipAssignments", default)]
    ship_assignments: BTreeMap<String, String>,
    #[serde(rename = "contractAssignments", default)]
    contract_assignments: BTreeMap<String, Vec<String>>,
}

impl Assignments {
    pub fn assigned_contract(&self, ship_symbol: &str) -> Option<&str> {
        self.ship_assignments.get(ship_symbol).map(String::as_str)
    }

    pub fn assigned_ships(&self, contract_id: &str) -> &[String] {
        self.contract_assignments
            .get(contract_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Contracts with at least one assigned ship
    pub fn active_contracts(&self) -> Vec<String> {
        self.contract_assignments
            .iter()
            .filter(|(_, ships)| !ships.is_empty())
            .map(|(contract_id, _)| contract_id.clone())
            .collect()
    }

    /// Assign a ship, moving it off any contract it was serving
    pub fn assign(&mut self, contract_id: &str, ship_symbol: &str) {
        if let Some(previous) = self.ship_assignments.get(ship_symbol).cloned() {
            if previous == contract_id {
                return;
            }
            self.unassign(&previous, ship_symbol);
        }
        self.ship_assignments.insert(ship_symbol.to_string(), contract_id.to_string());
        self.contract_assignments
            .entry(contract_id.to_string())
            .or_default()
            .push(ship_symbol.to_string());
    }

    pub fn unassign(&mut self, contract_id: &str, ship_symbol: &str) {
        if self.assigned_contract(ship_symbol) == Some(contract_id) {
            self.ship_assignments.remove(ship_symbol);
        }
        if let Some(ships) = self.contract_assignments.get_mut(contract_id) {
            ships.retain(|s| s != ship_symbol);
            if ships.is_empty() {
                self.contract_assignments.remove(contract_id);
            }
        }
    }

    /// Drop the contract and release every ship that served it
    pub fn complete_contract(&mut self, contract_id: &str) {
        if let Some(ships) = self.contract_assignments.remove(contract_id) {
            for ship in ships {
                self.ship_assignments.remove(&ship);
            }
        }
    }
}

pub struct AssignmentStore {
    storage_path: Option<PathBuf>,
    state: Assignments,
}

impl AssignmentStore {
    /// Open a file-backed store; a missing file starts empty
    pub fn open(storage_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_path = storage_path.as_ref().to_path_buf();
        let state = if storage_path.exists() {
            let content = fs::read_to_string(&storage_path)?;
            let state: Assignments = serde_json::from_str(&content)?;
            info!(
                "💾 Loaded {} ship assignments across {} contracts",
                state.ship_assignments.len(),
                state.contract_assignments.len()
            );
            state
        } else {
            Assignments::default()
        };

        Ok(Self {
            storage_path: Some(storage_path),
            state,
        })
    }

    /// Store that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            storage_path: None,
            state: Assignments::default(),
        }
    }

    pub fn assignments(&self) -> &Assignments {
        &self.state
    }

    pub fn assigned_contract(&self, ship_symbol: &str) -> Option<&str> {
        self.state.assigned_contract(ship_symbol)
    }

    pub fn assigned_ships(&self, contract_id: &str) -> Vec<String> {
        self.state.assigned_ships(contract_id).to_vec()
    }

    pub fn active_contracts(&self) -> Vec<String> {
        self.state.active_contracts()
    }

    /// Apply `f` and persist the result. The change only becomes visible once
    /// it has been written.
    pub fn update<F>(&mut self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Assignments),
    {
        let mut next = self.state.clone();
        f(&mut next);
        self.save_to_disk(&next)?;
        self.state = next;
        Ok(())
    }

    fn save_to_disk(&self, state: &Assignments) -> Result<(), StoreError> {
        let Some(path) = &self.storage_path else {
            return Ok(());
        };

        let content = serde_json::to_string_pretty(state)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Temp file renamed into place
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, path)?;
        debug!("💾 Saved assignments to {}", path.display());
        Ok(())
    }
}
