// World state snapshot - in-memory mirror of agent, ships, active contracts and waypoints
use crate::client::GameService;
use crate::error::EngineError;
use crate::models::*;
use crate::storage::AssignmentStore;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct WorldSnapshot {
    agent: Option<Agent>,
    ships: HashMap<String, Ship>,
    contracts: HashMap<String, Contract>,
    // system_symbol -> waypoints
    waypoints: HashMap<String, Vec<Waypoint>>,
}

impl WorldSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wholesale load: agent, every ship, every contract with assigned ships,
    /// and the waypoints of each system a ship is in.
    pub async fn load<G: GameService>(client: &G, assignments: &AssignmentStore) -> Result<Self, EngineError> {
        let agent = client
            .get_agent()
            .await
            .map_err(|e| EngineError::remote("get agent", "agent", e))?;

        let ships: HashMap<String, Ship> = client
            .list_ships()
            .await
            .map_err(|e| EngineError::remote("list ships", "fleet", e))?
            .into_iter()
            .map(|ship| (ship.symbol.clone(), ship))
            .collect();

        let mut contracts = HashMap::new();
        for contract_id in assignments.active_contracts() {
            let contract = client
                .get_contract(&contract_id)
                .await
                .map_err(|e| EngineError::remote("get contract", contract_id.as_str(), e))?;
            contracts.insert(contract.id.clone(), contract);
        }

        let systems: BTreeSet<String> = ships.values().map(|s| s.nav.system_symbol.clone()).collect();
        let mut waypoints = HashMap::new();
        for system in systems {
            let system_waypoints = client
                .list_waypoints(&system)
                .await
                .map_err(|e| EngineError::remote("list waypoints", system.as_str(), e))?;
            waypoints.insert(system, system_waypoints);
        }

        info!(
            "📡 Loaded {}: {} ships, {} active contracts, {} systems",
            agent.symbol,
            ships.len(),
            contracts.len(),
            waypoints.len()
        );

        Ok(Self {
            agent: Some(agent),
            ships,
            contracts,
            waypoints,
        })
    }

    pub async fn reload<G: GameService>(&mut self, client: &G, assignments: &AssignmentStore) -> Result<(), EngineError> {
        *self = Self::load(client, assignments).await?;
        Ok(())
    }

    pub fn agent(&self) -> Option<&Agent> {
        self.agent.as_ref()
    }

    pub fn set_agent(&mut self, agent: Agent) {
        self.agent = Some(agent);
    }

    // Ships

    pub fn ship(&self, ship_symbol: &str) -> Option<&Ship> {
        self.ships.get(ship_symbol)
    }

    /// Ships sorted by symbol
    pub fn ships(&self) -> Vec<&Ship> {
        let mut ships: Vec<&Ship> = self.ships.values().collect();
        ships.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        ships
    }

    pub async fn ship_or_fetch<G: GameService>(&mut self, client: &G, ship_symbol: &str) -> Result<&Ship, EngineError> {
        match self.ships.entry(ship_symbol.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                debug!("🔄 {} not in snapshot, fetching", ship_symbol);
                let ship = client
                    .get_ship(ship_symbol)
                    .await
                    .map_err(|e| EngineError::remote("get ship", ship_symbol, e))?;
                Ok(entry.insert(ship))
            }
        }
    }

    /// Replace the cached ship with the service's current view
    pub async fn refresh_ship<G: GameService>(&mut self, client: &G, ship_symbol: &str) -> Result<&Ship, EngineError> {
        let ship = client
            .get_ship(ship_symbol)
            .await
            .map_err(|e| EngineError::remote("get ship", ship_symbol, e))?;
        debug!("🔄 Refreshed {} from API", ship_symbol);
        match self.ships.entry(ship_symbol.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(ship);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => Ok(entry.insert(ship)),
        }
    }

    /// Patch a cached ship in place from a remote response
    pub fn update_ship(&mut self, ship_symbol: &str, f: impl FnOnce(&mut Ship)) -> Result<(), EngineError> {
        let ship = self
            .ships
            .get_mut(ship_symbol)
            .ok_or_else(|| EngineError::ShipNotFound(ship_symbol.to_string()))?;
        f(ship);
        Ok(())
    }

    // Contracts

    pub fn contract(&self, contract_id: &str) -> Option<&Contract> {
        self.contracts.get(contract_id)
    }

    pub fn contracts(&self) -> Vec<&Contract> {
        let mut contracts: Vec<&Contract> = self.contracts.values().collect();
        contracts.sort_by(|a, b| a.id.cmp(&b.id));
        contracts
    }

    pub fn insert_contract(&mut self, contract: Contract) {
        self.contracts.insert(contract.id.clone(), contract);
    }

    pub fn remove_contract(&mut self, contract_id: &str) -> Option<Contract> {
        self.contracts.remove(contract_id)
    }

    pub async fn contract_or_fetch<G: GameService>(
        &mut self,
        client: &G,
        contract_id: &str,
    ) -> Result<&Contract, EngineError> {
        match self.contracts.entry(contract_id.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let contract = client
                    .get_contract(contract_id)
                    .await
                    .map_err(|e| EngineError::remote("get contract", contract_id, e))?;
                Ok(entry.insert(contract))
            }
        }
    }

    // Waypoints

    /// Waypoints of a system, fetched on first reference
    pub async fn waypoints<G: GameService>(&mut self, client: &G, system_symbol: &str) -> Result<&[Waypoint], EngineError> {
        match self.waypoints.entry(system_symbol.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_slice()),
            Entry::Vacant(entry) => {
                debug!("📋 Fetching waypoints for {}", system_symbol);
                let waypoints = client
                    .list_waypoints(system_symbol)
                    .await
                    .map_err(|e| EngineError::remote("list waypoints", system_symbol, e))?;
                Ok(entry.insert(waypoints).as_slice())
            }
        }
    }

    pub async fn waypoint<G: GameService>(
        &mut self,
        client: &G,
        system_symbol: &str,
        waypoint_symbol: &str,
    ) -> Result<&Waypoint, EngineError> {
        self.waypoints(client, system_symbol)
            .await?
            .iter()
            .find(|wp| wp.symbol == waypoint_symbol)
            .ok_or_else(|| EngineError::WaypointNotFound {
                system: system_symbol.to_string(),
                waypoint: waypoint_symbol.to_string(),
            })
    }
}
