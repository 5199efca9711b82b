// In-process game service for engine tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use spacetraders_procurement::client::{ActionResponse, ApiFailure, GameService};
use spacetraders_procurement::config::EngineConfig;
use spacetraders_procurement::models::*;
use spacetraders_procurement::{Admiral, AssignmentStore, SpaceTradersConfig};
use std::collections::BTreeMap;
use std::sync::Mutex;

pub const SYSTEM: &str = "X1-TEST";
pub const MARKET: &str = "X1-TEST-A1";
pub const ASTEROIDS: &str = "X1-TEST-B2";
pub const HQ: &str = "X1-TEST-C3";

pub const ACTION_COOLDOWN_SECONDS: i64 = 70;
pub const TRAVEL_SECONDS: i64 = 60;
pub const SELL_PRICE: i32 = 10;

pub struct MockState {
    pub agent: Agent,
    pub ships: BTreeMap<String, Ship>,
    pub contracts: BTreeMap<String, Contract>,
    pub waypoints: BTreeMap<String, Vec<Waypoint>>,
    /// Every call in order, e.g. "sell SHIP-1 IRON_ORE 5"
    pub calls: Vec<String>,
    pub survey_results: Vec<Survey>,
    pub extract_yield: (String, i32),
    /// When set, survey and extract answer with this cooldown
    pub active_cooldown: Option<ShipCooldown>,
    pub fail_refuel: bool,
    /// get_ship keeps reporting IN_TRANSIT after the arrival time
    pub stuck_in_transit: bool,
}

pub struct MockGameService {
    pub state: Mutex<MockState>,
}

impl MockGameService {
    pub fn new() -> Self {
        let waypoints = vec![
            waypoint(HQ, &[]),
            waypoint(MARKET, &[TRAIT_MARKETPLACE]),
            waypoint(ASTEROIDS, &[TRAIT_MINERAL_DEPOSITS]),
        ];
        Self {
            state: Mutex::new(MockState {
                agent: agent(),
                ships: BTreeMap::new(),
                contracts: BTreeMap::new(),
                waypoints: BTreeMap::from([(SYSTEM.to_string(), waypoints)]),
                calls: Vec::new(),
                survey_results: Vec::new(),
                extract_yield: ("IRON_ORE".to_string(), 5),
                active_cooldown: None,
                fail_refuel: false,
                stuck_in_transit: false,
            }),
        }
    }

    pub fn with_ship(self, ship: Ship) -> Self {
        self.state.lock().unwrap().ships.insert(ship.symbol.clone(), ship);
        self
    }

    pub fn with_contract(self, contract: Contract) -> Self {
        self.state.lock().unwrap().contracts.insert(contract.id.clone(), contract);
        self
    }

    pub fn with_waypoints(self, system: &str, waypoints: Vec<Waypoint>) -> Self {
        self.state.lock().unwrap().waypoints.insert(system.to_string(), waypoints);
        self
    }

    pub fn with_surveys(self, surveys: Vec<Survey>) -> Self {
        self.state.lock().unwrap().survey_results = surveys;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that change remote state (everything except reads)
    pub fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.starts_with("get_") && !call.starts_with("list_"))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn ship(&self, symbol: &str) -> Ship {
        self.state.lock().unwrap().ships[symbol].clone()
    }

    pub fn contract(&self, id: &str) -> Contract {
        self.state.lock().unwrap().contracts[id].clone()
    }

    fn record(state: &mut MockState, call: String) {
        state.calls.push(call);
    }
}

fn not_found(what: &str) -> ApiFailure {
    ApiFailure::api(404, Some(404), format!("{} not found", what))
}

fn recount(cargo: &mut ShipCargo) {
    cargo.inventory.retain(|item| item.units > 0);
    cargo.units = cargo.inventory.iter().map(|item| item.units).sum();
}

fn remove_cargo(cargo: &mut ShipCargo, symbol: &str, units: i32) {
    if let Some(item) = cargo.inventory.iter_mut().find(|item| item.symbol == symbol) {
        item.units -= units;
    }
    recount(cargo);
}

fn add_cargo(cargo: &mut ShipCargo, symbol: &str, units: i32) {
    match cargo.inventory.iter_mut().find(|item| item.symbol == symbol) {
        Some(item) => item.units += units,
        None => cargo.inventory.push(cargo_item(symbol, units)),
    }
    recount(cargo);
}

fn cooldown_for(ship_symbol: &str) -> ShipCooldown {
    ShipCooldown {
        ship_symbol: ship_symbol.to_string(),
        total_seconds: ACTION_COOLDOWN_SECONDS as i32,
        remaining_seconds: ACTION_COOLDOWN_SECONDS as i32,
        expiration: Some(Utc::now() + Duration::seconds(ACTION_COOLDOWN_SECONDS)),
    }
}

#[async_trait]
impl GameService for MockGameService {
    async fn get_agent(&self) -> Result<Agent, ApiFailure> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "get_agent".to_string());
        Ok(state.agent.clone())
    }

    async fn list_ships(&self) -> Result<Vec<Ship>, ApiFailure> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "list_ships".to_string());
        Ok(state.ships.values().cloned().collect())
    }

    async fn get_ship(&self, ship_symbol: &str) -> Result<Ship, ApiFailure> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("get_ship {}", ship_symbol));
        let stuck = state.stuck_in_transit;
        let ship = state.ships.get_mut(ship_symbol).ok_or_else(|| not_found(ship_symbol))?;
        if ship.is_in_transit() && ship.nav.route.arrival <= Utc::now() && !stuck {
            ship.nav.status = NavStatus::InOrbit;
        }
        Ok(ship.clone())
    }

    async fn get_contract(&self, contract_id: &str) -> Result<Contract, ApiFailure> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("get_contract {}", contract_id));
        state.contracts.get(contract_id).cloned().ok_or_else(|| not_found(contract_id))
    }

    async fn list_waypoints(&self, system_symbol: &str) -> Result<Vec<Waypoint>, ApiFailure> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("list_waypoints {}", system_symbol));
        Ok(state.waypoints.get(system_symbol).cloned().unwrap_or_default())
    }

    async fn dock(&self, ship_symbol: &str) -> ActionResponse<ShipNav> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("dock {}", ship_symbol));
        match state.ships.get_mut(ship_symbol) {
            Some(ship) => {
                ship.nav.status = NavStatus::Docked;
                ActionResponse::Success(ship.nav.clone())
            }
            None => ActionResponse::Failure(not_found(ship_symbol)),
        }
    }

    async fn orbit(&self, ship_symbol: &str) -> ActionResponse<ShipNav> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("orbit {}", ship_symbol));
        match state.ships.get_mut(ship_symbol) {
            Some(ship) => {
                ship.nav.status = NavStatus::InOrbit;
                ActionResponse::Success(ship.nav.clone())
            }
            None => ActionResponse::Failure(not_found(ship_symbol)),
        }
    }

    async fn refuel(&self, ship_symbol: &str) -> ActionResponse<RefuelData> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("refuel {}", ship_symbol));
        if state.fail_refuel {
            return ActionResponse::Failure(ApiFailure::api(400, Some(4600), "insufficient credits"));
        }
        let agent = state.agent.clone();
        match state.ships.get_mut(ship_symbol) {
            Some(ship) => {
                ship.fuel.current = ship.fuel.capacity;
                ActionResponse::Success(RefuelData {
                    agent,
                    fuel: ship.fuel.clone(),
                    transaction: None,
                })
            }
            None => ActionResponse::Failure(not_found(ship_symbol)),
        }
    }

    async fn navigate(&self, ship_symbol: &str, waypoint_symbol: &str) -> ActionResponse<NavigationData> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("navigate {} {}", ship_symbol, waypoint_symbol));
        match state.ships.get_mut(ship_symbol) {
            Some(ship) => {
                let now = Utc::now();
                ship.nav.route.origin = ship.nav.route.destination.clone();
                ship.nav.route.destination = route_waypoint(waypoint_symbol);
                ship.nav.route.departure_time = now;
                ship.nav.route.arrival = now + Duration::seconds(TRAVEL_SECONDS);
                ship.nav.waypoint_symbol = waypoint_symbol.to_string();
                ship.nav.status = NavStatus::InTransit;
                ActionResponse::Success(NavigationData {
                    fuel: ship.fuel.clone(),
                    nav: ship.nav.clone(),
                })
            }
            None => ActionResponse::Failure(not_found(ship_symbol)),
        }
    }

    async fn create_survey(&self, ship_symbol: &str) -> ActionResponse<SurveyData> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("survey {}", ship_symbol));
        if let Some(cooldown) = &state.active_cooldown {
            return ActionResponse::CooldownActive(cooldown.clone());
        }
        ActionResponse::Success(SurveyData {
            cooldown: cooldown_for(ship_symbol),
            surveys: state.survey_results.clone(),
        })
    }

    async fn extract(&self, ship_symbol: &str, survey: Option<&Survey>) -> ActionResponse<ExtractionData> {
        let mut state = self.state.lock().unwrap();
        let used = survey.map(|s| s.signature.as_str()).unwrap_or("none");
        Self::record(&mut state, format!("extract {} survey={}", ship_symbol, used));
        if let Some(cooldown) = &state.active_cooldown {
            return ActionResponse::CooldownActive(cooldown.clone());
        }
        let (symbol, units) = state.extract_yield.clone();
        match state.ships.get_mut(ship_symbol) {
            Some(ship) => {
                add_cargo(&mut ship.cargo, &symbol, units);
                ActionResponse::Success(ExtractionData {
                    cooldown: cooldown_for(ship_symbol),
                    extraction: ExtractionResult {
                        ship_symbol: ship_symbol.to_string(),
                        extraction_yield: ExtractionYield { symbol, units },
                    },
                    cargo: ship.cargo.clone(),
                })
            }
            None => ActionResponse::Failure(not_found(ship_symbol)),
        }
    }

    async fn sell_cargo(&self, ship_symbol: &str, trade_symbol: &str, units: i32) -> ActionResponse<SellCargoData> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("sell {} {} {}", ship_symbol, trade_symbol, units));
        let total_price = units * SELL_PRICE;
        state.agent.credits += i64::from(total_price);
        let agent = state.agent.clone();
        match state.ships.get_mut(ship_symbol) {
            Some(ship) => {
                remove_cargo(&mut ship.cargo, trade_symbol, units);
                ActionResponse::Success(SellCargoData {
                    agent,
                    cargo: ship.cargo.clone(),
                    transaction: SellTransaction {
                        waypoint_symbol: ship.nav.waypoint_symbol.clone(),
                        ship_symbol: ship_symbol.to_string(),
                        trade_symbol: trade_symbol.to_string(),
                        transaction_type: "SELL".to_string(),
                        units,
                        price_per_unit: SELL_PRICE,
                        total_price,
                        timestamp: Utc::now(),
                    },
                })
            }
            None => ActionResponse::Failure(not_found(ship_symbol)),
        }
    }

    async fn deliver_cargo(
        &self,
        contract_id: &str,
        ship_symbol: &str,
        trade_symbol: &str,
        units: i32,
    ) -> ActionResponse<DeliverCargoData> {
        let mut state = self.state.lock().unwrap();
        Self::record(
            &mut state,
            format!("deliver {} {} {} {}", contract_id, ship_symbol, trade_symbol, units),
        );
        let Some(contract) = state.contracts.get_mut(contract_id) else {
            return ActionResponse::Failure(not_found(contract_id));
        };
        if let Some(term) = contract.terms.deliver.iter_mut().find(|d| d.trade_symbol == trade_symbol) {
            term.units_fulfilled += units;
        }
        let contract = contract.clone();
        match state.ships.get_mut(ship_symbol) {
            Some(ship) => {
                remove_cargo(&mut ship.cargo, trade_symbol, units);
                ActionResponse::Success(DeliverCargoData {
                    contract,
                    cargo: ship.cargo.clone(),
                })
            }
            None => ActionResponse::Failure(not_found(ship_symbol)),
        }
    }

    async fn fulfill_contract(&self, contract_id: &str) -> ActionResponse<FulfillContractData> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, format!("fulfill {}", contract_id));
        let Some(contract) = state.contracts.get_mut(contract_id) else {
            return ActionResponse::Failure(not_found(contract_id));
        };
        contract.fulfilled = true;
        let contract = contract.clone();
        state.agent.credits += contract.terms.payment.on_fulfilled;
        ActionResponse::Success(FulfillContractData {
            agent: state.agent.clone(),
            contract,
        })
    }
}

// Builders

pub fn agent() -> Agent {
    Agent {
        account_id: "account-1".to_string(),
        symbol: "TEST_AGENT".to_string(),
        headquarters: HQ.to_string(),
        credits: 100_000,
        starting_faction: "COSMIC".to_string(),
        ship_count: 1,
    }
}

pub fn route_waypoint(symbol: &str) -> ShipRouteWaypoint {
    ShipRouteWaypoint {
        symbol: symbol.to_string(),
        waypoint_type: "PLANET".to_string(),
        system_symbol: SYSTEM.to_string(),
        x: 0,
        y: 0,
    }
}

pub fn cargo_item(symbol: &str, units: i32) -> CargoItem {
    CargoItem {
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        description: String::new(),
        units,
    }
}

/// Excavator in orbit at `waypoint_symbol` with full fuel and an empty 60-unit hold
pub fn ship(symbol: &str, role: &str, waypoint_symbol: &str) -> Ship {
    let now = Utc::now();
    Ship {
        symbol: symbol.to_string(),
        registration: ShipRegistration {
            name: symbol.to_string(),
            faction_symbol: "COSMIC".to_string(),
            role: role.to_string(),
        },
        nav: ShipNav {
            system_symbol: SYSTEM.to_string(),
            waypoint_symbol: waypoint_symbol.to_string(),
            route: ShipRoute {
                destination: route_waypoint(waypoint_symbol),
                origin: route_waypoint(waypoint_symbol),
                departure_time: now - Duration::minutes(10),
                arrival: now - Duration::minutes(5),
            },
            status: NavStatus::InOrbit,
            flight_mode: "CRUISE".to_string(),
        },
        fuel: ShipFuel {
            current: 400,
            capacity: 400,
            consumed: None,
        },
        cargo: ShipCargo {
            capacity: 60,
            units: 0,
            inventory: Vec::new(),
        },
        mounts: vec![mount("MOUNT_MINING_LASER_I")],
    }
}

pub fn mount(symbol: &str) -> ShipMount {
    ShipMount {
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        description: None,
        strength: Some(10),
        deposits: None,
    }
}

pub fn with_cargo(mut ship: Ship, items: &[(&str, i32)]) -> Ship {
    for (symbol, units) in items {
        add_cargo(&mut ship.cargo, symbol, *units);
    }
    ship
}

pub fn with_surveyor(mut ship: Ship) -> Ship {
    ship.mounts.push(mount("MOUNT_SURVEYOR_I"));
    ship
}

pub fn in_transit(mut ship: Ship, destination: &str, arrival: DateTime<Utc>) -> Ship {
    ship.nav.status = NavStatus::InTransit;
    ship.nav.waypoint_symbol = destination.to_string();
    ship.nav.route.destination = route_waypoint(destination);
    ship.nav.route.arrival = arrival;
    ship
}

pub fn waypoint(symbol: &str, traits: &[&str]) -> Waypoint {
    Waypoint {
        symbol: symbol.to_string(),
        waypoint_type: "ASTEROID".to_string(),
        system_symbol: SYSTEM.to_string(),
        x: 0,
        y: 0,
        orbitals: Vec::new(),
        traits: traits
            .iter()
            .map(|t| Trait {
                symbol: t.to_string(),
                name: t.to_string(),
                description: String::new(),
            })
            .collect(),
        faction: None,
    }
}

/// Accepted procurement contract; terms are (material, destination, required, fulfilled)
pub fn contract(id: &str, terms: &[(&str, &str, i32, i32)]) -> Contract {
    let now = Utc::now();
    Contract {
        id: id.to_string(),
        faction_symbol: "COSMIC".to_string(),
        contract_type: CONTRACT_TYPE_PROCUREMENT.to_string(),
        terms: ContractTerms {
            deadline: now + Duration::days(7),
            payment: Payment {
                on_accepted: 1_000,
                on_fulfilled: 20_000,
            },
            deliver: terms
                .iter()
                .map(|(material, destination, required, fulfilled)| DeliveryItem {
                    trade_symbol: material.to_string(),
                    destination_symbol: destination.to_string(),
                    units_required: *required,
                    units_fulfilled: *fulfilled,
                })
                .collect(),
        },
        accepted: true,
        fulfilled: false,
        expiration: now + Duration::days(7),
        deadline_to_accept: None,
    }
}

/// Survey whose deposits list `materials` in order
pub fn survey(signature: &str, waypoint_symbol: &str, materials: &[&str], expires_in: Duration) -> Survey {
    Survey {
        signature: signature.to_string(),
        symbol: waypoint_symbol.to_string(),
        deposits: materials
            .iter()
            .map(|m| SurveyDeposit { symbol: m.to_string() })
            .collect(),
        expiration: Utc::now() + expires_in,
        size: "MODERATE".to_string(),
    }
}

pub fn engine_config() -> EngineConfig {
    SpaceTradersConfig::default().engine
}

/// Admiral over `mock` with the given (contract, ship) assignments and a loaded snapshot.
/// The call log is cleared after loading.
pub async fn admiral(mock: MockGameService, assignments: &[(&str, &str)]) -> Admiral<MockGameService> {
    let mut store = AssignmentStore::in_memory();
    store
        .update(|state| {
            for (contract_id, ship_symbol) in assignments {
                state.assign(contract_id, ship_symbol);
            }
        })
        .expect("in-memory update");
    let admiral = Admiral::initialize(mock, store, SpaceTradersConfig::default())
        .await
        .expect("snapshot load");
    admiral.client().clear_calls();
    admiral
}
