// Procurement decision engine - one decision, at most one timed action, per ship per tick
use crate::client::GameService;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::models::*;
use crate::operations::ship::{ShipOperations, TimedAction};
use crate::operations::world::WorldSnapshot;
use crate::storage::{AssignmentStore, SurveyCache};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// How a ship's cargo lines up against a contract's outstanding terms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CargoPlan {
    /// Units to hand over at the current waypoint, per material
    pub deliveries: BTreeMap<String, i32>,
    /// Held units not reserved for any delivery
    pub surplus: BTreeMap<String, i32>,
    /// Destinations where held cargo is reserved for delivery
    pub other_locations: BTreeSet<String>,
    /// Materials the ship does not hold enough of
    pub needed: BTreeSet<String>,
}

impl CargoPlan {
    pub fn build(ship: &Ship, contract: &Contract) -> Self {
        let here = ship.nav.waypoint_symbol.as_str();

        let mut available: BTreeMap<String, i32> = BTreeMap::new();
        for item in ship.cargo.inventory.iter().filter(|item| item.units > 0) {
            *available.entry(item.symbol.clone()).or_default() += item.units;
        }

        let (local, elsewhere): (Vec<&DeliveryItem>, Vec<&DeliveryItem>) = contract
            .unmet_deliveries()
            .partition(|term| term.destination_symbol == here);

        let mut plan = CargoPlan::default();

        for term in local {
            let Some(held) = available.get(&term.trade_symbol).copied() else {
                plan.needed.insert(term.trade_symbol.clone());
                continue;
            };
            let units = plan.reserve(&mut available, term, held);
            *plan.deliveries.entry(term.trade_symbol.clone()).or_default() += units;
        }

        for term in elsewhere {
            let Some(held) = available.get(&term.trade_symbol).copied() else {
                plan.needed.insert(term.trade_symbol.clone());
                continue;
            };
            plan.other_locations.insert(term.destination_symbol.clone());
            plan.reserve(&mut available, term, held);
        }

        plan.surplus = available;
        plan
    }

    // Take up to the outstanding amount from held cargo, flagging any shortfall
    fn reserve(&mut self, available: &mut BTreeMap<String, i32>, term: &DeliveryItem, held: i32) -> i32 {
        let required = term.units_remaining();
        if required >= held {
            if required > held {
                self.needed.insert(term.trade_symbol.clone());
            }
            available.remove(&term.trade_symbol);
            held
        } else {
            if let Some(units) = available.get_mut(&term.trade_symbol) {
                *units -= required;
            }
            required
        }
    }

    /// Surplus that may be sold, skipping protected materials
    pub fn sellable<'p>(&'p self, settings: &'p EngineConfig) -> impl Iterator<Item = (&'p str, i32)> + 'p {
        self.surplus
            .iter()
            .filter(move |(symbol, units)| **units > 0 && !settings.is_protected(symbol))
            .map(|(symbol, units)| (symbol.as_str(), *units))
    }

    /// Nothing left to carry elsewhere and nothing left to obtain
    pub fn is_complete(&self) -> bool {
        self.other_locations.is_empty() && self.needed.is_empty()
    }
}

/// Decision table rows, in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    FulfillContract,
    Survey,
    Extract { material: String },
    TravelToDelivery { destination: String },
    TravelToSource,
}

/// Pick the next step once deliveries and sales at the current waypoint are done
pub fn choose_next_step(
    ship: &Ship,
    waypoint: &Waypoint,
    plan: &CargoPlan,
    surveys: &mut SurveyCache,
    settings: &EngineConfig,
) -> NextStep {
    if plan.is_complete() {
        return NextStep::FulfillContract;
    }
    if needs_survey(ship, waypoint, plan, surveys, settings) {
        return NextStep::Survey;
    }
    if let Some(material) = extraction_material(ship, waypoint, plan, surveys, settings) {
        return NextStep::Extract { material };
    }
    if let Some(destination) = plan.other_locations.iter().next() {
        return NextStep::TravelToDelivery {
            destination: destination.clone(),
        };
    }
    NextStep::TravelToSource
}

/// Survey-capable ship at a deposit site, with some needed material lacking a good survey
pub fn needs_survey(
    ship: &Ship,
    waypoint: &Waypoint,
    plan: &CargoPlan,
    surveys: &mut SurveyCache,
    settings: &EngineConfig,
) -> bool {
    // Surveys are only accepted at a deposit site; elsewhere the travel rows take over
    if !ship.has_mount(&settings.surveyor_mount_prefix) || !waypoint.has_mineral_deposits() {
        return false;
    }
    plan.needed.iter().any(|material| {
        surveys
            .best_survey(&waypoint.symbol, material)
            .is_none_or(|survey| survey.mineral_fraction(material) < settings.survey_quality_threshold)
    })
}

/// Material to extract, if extraction is possible here. Prefers the needed
/// material with the richest cached survey.
pub fn extraction_material(
    ship: &Ship,
    waypoint: &Waypoint,
    plan: &CargoPlan,
    surveys: &mut SurveyCache,
    settings: &EngineConfig,
) -> Option<String> {
    if !waypoint.has_mineral_deposits() || plan.needed.is_empty() {
        return None;
    }
    if ship.cargo_fill() >= settings.cargo_fill_limit {
        debug!("📦 {} cargo at {:.0}%, not extracting", ship.symbol, ship.cargo_fill() * 100.0);
        return None;
    }

    let mut best: Option<(&String, f64)> = None;
    for material in &plan.needed {
        if let Some(survey) = surveys.best_survey(&waypoint.symbol, material) {
            let fraction = survey.mineral_fraction(material);
            if best.is_none_or(|(_, best_fraction)| fraction > best_fraction) {
                best = Some((material, fraction));
            }
        }
    }

    best.map(|(material, _)| material)
        .or_else(|| plan.needed.iter().next())
        .cloned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelPurpose {
    Delivery,
    Extraction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShipAction {
    Survey {
        waypoint: String,
    },
    Extract {
        waypoint: String,
        material: String,
        survey: Option<String>,
    },
    Navigate {
        destination: String,
        purpose: TravelPurpose,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum WaitReason {
    InTransit { destination: String },
    Cooldown,
    /// Known busy from an earlier tick
    Busy,
}

/// What one decision pass did for a ship
#[derive(Debug, Clone, PartialEq)]
pub enum ShipOutcome {
    Waiting { until: DateTime<Utc>, reason: WaitReason },
    Acted { action: ShipAction, ready_at: DateTime<Utc> },
    ContractFulfilled { contract_id: String },
}

impl ShipOutcome {
    pub fn ready_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ShipOutcome::Waiting { until, .. } => Some(*until),
            ShipOutcome::Acted { ready_at, .. } => Some(*ready_at),
            ShipOutcome::ContractFulfilled { .. } => None,
        }
    }
}

pub struct ProcurementOperations<'a, G: GameService> {
    client: &'a G,
    world: &'a mut WorldSnapshot,
    surveys: &'a mut SurveyCache,
    assignments: &'a mut AssignmentStore,
    settings: &'a EngineConfig,
}

impl<'a, G: GameService> ProcurementOperations<'a, G> {
    pub fn new(
        client: &'a G,
        world: &'a mut WorldSnapshot,
        surveys: &'a mut SurveyCache,
        assignments: &'a mut AssignmentStore,
        settings: &'a EngineConfig,
    ) -> Self {
        Self {
            client,
            world,
            surveys,
            assignments,
            settings,
        }
    }

    fn ship_ops<'b>(&'b mut self, ship_symbol: &'b str) -> ShipOperations<'b, G> {
        ShipOperations::new(self.client, self.world, ship_symbol)
    }

    fn current_ship(&self, ship_symbol: &str) -> Result<Ship, EngineError> {
        self.world
            .ship(ship_symbol)
            .cloned()
            .ok_or_else(|| EngineError::ShipNotFound(ship_symbol.to_string()))
    }

    /// Run one decision for `ship_symbol` working `contract_id`
    pub async fn run_ship(&mut self, ship_symbol: &str, contract_id: &str) -> Result<ShipOutcome, EngineError> {
        let contract = self.world.contract_or_fetch(self.client, contract_id).await?.clone();
        if contract.contract_type != CONTRACT_TYPE_PROCUREMENT {
            return Err(EngineError::UnsupportedContractType {
                contract_id: contract.id,
                contract_type: contract.contract_type,
            });
        }

        let ship = self.world.ship_or_fetch(self.client, ship_symbol).await?.clone();
        if ship.role() != ROLE_COMMAND && ship.role() != ROLE_EXCAVATOR {
            return Err(EngineError::UnsupportedShipRole {
                ship: ship.symbol.clone(),
                role: ship.registration.role.clone(),
            });
        }

        if let Some(outcome) = self.check_transit(&ship).await? {
            return Ok(outcome);
        }

        let ship = self.current_ship(ship_symbol)?;
        let waypoint = self
            .world
            .waypoint(self.client, &ship.nav.system_symbol, &ship.nav.waypoint_symbol)
            .await?
            .clone();

        if waypoint.has_marketplace() && ship.fuel.current < ship.fuel.capacity {
            info!("⛽ {} ({}) attempting to refuel", ship.name(), ship.role());
            self.ship_ops(ship_symbol).try_refuel().await?;
        }

        let plan = CargoPlan::build(&ship, &contract);
        debug!("📋 {} plan: {:?}", ship_symbol, plan);

        for (trade_symbol, units) in plan.deliveries.iter().filter(|(_, units)| **units > 0) {
            info!(
                "📦 {} ({}) delivering {} units of {} at {}",
                ship.name(),
                ship.role(),
                units,
                trade_symbol,
                waypoint.symbol
            );
            self.ship_ops(ship_symbol).deliver(contract_id, trade_symbol, *units).await?;
        }

        if waypoint.has_marketplace() {
            let settings = self.settings;
            for (trade_symbol, units) in plan.sellable(settings) {
                info!(
                    "💰 {} ({}) selling {} unneeded units of {} at {}",
                    ship.name(),
                    ship.role(),
                    units,
                    trade_symbol,
                    waypoint.symbol
                );
                self.ship_ops(ship_symbol).sell(trade_symbol, units).await?;
            }
        }

        let current = self
            .world
            .ship(ship_symbol)
            .ok_or_else(|| EngineError::ShipNotFound(ship_symbol.to_string()))?;
        let step = choose_next_step(current, &waypoint, &plan, self.surveys, self.settings);
        debug!("🧭 {} next step: {:?}", ship_symbol, step);

        match step {
            NextStep::FulfillContract => self.fulfill(contract_id).await,
            NextStep::Survey => {
                info!("🔍 {} ({}) surveying at {}", ship.name(), ship.role(), waypoint.symbol);
                match self.ship_ops(ship_symbol).survey().await? {
                    TimedAction::Completed(new_surveys, ready_at) => {
                        self.surveys.record_surveys(&waypoint.symbol, &new_surveys);
                        Ok(ShipOutcome::Acted {
                            action: ShipAction::Survey {
                                waypoint: waypoint.symbol,
                            },
                            ready_at,
                        })
                    }
                    TimedAction::StillCooling(until) => Ok(ShipOutcome::Waiting {
                        until,
                        reason: WaitReason::Cooldown,
                    }),
                }
            }
            NextStep::Extract { material } => {
                info!(
                    "⛏️ {} ({}) extracting {} at {}",
                    ship.name(),
                    ship.role(),
                    material,
                    waypoint.symbol
                );
                let survey = self.surveys.best_survey(&waypoint.symbol, &material).cloned();
                match self.ship_ops(ship_symbol).extract(survey.as_ref()).await? {
                    TimedAction::Completed(_, ready_at) => Ok(ShipOutcome::Acted {
                        action: ShipAction::Extract {
                            waypoint: waypoint.symbol,
                            material,
                            survey: survey.map(|s| s.signature),
                        },
                        ready_at,
                    }),
                    TimedAction::StillCooling(until) => Ok(ShipOutcome::Waiting {
                        until,
                        reason: WaitReason::Cooldown,
                    }),
                }
            }
            NextStep::TravelToDelivery { destination } => {
                info!(
                    "🚀 {} ({}) travelling to {} to deliver goods",
                    ship.name(),
                    ship.role(),
                    destination
                );
                self.travel(ship_symbol, destination, TravelPurpose::Delivery).await
            }
            NextStep::TravelToSource => {
                let source = self
                    .world
                    .waypoints(self.client, &ship.nav.system_symbol)
                    .await?
                    .iter()
                    .find(|wp| wp.has_mineral_deposits() && wp.symbol != waypoint.symbol)
                    .map(|wp| wp.symbol.clone());
                let Some(destination) = source else {
                    return Err(EngineError::NoSuitableAction {
                        ship: ship_symbol.to_string(),
                        contract_id: contract_id.to_string(),
                    });
                };
                info!(
                    "🚀 {} ({}) travelling to {} to extract resources",
                    ship.name(),
                    ship.role(),
                    destination
                );
                self.travel(ship_symbol, destination, TravelPurpose::Extraction).await
            }
        }
    }

    async fn check_transit(&mut self, ship: &Ship) -> Result<Option<ShipOutcome>, EngineError> {
        if !ship.is_in_transit() {
            return Ok(None);
        }

        let route = &ship.nav.route;
        if route.arrival > Utc::now() {
            info!(
                "🛸 {} ({}) still in transit to {}, arriving {}",
                ship.name(),
                ship.role(),
                route.destination.symbol,
                route.arrival.format("%H:%M:%S UTC")
            );
            return Ok(Some(ShipOutcome::Waiting {
                until: route.arrival,
                reason: WaitReason::InTransit {
                    destination: route.destination.symbol.clone(),
                },
            }));
        }

        let refreshed = self.ship_ops(&ship.symbol).refresh().await?;
        if refreshed.is_in_transit() {
            return Err(EngineError::StillInTransit {
                ship: ship.symbol.clone(),
                destination: refreshed.nav.route.destination.symbol.clone(),
                arrival: refreshed.nav.route.arrival,
            });
        }
        debug!("🛬 {} arrived at {}", ship.symbol, refreshed.nav.waypoint_symbol);
        Ok(None)
    }

    async fn travel(
        &mut self,
        ship_symbol: &str,
        destination: String,
        purpose: TravelPurpose,
    ) -> Result<ShipOutcome, EngineError> {
        let arrival = self.ship_ops(ship_symbol).navigate(&destination).await?;
        Ok(ShipOutcome::Acted {
            action: ShipAction::Navigate { destination, purpose },
            ready_at: arrival,
        })
    }

    /// Fulfill the contract and release all of its ships
    async fn fulfill(&mut self, contract_id: &str) -> Result<ShipOutcome, EngineError> {
        let data = self
            .client
            .fulfill_contract(contract_id)
            .await
            .into_result()
            .map_err(|e| EngineError::remote("fulfill contract", contract_id, e))?;

        let payment = data.contract.terms.payment.on_fulfilled;
        info!(
            "🎉 Contract {} fulfilled! Received {} credits, balance {}",
            contract_id, payment, data.agent.credits
        );

        self.world.set_agent(data.agent);
        self.world.remove_contract(contract_id);
        self.assignments.update(|state| state.complete_contract(contract_id))?;

        Ok(ShipOutcome::ContractFulfilled {
            contract_id: contract_id.to_string(),
        })
    }
}
