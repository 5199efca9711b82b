// Individual ship operations: remote actions that patch the snapshot from their responses
use crate::client::{ActionResponse, GameService};
use crate::error::EngineError;
use crate::models::*;
use crate::operations::world::WorldSnapshot;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Result of a cooldown-gated action
#[derive(Debug, Clone, PartialEq)]
pub enum TimedAction<T> {
    /// Action went through; ship is busy until the given time
    Completed(T, DateTime<Utc>),
    /// Cooldown from an earlier action had not elapsed
    StillCooling(DateTime<Utc>),
}

pub struct ShipOperations<'a, G: GameService> {
    client: &'a G,
    world: &'a mut WorldSnapshot,
    ship_symbol: &'a str,
}

impl<'a, G: GameService> ShipOperations<'a, G> {
    pub fn new(client: &'a G, world: &'a mut WorldSnapshot, ship_symbol: &'a str) -> Self {
        Self {
            client,
            world,
            ship_symbol,
        }
    }

    fn ship(&self) -> Result<&Ship, EngineError> {
        self.world
            .ship(self.ship_symbol)
            .ok_or_else(|| EngineError::ShipNotFound(self.ship_symbol.to_string()))
    }

    pub async fn refresh(&mut self) -> Result<Ship, EngineError> {
        self.world.refresh_ship(self.client, self.ship_symbol).await.cloned()
    }

    pub async fn dock(&mut self) -> Result<(), EngineError> {
        if self.ship()?.is_docked() {
            return Ok(());
        }
        let nav = self
            .client
            .dock(self.ship_symbol)
            .await
            .into_result()
            .map_err(|e| EngineError::remote("dock", self.ship_symbol, e))?;
        self.world.update_ship(self.ship_symbol, |ship| ship.nav = nav)
    }

    pub async fn orbit(&mut self) -> Result<(), EngineError> {
        if self.ship()?.is_in_orbit() {
            return Ok(());
        }
        let nav = self
            .client
            .orbit(self.ship_symbol)
            .await
            .into_result()
            .map_err(|e| EngineError::remote("orbit", self.ship_symbol, e))?;
        self.world.update_ship(self.ship_symbol, |ship| ship.nav = nav)
    }

    /// Dock and refuel. A failed refuel is logged and reported as `false`;
    /// a failed dock is still an error.
    pub async fn try_refuel(&mut self) -> Result<bool, EngineError> {
        self.dock().await?;

        match self.client.refuel(self.ship_symbol).await {
            ActionResponse::Success(data) => {
                if let Some(transaction) = &data.transaction {
                    info!(
                        "⛽ {} refueled {} units for {} credits",
                        self.ship_symbol, transaction.units, transaction.total_price
                    );
                }
                self.world.update_ship(self.ship_symbol, |ship| ship.fuel = data.fuel)?;
                self.world.set_agent(data.agent);
                Ok(true)
            }
            ActionResponse::CooldownActive(cooldown) => {
                warn!(
                    "⚠️ Failed to refuel {}: cooldown active ({}s remaining)",
                    self.ship_symbol, cooldown.remaining_seconds
                );
                Ok(false)
            }
            ActionResponse::Failure(failure) => {
                warn!("⚠️ Failed to refuel {}: {}", self.ship_symbol, failure);
                Ok(false)
            }
        }
    }

    pub async fn deliver(&mut self, contract_id: &str, trade_symbol: &str, units: i32) -> Result<(), EngineError> {
        self.dock().await?;
        let data = self
            .client
            .deliver_cargo(contract_id, self.ship_symbol, trade_symbol, units)
            .await
            .into_result()
            .map_err(|e| EngineError::remote("deliver cargo", self.ship_symbol, e))?;
        self.world.update_ship(self.ship_symbol, |ship| ship.cargo = data.cargo)?;
        self.world.insert_contract(data.contract);
        Ok(())
    }

    pub async fn sell(&mut self, trade_symbol: &str, units: i32) -> Result<(), EngineError> {
        self.dock().await?;
        let data = self
            .client
            .sell_cargo(self.ship_symbol, trade_symbol, units)
            .await
            .into_result()
            .map_err(|e| EngineError::remote("sell cargo", self.ship_symbol, e))?;
        info!(
            "💰 {} sold {} {} for {} credits ({}/unit)",
            self.ship_symbol,
            data.transaction.units,
            data.transaction.trade_symbol,
            data.transaction.total_price,
            data.transaction.price_per_unit
        );
        self.world.update_ship(self.ship_symbol, |ship| ship.cargo = data.cargo)?;
        self.world.set_agent(data.agent);
        Ok(())
    }

    pub async fn survey(&mut self) -> Result<TimedAction<Vec<Survey>>, EngineError> {
        self.orbit().await?;
        match self.client.create_survey(self.ship_symbol).await {
            ActionResponse::Success(data) => {
                let ready_at = data.cooldown.ready_at(Utc::now());
                info!("🔍 {} produced {} surveys", self.ship_symbol, data.surveys.len());
                Ok(TimedAction::Completed(data.surveys, ready_at))
            }
            ActionResponse::CooldownActive(cooldown) => Ok(self.still_cooling(&cooldown)),
            ActionResponse::Failure(failure) => Err(EngineError::remote("survey", self.ship_symbol, failure)),
        }
    }

    pub async fn extract(&mut self, survey: Option<&Survey>) -> Result<TimedAction<ExtractionYield>, EngineError> {
        self.orbit().await?;
        if let Some(survey) = survey {
            info!("🗺️ Using survey: {}", format_survey(survey));
        }
        match self.client.extract(self.ship_symbol, survey).await {
            ActionResponse::Success(data) => {
                let ready_at = data.cooldown.ready_at(Utc::now());
                let extracted = data.extraction.extraction_yield;
                info!(
                    "⛏️ {} extracted {} {}",
                    self.ship_symbol, extracted.units, extracted.symbol
                );
                self.world.update_ship(self.ship_symbol, |ship| ship.cargo = data.cargo)?;
                Ok(TimedAction::Completed(extracted, ready_at))
            }
            ActionResponse::CooldownActive(cooldown) => Ok(self.still_cooling(&cooldown)),
            ActionResponse::Failure(failure) => Err(EngineError::remote("extract", self.ship_symbol, failure)),
        }
    }

    /// Start travelling; returns the scheduled arrival
    pub async fn navigate(&mut self, destination: &str) -> Result<DateTime<Utc>, EngineError> {
        self.orbit().await?;
        let data = self
            .client
            .navigate(self.ship_symbol, destination)
            .await
            .into_result()
            .map_err(|e| EngineError::remote("navigate", self.ship_symbol, e))?;
        let arrival = data.nav.route.arrival;
        self.world.update_ship(self.ship_symbol, |ship| {
            ship.nav = data.nav;
            ship.fuel = data.fuel;
        })?;
        Ok(arrival)
    }

    fn still_cooling<T>(&self, cooldown: &ShipCooldown) -> TimedAction<T> {
        info!(
            "⏳ {} still on cooldown; {} of {} seconds remaining",
            self.ship_symbol, cooldown.remaining_seconds, cooldown.total_seconds
        );
        TimedAction::StillCooling(cooldown.ready_at(Utc::now()))
    }
}
