// Admiral module - fleet orchestration loop over assigned contracts
use crate::client::GameService;
use crate::config::SpaceTradersConfig;
use crate::error::EngineError;
use crate::operations::{ProcurementOperations, ShipOutcome, WaitReason, WorldSnapshot};
use crate::storage::{AssignmentStore, ReadinessCache, SurveyCache};
use chrono::{DateTime, Utc};
use std::fs;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

/// Result of one pass over the fleet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Earliest time any ship can act again
    pub next_ready: Option<DateTime<Utc>>,
    pub fulfilled_contracts: Vec<String>,
    /// Ships whose decision failed without sinking the tick
    pub skipped_ships: Vec<String>,
}

pub struct Admiral<G: GameService> {
    client: G,
    world: WorldSnapshot,
    surveys: SurveyCache,
    readiness: ReadinessCache,
    assignments: AssignmentStore,
    config: SpaceTradersConfig,
}

impl<G: GameService> Admiral<G> {
    pub fn new(client: G, assignments: AssignmentStore, config: SpaceTradersConfig) -> Self {
        let surveys = SurveyCache::new(config.engine.survey_freshness_floor());
        Self {
            client,
            world: WorldSnapshot::new(),
            surveys,
            readiness: ReadinessCache::new(),
            assignments,
            config,
        }
    }

    /// Build an admiral with a freshly loaded snapshot
    pub async fn initialize(
        client: G,
        assignments: AssignmentStore,
        config: SpaceTradersConfig,
    ) -> Result<Self, EngineError> {
        let mut admiral = Self::new(client, assignments, config);
        admiral.reload().await?;
        Ok(admiral)
    }

    pub async fn reload(&mut self) -> Result<(), EngineError> {
        self.world.reload(&self.client, &self.assignments).await
    }

    pub fn client(&self) -> &G {
        &self.client
    }

    pub fn world(&self) -> &WorldSnapshot {
        &self.world
    }

    pub fn surveys(&self) -> &SurveyCache {
        &self.surveys
    }

    pub fn surveys_mut(&mut self) -> &mut SurveyCache {
        &mut self.surveys
    }

    pub fn readiness(&self) -> &ReadinessCache {
        &self.readiness
    }

    pub fn readiness_mut(&mut self) -> &mut ReadinessCache {
        &mut self.readiness
    }

    pub fn assignments(&self) -> &AssignmentStore {
        &self.assignments
    }

    /// Decide for one ship unless it is known to be busy
    pub async fn run_ship(&mut self, ship_symbol: &str, contract_id: &str) -> Result<ShipOutcome, EngineError> {
        if let Some(until) = self.readiness.get(ship_symbol) {
            return Ok(ShipOutcome::Waiting {
                until,
                reason: WaitReason::Busy,
            });
        }

        let outcome = ProcurementOperations::new(
            &self.client,
            &mut self.world,
            &mut self.surveys,
            &mut self.assignments,
            &self.config.engine,
        )
        .run_ship(ship_symbol, contract_id)
        .await?;

        if let Some(ready_at) = outcome.ready_at() {
            self.readiness.set(ship_symbol, ready_at);
        }
        Ok(outcome)
    }

    /// Visit every ship of every active contract once
    pub async fn run_tick(&mut self) -> Result<TickReport, EngineError> {
        let mut report = TickReport::default();

        for contract_id in self.assignments.active_contracts() {
            for ship_symbol in self.assignments.assigned_ships(&contract_id) {
                match self.run_ship(&ship_symbol, &contract_id).await {
                    Ok(ShipOutcome::ContractFulfilled { contract_id }) => {
                        report.fulfilled_contracts.push(contract_id);
                        break;
                    }
                    Ok(outcome) => {
                        if let Some(ready_at) = outcome.ready_at() {
                            report.next_ready = Some(match report.next_ready {
                                Some(current) => current.min(ready_at),
                                None => ready_at,
                            });
                        }
                    }
                    Err(e) if e.is_ship_local() => {
                        warn!("⚠️ Skipping {} this tick: {}", ship_symbol, e);
                        report.skipped_ships.push(ship_symbol);
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(report)
    }

    /// Tick until `shutdown` resolves or a tick fails
    pub async fn run_continuous_operations<F>(&mut self, shutdown: F) -> Result<(), EngineError>
    where
        F: Future<Output = ()>,
    {
        info!("🎖️ Admiral starting continuous procurement operations");
        tokio::pin!(shutdown);
        let default_interval = self.config.timing.default_interval();
        let mut tick_count: u64 = 0;

        loop {
            tick_count += 1;
            let report = match self.run_tick().await {
                Ok(report) => report,
                Err(e) => {
                    error!("❌ Tick #{} failed: {}", tick_count, e);
                    return Err(e);
                }
            };

            for contract_id in &report.fulfilled_contracts {
                info!("🎉 Contract {} complete, its ships are now unassigned", contract_id);
            }

            let wait = sleep_duration(report.next_ready, Utc::now(), default_interval);
            match report.next_ready {
                Some(next_ready) => info!("⏳ Waiting until {} for next round", next_ready.format("%H:%M:%S UTC")),
                None => info!("⏳ Waiting {}s for next round", wait.as_secs()),
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("🛑 Shutdown requested after {} ticks", tick_count);
                    return Ok(());
                }
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}

/// Time to sleep before the next tick: until `next_ready`, or `default` when no ship reported one
pub fn sleep_duration(next_ready: Option<DateTime<Utc>>, now: DateTime<Utc>, default: Duration) -> Duration {
    match next_ready {
        Some(next_ready) => (next_ready - now).to_std().unwrap_or(Duration::ZERO),
        None => default,
    }
}

/// Interrupt listener for `run_continuous_operations`.
///
/// The handler is registered before this returns, so a Ctrl+C that arrives
/// during startup or a tick is held until the loop next checks for shutdown.
#[cfg(unix)]
pub fn shutdown_signal() -> Result<impl Future<Output = ()>, std::io::Error> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    Ok(async move {
        interrupt.recv().await;
    })
}

#[cfg(windows)]
pub fn shutdown_signal() -> Result<impl Future<Output = ()>, std::io::Error> {
    let mut interrupt = tokio::signal::windows::ctrl_c()?;
    Ok(async move {
        interrupt.recv().await;
    })
}

pub fn load_agent_token(path: impl AsRef<Path>) -> Result<String, std::io::Error> {
    let token = fs::read_to_string(path.as_ref())?.trim().to_string();
    if token.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{} is empty", path.as_ref().display()),
        ));
    }
    Ok(token)
}
