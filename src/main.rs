// SpaceTraders procurement engine - command line entry point

use chrono::Utc;
use clap::{Parser, Subcommand};
use spacetraders_procurement::admiral::{load_agent_token, shutdown_signal};
use spacetraders_procurement::models::format_survey;
use spacetraders_procurement::verbosity::init_logging;
use spacetraders_procurement::{Admiral, AssignmentStore, SpaceTradersClient, SpaceTradersConfig};

#[derive(Parser)]
#[command(name = "spacetraders_procurement", about = "Autonomous SpaceTraders procurement fleet")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[arg(long, default_value = "config/engine.toml", global = true)]
    config: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the fleet loop until interrupted
    Run,
    /// Run a single pass over the fleet and print the result
    Tick,
    /// Assign a ship to a contract
    Assign { contract: String, ship: String },
    /// Remove a ship from a contract
    Unassign { contract: String, ship: String },
    /// Show assignments and the state of every ship
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = SpaceTradersConfig::load_or_create(&cli.config)?;
    let mut assignments = AssignmentStore::open(&config.storage.assignments_path)?;

    match &cli.command {
        Commands::Assign { contract, ship } => {
            assignments.update(|state| state.assign(contract, ship))?;
            println!("✅ {} assigned to contract {}", ship, contract);
            return Ok(());
        }
        Commands::Unassign { contract, ship } => {
            assignments.update(|state| state.unassign(contract, ship))?;
            println!("✅ {} unassigned from contract {}", ship, contract);
            return Ok(());
        }
        _ => {}
    }

    // Listen before startup so an early Ctrl+C still stops cleanly after the first tick
    let shutdown = match cli.command {
        Commands::Run => Some(shutdown_signal()?),
        _ => None,
    };

    config.print_summary();
    let token = load_agent_token(&config.storage.token_path)
        .map_err(|e| format!("Failed to read {}: {}", config.storage.token_path, e))?;
    let client = SpaceTradersClient::new(&token, &config.api)?;
    let mut admiral = Admiral::initialize(client, assignments, config).await?;

    match cli.command {
        Commands::Run => {
            if let Some(shutdown) = shutdown {
                admiral.run_continuous_operations(shutdown).await?;
                println!("🎖️ Admiral reporting: operations stopped by user");
            }
        }
        Commands::Tick => {
            let report = admiral.run_tick().await?;
            match report.next_ready {
                Some(next_ready) => println!("⏳ Next ship ready at {}", next_ready.format("%H:%M:%S UTC")),
                None => println!("⏳ No ship reported a ready time"),
            }
            for contract_id in &report.fulfilled_contracts {
                println!("🎉 Contract {} fulfilled", contract_id);
            }
            for ship in &report.skipped_ships {
                println!("⚠️ {} skipped", ship);
            }

            println!("\n🕐 Busy ships:");
            for (ship, ready_at) in admiral.readiness().active_at(Utc::now()) {
                println!("   {} until {}", ship, ready_at.format("%H:%M:%S UTC"));
            }
            println!("\n🔍 Cached surveys:");
            for (waypoint, material, survey) in admiral.surveys().entries() {
                println!(
                    "   {} {} ({:.0}%): {}",
                    waypoint,
                    material,
                    survey.mineral_fraction(material) * 100.0,
                    format_survey(survey)
                );
            }
        }
        Commands::Status => {
            if let Some(agent) = admiral.world().agent() {
                println!("📊 {} ({} credits, HQ {})", agent.symbol, agent.credits, agent.headquarters);
            }
            println!("\n📋 Active contracts:");
            for contract_id in admiral.assignments().active_contracts() {
                println!("   {}: {}", contract_id, admiral.assignments().assigned_ships(&contract_id).join(", "));
                if let Some(contract) = admiral.world().contract(&contract_id) {
                    for term in &contract.terms.deliver {
                        println!(
                            "     - {} {}/{} to {}",
                            term.trade_symbol, term.units_fulfilled, term.units_required, term.destination_symbol
                        );
                    }
                }
            }
            println!("\n🚢 Ships:");
            for ship in admiral.world().ships() {
                println!(
                    "   {} ({}) {} at {} | fuel {}/{} | cargo {}/{} | contract {}",
                    ship.symbol,
                    ship.role(),
                    ship.nav.status,
                    ship.nav.waypoint_symbol,
                    ship.fuel.current,
                    ship.fuel.capacity,
                    ship.cargo.units,
                    ship.cargo.capacity,
                    admiral.assignments().assigned_contract(&ship.symbol).unwrap_or("-")
                );
            }
        }
        Commands::Assign { .. } | Commands::Unassign { .. } => {}
    }

    Ok(())
}
