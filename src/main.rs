use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use tamagotchi::config::Config;
use tamagotchi::persistence;
use tamagotchi::simulation::{driver, SimulationState};
use tamagotchi::{server, Creature, SimError, SpeciesCatalog};
use tokio::sync::RwLock;
use tokio::time::{interval, Duration};

#[derive(Parser, Debug)]
#[command(name = "tamagotchi")]
#[command(about = "Virtual pet simulation server", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Neither load nor write the save file.
    #[arg(long)]
    no_save: bool,

    #[arg(long)]
    no_server: bool,

    /// Species for a new creature (overrides the config).
    #[arg(long)]
    species: Option<String>,

    /// Name for a new creature (overrides the config).
    #[arg(long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = if std::path::Path::new(&args.config).exists() {
        log::info!("Loading config from: {}", args.config);
        Config::load_from_file(&args.config)?
    } else {
        log::info!("Config file not found, using defaults and saving to: {}", args.config);
        let config = Config::default();
        config.save_to_file(&args.config)?;
        config
    };
    if let Some(species) = args.species {
        config.creature.species = species;
    }
    if let Some(name) = args.name {
        config.creature.name = name;
    }

    let catalog = match &config.creature.catalog_path {
        Some(path) => {
            log::info!("Loading species catalog from: {}", path);
            SpeciesCatalog::load_from_file(path)?
        }
        None => SpeciesCatalog::builtin(),
    };
    log::info!("Available species: {}", catalog.ids().collect::<Vec<_>>().join(", "));

    let persist = !args.no_save && config.persistence.enabled;
    let creature = if persist {
        load_or_create(&catalog, &config)?
    } else {
        new_creature(&catalog, &config)?
    };
    log::info!("{}", creature.summary());

    let state = Arc::new(RwLock::new(SimulationState::new(creature, &config)));

    if !args.no_server && config.server.enabled {
        let server_state = state.clone();
        let server_config = config.clone();
        tokio::spawn(async move {
            if let Err(e) = server::run_server(server_config, server_state).await {
                log::error!("Server error: {}", e);
            }
        });
        log::info!("WebSocket server started on {}:{}", config.server.address, config.server.port);
    }

    let ticker = driver::spawn(state.clone(), config.clone());

    run_until_shutdown(&state, &config, persist).await;

    ticker.cancel().await;
    if persist {
        save(&state, &config).await;
    }

    Ok(())
}

fn new_creature(catalog: &SpeciesCatalog, config: &Config) -> Result<Creature, SimError> {
    let species = catalog.get(&config.creature.species)?;
    log::info!("Creating a new {} named {}", species.name(), config.creature.name);
    Creature::new(species, config.creature.name.clone())
}

fn load_or_create(catalog: &SpeciesCatalog, config: &Config) -> Result<Creature, SimError> {
    let record = match persistence::load_record(config) {
        Ok(record) => record,
        Err(SimError::CorruptPersistedState(e)) => {
            log::warn!("Save file unusable ({}), starting over", e);
            None
        }
        Err(e) => return Err(e),
    };

    match record {
        Some(record) => match persistence::restore(&record, catalog, Utc::now(), config) {
            Ok(creature) => {
                log::info!("Resumed {} saved at {}", creature.name(), record.timestamp);
                Ok(creature)
            }
            Err(e) => {
                log::warn!("Could not restore saved creature ({}), starting over", e);
                new_creature(catalog, config)
            }
        },
        None => new_creature(catalog, config),
    }
}

async fn save(state: &Arc<RwLock<SimulationState>>, config: &Config) {
    let record = state.read().await.record(Utc::now());
    match persistence::save_record(&record, config) {
        Ok(path) => log::info!("Creature saved: {}", path.display()),
        Err(e) => log::error!("Failed to save creature: {}", e),
    }
}

/// Autosaves on a timer until Ctrl-C.
async fn run_until_shutdown(state: &Arc<RwLock<SimulationState>>, config: &Config, persist: bool) {
    let mut autosave = interval(Duration::from_secs(config.persistence.autosave_interval_seconds.max(1)));
    autosave.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Shutting down");
                break;
            }
            _ = autosave.tick() => {
                if persist {
                    save(state, config).await;
                }
                log::info!("{}", state.read().await.creature.summary());
            }
        }
    }
}
