//! nav-matrix - Main Entry Point

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use nav_matrix::api::commands::{self, NavigatorSession};
use nav_matrix::constants::{APP_NAME, APP_VERSION};
use nav_matrix::logic::config::{load_config, NavigatorConfig};
use nav_matrix::logic::stix::load_domain_file;

#[derive(Parser)]
#[command(name = "nav-matrix")]
#[command(version)]
#[command(about = "ATT&CK matrix cell rendering and related-object selection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON configuration file (defaults come from NAV_* variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// ATT&CK domain, e.g. enterprise-attack
    #[arg(long, global = true)]
    domain: Option<String>,

    /// ATT&CK content version, e.g. 14
    #[arg(long, global = true)]
    attack_version: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one JSON cell view per technique x tactic
    Render {
        /// STIX bundle to load
        #[arg(long)]
        bundle: PathBuf,

        /// Layer file to apply before rendering
        #[arg(long)]
        layer: Option<PathBuf>,

        /// Raw Cookie header used for theme detection
        #[arg(long)]
        cookie: Option<String>,
    },

    /// Print the techniques related to a group, software or mitigation
    Related {
        #[arg(long)]
        bundle: PathBuf,

        /// STIX id, e.g. intrusion-set--899ce53f-13a0-479b-a0e4-67d46e241542
        stix_id: String,
    },

    /// Print the multiselect catalog
    Catalog {
        #[arg(long)]
        bundle: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let cli = Cli::parse();
    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = match &cli.config {
        Some(path) => load_config(path).map_err(|e| e.to_string())?,
        None => NavigatorConfig::from_env(),
    };
    if let Some(domain) = cli.domain {
        config.domain = domain;
    }
    if let Some(version) = cli.attack_version {
        config.attack_version = version;
    }

    match cli.command {
        Commands::Render { bundle, layer, cookie } => {
            let mut session = open_session(&bundle, config, cookie.as_deref())?;
            if let Some(path) = layer {
                let json = fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
                commands::import_layer(&mut session, &json)?;
            }
            for cell in commands::render_matrix(&session)? {
                print_json(&cell)?;
            }
        }
        Commands::Related { bundle, stix_id } => {
            let session = open_session(&bundle, config, None)?;
            print_json(&commands::related_techniques(&session, &stix_id)?)?;
        }
        Commands::Catalog { bundle } => {
            let session = open_session(&bundle, config, None)?;
            print_json(&commands::multiselect_catalog(&session)?)?;
        }
    }

    Ok(())
}

fn open_session(
    bundle: &Path,
    config: NavigatorConfig,
    cookie: Option<&str>,
) -> Result<NavigatorSession, String> {
    let domain = load_domain_file(bundle, &config.domain, &config.attack_version)
        .map_err(|e| e.to_string())?;
    NavigatorSession::with_domain(domain, config, cookie).map_err(|e| e.to_string())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let line = serde_json::to_string(value).map_err(|e| e.to_string())?;
    println!("{}", line);
    Ok(())
}
