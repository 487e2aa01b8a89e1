//! Point d'entrée CLI pour igc2kmz

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use igc2kmz::{Config, Outcome};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::{CliCollaborator, Commands};

/// Variable d'environnement du fichier de configuration
const CONFIG_ENV: &str = "IGC2KMZ_CONFIG";

/// Convertir des tracklogs IGC en KMZ et fusionner des lots de KMZ
#[derive(Parser)]
#[command(name = "igc2kmz")]
#[command(author, version)]
#[command(about = "Convert IGC tracklogs to KMZ and merge KMZ batches")]
#[command(long_about = "Convert paragliding IGC tracklogs to KMZ (one colored track per file, with takeoff and landing markers).\n\nFolder mode assigns one color per subfolder; merge mode combines a folder of KMZ files into a single document.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Fichier de configuration JSON (défaut : env IGC2KMZ_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Sauvegarder le rapport en JSON
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Sous-commande (aucune: rien à faire)
    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    let config = load_config(cli.config)?;
    let mut collaborator = CliCollaborator::new(cli.command);

    match igc2kmz::run(&mut collaborator, &config)? {
        Outcome::Aborted => info!("Nothing to do"),
        Outcome::Converted(report) => {
            if cli.verbose > 0 {
                report.display();
            }
            if let Some(path) = &cli.report {
                report
                    .save_to_file(path)
                    .with_context(|| format!("Failed to write report: {}", path.display()))?;
                info!(path = %path.display(), "Report saved");
            }
        }
        Outcome::Merged(report) => {
            if cli.verbose > 0 {
                report.display();
            }
            if let Some(path) = &cli.report {
                report
                    .save_to_file(path)
                    .with_context(|| format!("Failed to write report: {}", path.display()))?;
                info!(path = %path.display(), "Report saved");
            }
        }
    }

    Ok(())
}

/// `--config`, sinon `IGC2KMZ_CONFIG`, sinon les valeurs par défaut
fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            Config::load(&path)
        }
        None => Ok(Config::default()),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
