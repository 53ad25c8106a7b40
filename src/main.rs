use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use ttlgram::regen::{DirArtifactStore, RegenController, SettingsWatcher};
use ttlgram::{Settings, SynthesisResult, logging};

#[derive(Parser)]
#[command(name = "ttlgram")]
#[command(about = "Generates tagged-template grammars from a configured rule list")]
struct Cli {
    /// Path to the settings file (defaults to the workspace settings)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a settings file
    Init {
        /// Force overwrite existing settings
        #[arg(short, long)]
        force: bool,
    },

    /// Synthesize the grammar once from the current rule list
    Generate,

    /// Watch the settings file and regenerate on rule changes
    Watch,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings_path = cli.config.clone().unwrap_or_else(Settings::settings_path);

    match cli.command {
        Commands::Init { force } => {
            if settings_path.exists() && !force {
                eprintln!(
                    "Settings file already exists at: {}",
                    settings_path.display()
                );
                eprintln!("Use --force to overwrite");
                std::process::exit(1);
            }

            if let Err(e) = Settings::default().save(&settings_path) {
                eprintln!("Failed to write settings: {e}");
                std::process::exit(1);
            }
            println!("Created {}", settings_path.display());
            println!("Add rules under `rules`, e.g. rules = [\"html:text.html.basic\"]");
        }

        Commands::Config => {
            let settings = load_settings(&settings_path);
            match toml::to_string_pretty(&settings) {
                Ok(toml_str) => println!("{toml_str}"),
                Err(e) => {
                    eprintln!("Error displaying config: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Generate => {
            let settings = load_settings(&settings_path);
            logging::init_with_config(&settings.logging);

            let mut controller = RegenController::builder()
                .store(Arc::new(DirArtifactStore::new(settings.grammar_dir.clone())))
                .debounce_ms(settings.debounce_ms)
                .build()
                .unwrap_or_else(|e| {
                    eprintln!("Failed to build controller: {e}");
                    std::process::exit(1);
                });

            match controller.synthesize_once(&settings.rules).await {
                Ok(SynthesisResult::Generated(path)) => {
                    println!("Generated {}", path.display());
                }
                Ok(SynthesisResult::Cached) => {
                    println!("Grammar already up to date");
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Watch => {
            let settings = load_settings(&settings_path);
            logging::init_with_config(&settings.logging);

            let controller = RegenController::builder()
                .store(Arc::new(DirArtifactStore::new(settings.grammar_dir.clone())))
                .debounce_ms(settings.debounce_ms)
                .build()
                .unwrap_or_else(|e| {
                    eprintln!("Failed to build controller: {e}");
                    std::process::exit(1);
                });

            let (tx, rx) = mpsc::channel(100);

            // Seed the debounced path with the current list, mirroring a
            // subscribe-time notification.
            if tx.send(settings.rules.clone()).await.is_err() {
                eprintln!("Controller channel closed before start");
                std::process::exit(1);
            }

            let watcher = SettingsWatcher::new(settings_path, tx).unwrap_or_else(|e| {
                eprintln!("Failed to watch settings: {e}");
                std::process::exit(1);
            });

            tokio::spawn(watcher.run());
            controller.run(rx).await;
        }
    }
}

fn load_settings(path: &PathBuf) -> Settings {
    Settings::load_from(path).unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        eprintln!("Using default configuration for now.");
        Settings::default()
    })
}
