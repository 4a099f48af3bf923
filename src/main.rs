use clap::Parser;
use pdfqa::cli::commands;
use pdfqa::cli::{Cli, Commands};
use pdfqa::{AppContext, Settings};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Secrets such as the model API key may live in .env
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        eprintln!("Using default configuration for now.");
        Settings::default()
    });

    pdfqa::logging::init_with_config(&settings.logging);

    match cli.command {
        Commands::Init { force } => commands::init::run_init(force),
        Commands::Config => commands::init::run_config(&settings),
        Commands::Serve { bind } => commands::serve::run(settings, bind).await,
        Commands::Extract { path } => commands::extract::run(&path),
        Commands::CheckDb { repair } => commands::check_db::run(&settings, repair),
        Commands::Add { path } => {
            let ctx = AppContext::from_settings(settings)?;
            commands::documents::run_add(&ctx, &path).await
        }
        Commands::List { json } => {
            let ctx = AppContext::from_settings(settings)?;
            commands::documents::run_list(&ctx, json)
        }
        Commands::Remove { id } => {
            let ctx = AppContext::from_settings(settings)?;
            commands::documents::run_remove(&ctx, id)
        }
        Commands::Ask { id, question } => {
            let ctx = AppContext::from_settings(settings)?;
            commands::ask::run_ask(&ctx, id, &question).await
        }
        Commands::Suggest { id } => {
            let ctx = AppContext::from_settings(settings)?;
            commands::ask::run_suggest(&ctx, id).await
        }
    }
}
