mod app;
mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use app::App;
use cli::{CasesCommands, Cli, Commands, ProfileCommands, SuggestionsCommands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing(cli.verbose);

    let profile_cfg = config::load_profile(&cli.profile)?;
    let format = config::resolve_format(cli.format, &profile_cfg)?;

    // Config commands must work even when the saved server URL is broken.
    if let Commands::Config(args) = &cli.command {
        return commands::config::run(&args.command, &cli.profile, format);
    }

    let server = config::resolve_server(cli.server.as_deref(), &profile_cfg);
    tracing::debug!(%server, profile = %cli.profile, "starting");
    let app = App::new(server, cli.profile.clone(), format)?;

    match &cli.command {
        Commands::Login(args) => commands::auth::login(&app, args).await?,
        Commands::Logout => commands::auth::logout(&app)?,
        Commands::Whoami => commands::auth::whoami(&app).await?,
        Commands::Dashboard => commands::dashboard::show(&app).await?,
        Commands::Predict(args) => commands::predict::run(&app, args).await?,
        Commands::Cases(args) => match &args.command {
            CasesCommands::List(list) => commands::cases::list(&app, list).await?,
            CasesCommands::Show(show) => commands::cases::show(&app, show).await?,
        },
        Commands::Suggestions(args) => match &args.command {
            SuggestionsCommands::Stats => commands::suggestions::stats(&app).await?,
            SuggestionsCommands::Generate(generate) => {
                commands::suggestions::generate(&app, generate).await?
            }
        },
        Commands::Profile(args) => match &args.command {
            ProfileCommands::Show => commands::profile::show(&app).await?,
            ProfileCommands::Update(update) => commands::profile::update(&app, update).await?,
        },
        Commands::Config(_) => {}
    }

    Ok(())
}
