use anyhow::Result;

use crate::cli::{ConfigCommands, OutputFormat};
use crate::config::{self, ProfileConfig};
use crate::output::{print_field, print_json, print_success};

pub fn run(command: &ConfigCommands, profile: &str, format: OutputFormat) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let cfg = config::load_profile(profile)?;
            if format == OutputFormat::Json {
                return print_json(&cfg);
            }
            show(profile, &cfg)?;
        }
        ConfigCommands::Set(args) => {
            let mut cfg = config::load_profile(profile)?;
            cfg.set(&args.key, &args.value)?;
            config::save_profile(profile, &cfg)?;
            print_success(&format!("Set {} = {}", args.key, args.value));
        }
    }
    Ok(())
}

fn show(profile: &str, cfg: &ProfileConfig) -> Result<()> {
    print_field("Profile", profile);
    print_field(
        "Server",
        cfg.server
            .as_deref()
            .unwrap_or(&format!("{} (default)", config::DEFAULT_SERVER)),
    );
    print_field("Format", cfg.format.as_deref().unwrap_or("table"));
    print_field("Session", config::session_path(profile)?.display());
    Ok(())
}
