use crate::config::AppConfig;
use crate::core::{AppError, Result};
use crate::permission::{Account, PermissionEvent, read_journal};

use super::{AdminSession, Cli, Commands, ConfigSubcommands, Settings, load_read_only};

pub fn run(cli: &Cli) -> Result<()> {
    if let Commands::Config { command } = &cli.command {
        return run_config(cli, command);
    }

    let config = AppConfig::load_from(config_path(cli).as_deref())?;
    let settings = Settings::resolve(cli, &config)?;

    match &cli.command {
        Commands::Configure {
            account,
            status,
            caller,
        } => {
            let account: Account = account.parse()?;
            let caller = caller
                .as_deref()
                .map(str::parse::<Account>)
                .transpose()?;

            let session = AdminSession::open(&settings)?;
            let changed = session.configure(account, *status, caller)?;
            println!("{}", if changed { "changed" } else { "unchanged" });
        }
        Commands::Check { account, require } => {
            let account: Account = account.parse()?;
            let registry = load_read_only(&settings)?;

            println!("{}", registry.is_permitted(&account));
            if *require {
                registry.require_permitted(&account)?;
            }
        }
        Commands::List => {
            for account in load_read_only(&settings)?.permitted_accounts() {
                println!("{account}");
            }
        }
        Commands::History => {
            for entry in read_journal(&settings.journal_path)? {
                let PermissionEvent::PermissionChanged {
                    account,
                    new_status,
                } = entry.event;
                println!(
                    "{}\t{}\t{}\t{}",
                    entry.sequence,
                    entry.recorded_at.to_rfc3339(),
                    account,
                    new_status
                );
            }
        }
        Commands::Config { .. } => unreachable!(),
    }

    Ok(())
}

fn config_path(cli: &Cli) -> Option<std::path::PathBuf> {
    cli.config.clone().or_else(AppConfig::get_config_path)
}

fn run_config(cli: &Cli, command: &ConfigSubcommands) -> Result<()> {
    match command {
        ConfigSubcommands::Init => {
            let path = config_path(cli).ok_or_else(|| {
                AppError::Config("Could not determine config directory".to_string())
            })?;
            AppConfig::init_at(&path)?;
            println!("✓ Created config file at {}", path.display());
        }
        ConfigSubcommands::Where => match config_path(cli) {
            Some(path) => println!("{}", path.display()),
            None => {
                return Err(AppError::Config(
                    "Could not determine config path".to_string(),
                ));
            }
        },
        ConfigSubcommands::Show => {
            let config = AppConfig::load_from(config_path(cli).as_deref())?;
            print!("{}", config.render()?);
        }
    }
    Ok(())
}
