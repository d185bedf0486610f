use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use jogjastay_core::catalog;
use jogjastay_store::{roles, run_migration, Role, Store};

#[derive(Debug, Parser)]
#[command(name = "jogjastay-cli")]
#[command(about = "Jogjastay operations command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate the hotel catalog file without touching the store.
    Validate {
        /// Catalog path; defaults to JOGJASTAY_HOTELS_PATH.
        #[arg(long)]
        hotels_path: Option<PathBuf>,
    },
    /// Run the catalog migration against the configured store file.
    Seed {
        /// Catalog path; defaults to JOGJASTAY_HOTELS_PATH.
        #[arg(long)]
        hotels_path: Option<PathBuf>,
    },
    /// Grant a role to a user, recorded in the audit log.
    GrantRole {
        uid: String,
        /// admin or user
        role: Role,
        /// Who is performing the grant, for the audit log.
        #[arg(long, default_value = "cli")]
        granted_by: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = jogjastay_core::load_app_config_from_env()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { hotels_path } => {
            let path = hotels_path.unwrap_or(config.hotels_path);
            let catalog = catalog::load_catalog(&path)
                .with_context(|| format!("catalog at {} failed validation", path.display()))?;
            println!("catalog ok: {} hotels", catalog.hotels.len());
        }
        Commands::Seed { hotels_path } => {
            let path = hotels_path.unwrap_or(config.hotels_path);
            let catalog = catalog::load_catalog(&path)
                .with_context(|| format!("catalog at {} failed validation", path.display()))?;
            let store = open_store(config.store_path.as_deref()).await?;
            let report = run_migration(&store, &catalog.hotels).await?;
            println!(
                "seeding done: created={} skipped={} failed={}",
                report.created, report.skipped, report.failed
            );
        }
        Commands::GrantRole {
            uid,
            role,
            granted_by,
        } => {
            let store = open_store(config.store_path.as_deref()).await?;
            roles::assign_role(&store, &uid, role, &granted_by).await?;
            println!("granted {role} to {uid}");
        }
    }

    Ok(())
}

async fn open_store(path: Option<&std::path::Path>) -> anyhow::Result<Store> {
    let path = path.context(
        "JOGJASTAY_STORE_PATH must point at a store file; an in-memory store would discard writes",
    )?;
    Ok(Store::open(path).await?)
}
