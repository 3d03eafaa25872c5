//! sobject-browser: list and inspect the SObjects of the SF CLI default org.
//!
//! Usage:
//!   sobject-browser entities --search acc
//!   sobject-browser fields Account
//!   sobject-browser fields Account --field AnnualRevenue
//!   sobject-browser show Account
//!   sobject-browser links Account --subpath layouts
//!   sobject-browser --target-org whoami
//!   sobject-browser cache clear

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use sobject_browser::auth::{EnvExchange, SessionExchange, SfCliExchange, SfdxConfig, TargetKey};
use sobject_browser::tooling::{setup_url, SetupSubpath};
use sobject_browser::view::{
    entity_actions, entity_detail, entity_row, field_detail, field_row, render_rows,
    search_entities,
};
use sobject_browser::{BrowserConfig, CredentialResolver, KeyValueCache, QueryRunner, SessionProvider};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sobject-browser", version)]
#[command(about = "Browse Salesforce SObject metadata from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Keep the cache in memory for this run only
    #[arg(long, global = true)]
    no_cache: bool,

    /// Browse the default org (target-org) instead of the default Dev Hub
    #[arg(long, global = true)]
    target_org: bool,

    /// Take the session from SF_INSTANCE_URL and SF_ACCESS_TOKEN instead of `sf`
    #[arg(long, global = true)]
    env_auth: bool,

    /// Cache directory
    #[arg(long, global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// LIMIT for entity and field queries
    #[arg(long, global = true, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    limit: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List layoutable entities
    #[command(alias = "ls")]
    Entities {
        /// Only entities whose name, labels, key prefix or ids contain this text
        #[arg(short, long)]
        search: Option<String>,

        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the fields of an entity
    Fields {
        /// Entity API name, e.g. Account
        entity: String,

        /// Show the detail of this field instead of the list
        #[arg(long, value_name = "FIELD")]
        field: Option<String>,

        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the detail pane and actions of an entity
    Show {
        /// Entity API name
        entity: String,
    },

    /// Print Object Manager setup links of an entity
    Links {
        /// Entity API name
        entity: String,

        /// Only this setup page (e.g. details, layouts, "validation rules")
        #[arg(long)]
        subpath: Option<SetupSubpath>,
    },

    /// Show the org the browser talks to
    Whoami,

    /// Manage the cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// Delete every entry for the selected target
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            for cause in err.chain().skip(1) {
                eprintln!("  caused by: {cause}");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = BrowserConfig::from_env().context("invalid environment configuration")?;
    if cli.target_org {
        config.target = TargetKey::Org;
    }
    if cli.no_cache {
        config.cache_enabled = false;
    }
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = Some(dir);
    }
    if let Some(limit) = cli.limit {
        config.limit = limit;
    }

    let cache = config.open_cache()?;

    if cli.env_auth {
        execute(cli.command, &config, cache, EnvExchange).await
    } else {
        execute(cli.command, &config, cache, SfCliExchange::new()).await
    }
}

async fn execute<E: SessionExchange>(
    command: Command,
    config: &BrowserConfig,
    cache: Arc<dyn KeyValueCache>,
    exchange: E,
) -> anyhow::Result<()> {
    let resolver = CredentialResolver::new(Arc::new(SfdxConfig::load(config.target)), cache.clone());
    let sessions = SessionProvider::new(resolver, exchange, cache.clone())
        .with_client_config(config.client.clone())
        .with_api_version(config.api_version.clone());
    let runner = QueryRunner::new(sessions, cache).with_limit(config.limit);

    match command {
        Command::Entities { search, json } => {
            let entities = runner.list_entities().await?;
            let matched = search_entities(&entities, search.as_deref().unwrap_or_default());
            if json {
                print_json(&matched)?;
            } else {
                let rows: Vec<_> = matched.into_iter().map(entity_row).collect();
                print!("{}", render_rows(&rows));
            }
        }
        Command::Fields {
            entity,
            field: Some(name),
            json,
        } => {
            let fields = runner.list_fields(&entity).await?;
            let Some(field) = fields
                .iter()
                .find(|f| f.qualified_api_name.eq_ignore_ascii_case(&name))
            else {
                anyhow::bail!("{entity} has no field named {name}");
            };
            if json {
                print_json(field)?;
            } else {
                print!("{}", field_detail(field));
            }
        }
        Command::Fields {
            entity,
            field: None,
            json,
        } => {
            let fields = runner.list_fields(&entity).await?;
            if json {
                print_json(&fields)?;
            } else {
                let rows: Vec<_> = fields.iter().map(field_row).collect();
                print!("{}", render_rows(&rows));
            }
        }
        Command::Show { entity } => {
            let entity = runner.find_entity(&entity).await?;
            let base = runner.base_url().await?;
            print!("{}", entity_detail(&entity, &base));
            for section in entity_actions(&entity, &base) {
                println!();
                print!("{section}");
            }
        }
        Command::Links { entity, subpath } => {
            let entity = runner.find_entity(&entity).await?;
            let base = runner.base_url().await?;
            let name = entity.qualified_api_name.as_str();
            match subpath {
                Some(sub) => println!("{}", setup_url(&base, name, Some(sub))),
                None => {
                    for sub in SetupSubpath::ALL {
                        println!("{:<24}{}", sub.label(), setup_url(&base, name, Some(sub)));
                    }
                }
            }
        }
        Command::Whoami => {
            let session = runner.sessions().session().await?;
            let record = session.record();
            println!("target        {}", config.target);
            println!("username      {}", record.username);
            println!("instance url  {}", record.instance_url);
            println!("api version   {}", record.api_version);
            println!("base url      {}", record.base_url);
        }
        Command::Cache {
            command: CacheCommand::Clear,
        } => {
            let cache = runner.cache();
            let removed = cache.keys()?.len();
            cache.clear()?;
            info!(target_key = %config.target, removed, "Cache cleared");
            println!("Cleared {removed} cache entries for {}", config.target);
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
