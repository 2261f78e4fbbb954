//! Tradedesk command line tool.

mod cli;
mod config;
mod paths;
mod render;
mod tables;

use std::fs;
use std::fs::File;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use simplelog::Config as LogConfig;
use simplelog::LevelFilter;
use simplelog::WriteLogger;
use tradedesk_lib::CrmClient;
use tradedesk_lib::api::EntitySource;
use tradedesk_lib::auth::StaticSession;
use tradedesk_lib::model::Buyer;
use tradedesk_lib::model::Contract;
use tradedesk_lib::model::Entity;
use tradedesk_lib::model::Seller;
use tradedesk_lib::model::Trader;
use tradedesk_lib::table::ColumnDescriptor;
use tradedesk_lib::table::FilterDescriptor;
use tradedesk_lib::table::TableController;
use tradedesk_lib::table::TableOptions;
use tradedesk_lib::table::TableView;

use crate::cli::Cli;
use crate::cli::Command;
use crate::cli::EntityArg;
use crate::cli::ListArgs;
use crate::config::Config;
use crate::config::Resolved;
use crate::render::render_text;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Paths => {
            let show = |p: Option<std::path::PathBuf>| {
                p.map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unavailable>".to_string())
            };
            println!("config: {}", show(cli.config.or_else(paths::config_file)));
            println!("log:    {}", show(paths::log_file()));
            Ok(ExitCode::SUCCESS)
        }
        Command::List(args) => {
            let settings = load_settings(cli.config.as_deref())?;
            let client = CrmClient::builder()
                .url(settings.url.clone())
                .session(
                    StaticSession::new(settings.token.clone())
                        .with_partition_key(settings.partition_key.clone()),
                )
                .timeout(settings.timeout)
                .retry(settings.retry_config())
                .build()
                .context("create HTTP client")?;

            let view = match args.entity {
                EntityArg::Buyers => {
                    list::<Buyer>(client, &args, tables::party_columns(), Vec::new()).await?
                }
                EntityArg::Sellers => {
                    list::<Seller>(client, &args, tables::party_columns(), Vec::new()).await?
                }
                EntityArg::Traders => {
                    list::<Trader>(client, &args, tables::party_columns(), Vec::new()).await?
                }
                EntityArg::Contracts => {
                    list::<Contract>(
                        client,
                        &args,
                        tables::contract_columns(),
                        tables::contract_filters(),
                    )
                    .await?
                }
            };

            print!("{}", render_text(&view));
            Ok(if view.error.is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}

/// Fetches the page described by `args` and returns its view.
async fn list<E: Entity>(
    client: CrmClient,
    args: &ListArgs,
    columns: Vec<ColumnDescriptor<E>>,
    filters: Vec<FilterDescriptor>,
) -> Result<TableView> {
    let args = args.clone();
    let table = TableController::builder(EntitySource::<E>::new(client))
        .columns(columns)
        .filters(filters)
        .options(
            TableOptions::default()
                .min_loading(Duration::ZERO)
                .forward_columns(false),
        )
        .initial_query(move |query, filter_set| {
            if let Some(size) = args.page_size {
                query.set_page_size(size);
            }
            if let Some(search) = args.search {
                query.set_search(search);
            }
            for (key, value) in &args.filters {
                query.toggle_filter(filter_set, key, value);
            }
            if let Some(sort) = args.sort {
                query.set_sort(sort.key, sort.direction);
            }
            query.set_page(args.page);
        })
        .build()?;

    log::info!("listing {} with {:?}", E::PATH, table.params());
    table.refresh().await.context("fetch task failed")?;
    Ok(table.view(&tables::label))
}

fn load_settings(explicit: Option<&Path>) -> Result<Resolved> {
    dotenvy::dotenv().ok();

    let path = explicit.map(Path::to_path_buf).or_else(paths::config_file);
    let mut config = match &path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env(|key| std::env::var(key).ok());
    config.resolve()
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    paths::rotate_logs();
    let Some(log_file) = paths::log_file() else { return };
    if let Some(dir) = log_file.parent()
        && let Err(e) = fs::create_dir_all(dir)
    {
        eprintln!("warning: cannot create log directory {}: {}", dir.display(), e);
        return;
    }

    match File::create(&log_file) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, LogConfig::default(), file) {
                eprintln!("warning: failed to initialize logger: {}", e);
            }
        }
        Err(e) => eprintln!("warning: cannot create {}: {}", log_file.display(), e),
    }
}
