//! Command line arguments.

use std::path::PathBuf;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use tradedesk_lib::table::Sort;
use tradedesk_lib::table::SortDirection;

#[derive(Parser)]
#[command(
    name = "tradedesk",
    version,
    about = "Browse buyers, sellers, traders and contracts from the command line"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file to read instead of the platform default.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print one page of an entity list.
    List(ListArgs),

    /// Print where the config file and logs are expected.
    Paths,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// What to list.
    #[arg(value_enum)]
    pub entity: EntityArg,

    /// Page to show (1-based).
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Rows per page (5, 10, 20, 25, 50 or 100).
    #[arg(long, value_parser = parse_page_size)]
    pub page_size: Option<u32>,

    /// Free-text search.
    #[arg(long)]
    pub search: Option<String>,

    /// Filter selection; repeat to select several values.
    #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Sort column with an optional direction.
    #[arg(long, value_name = "KEY[:asc|:desc]", value_parser = parse_sort)]
    pub sort: Option<Sort>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityArg {
    Buyers,
    Sellers,
    Traders,
    Contracts,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", raw))?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return Err(format!("expected KEY=VALUE, got `{}`", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_sort(raw: &str) -> Result<Sort, String> {
    let (key, direction) = match raw.rsplit_once(':') {
        Some((key, "asc")) => (key, SortDirection::Asc),
        Some((key, "desc")) => (key, SortDirection::Desc),
        Some((_, other)) => return Err(format!("unknown sort direction `{}`", other)),
        None => (raw, SortDirection::Asc),
    };
    if key.is_empty() {
        return Err("sort key is empty".to_string());
    }
    Ok(Sort::new(key, direction))
}

fn parse_page_size(raw: &str) -> Result<u32, String> {
    let size: u32 = raw.parse().map_err(|e| format!("{}", e))?;
    if tradedesk_lib::table::PAGE_SIZE_OPTIONS.contains(&size) {
        Ok(size)
    } else {
        Err(format!(
            "page size must be one of {:?}",
            tradedesk_lib::table::PAGE_SIZE_OPTIONS
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("type=purchase"),
            Ok(("type".to_string(), "purchase".to_string()))
        );
        assert!(parse_filter("type").is_err());
        assert!(parse_filter("=x").is_err());
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("folio"), Ok(Sort::asc("folio")));
        assert_eq!(parse_sort("createdAt:desc"), Ok(Sort::desc("createdAt")));
        assert!(parse_sort("folio:sideways").is_err());
        assert!(parse_sort(":desc").is_err());
    }

    #[test]
    fn test_parse_page_size() {
        assert_eq!(parse_page_size("50"), Ok(50));
        assert!(parse_page_size("7").is_err());
    }

    #[test]
    fn test_list_command_parses() {
        let cli = Cli::try_parse_from([
            "tradedesk",
            "list",
            "contracts",
            "--filter",
            "type=sale",
            "--filter",
            "status=active",
            "--sort",
            "folio:desc",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.entity, EntityArg::Contracts);
                assert_eq!(args.filters.len(), 2);
                assert_eq!(args.page, 1);
                assert_eq!(args.sort, Some(Sort::desc("folio")));
            }
            Command::Paths => panic!("expected list"),
        }
    }
}
