mod config;
mod list;
mod paths;
mod render;
mod views;

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use simplelog::LevelFilter;
use simplelog::WriteLogger;
use songbook_lib::CmsClient;
use songbook_lib::pages::SongScope;
use songbook_lib::pages::authors::NameOrder;
use songbook_table::controller::ROWS_PER_PAGE_OPTIONS;
use thiserror::Error;

use crate::config::Config;
use crate::config::ConfigError;
use crate::config::Overrides;
use crate::config::Settings;
use crate::list::ListOptions;
use crate::list::ViewError;

/// Browse the songbook catalog from the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Base URL of the CMS
    #[arg(long, env = "SONGBOOK_CMS_URL", global = true)]
    cms_url: Option<String>,
    /// Static access token
    #[arg(long, env = "SONGBOOK_CMS_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,
    /// Settings file to use instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List songs
    Songs {
        #[command(flatten)]
        list: ListArgs,
        /// Only songs by this author
        #[arg(long, conflicts_with = "genre")]
        author: Option<i64>,
        /// Only songs in this genre
        #[arg(long)]
        genre: Option<i64>,
    },
    /// List authors
    Authors {
        #[command(flatten)]
        list: ListArgs,
        /// Print every author grouped by initial instead of one page
        #[arg(long)]
        grouped: bool,
        /// Group by first name rather than family name
        #[arg(long, requires = "grouped")]
        by_first_name: bool,
    },
    /// List genres
    Genres {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Show one song
    Song { id: String },
    /// List the published static pages
    Pages,
    /// Show one static page
    Page { id: i64 },
    /// Search songs, authors and genres
    Search {
        term: String,
        /// Only search songs, returning more of them
        #[arg(long)]
        songs: bool,
    },
}

/// Options shared by the table listings.
#[derive(Debug, Clone, clap::Args)]
struct ListArgs {
    /// Filter as JSON, e.g. '{"pdf":true,"genres":[3]}'
    #[arg(long)]
    filter: Option<String>,
    /// Column to sort by
    #[arg(long)]
    sort: Option<String>,
    /// Sort descending
    #[arg(long)]
    desc: bool,
    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    page: usize,
    /// Rows per page (5, 10, 25, 50, 100 or 200)
    #[arg(long, value_parser = parse_rows_per_page)]
    rows_per_page: Option<usize>,
}

fn parse_rows_per_page(raw: &str) -> Result<usize, String> {
    let allowed = || {
        ROWS_PER_PAGE_OPTIONS
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    match raw.parse::<usize>() {
        Ok(n) if ROWS_PER_PAGE_OPTIONS.contains(&n) => Ok(n),
        _ => Err(format!("expected one of {}", allowed())),
    }
}

impl Command {
    fn list_args(&self) -> Option<&ListArgs> {
        match self {
            Command::Songs { list, .. } | Command::Authors { list, .. } | Command::Genres { list } => Some(list),
            _ => None,
        }
    }
}

fn scope(author: Option<i64>, genre: Option<i64>) -> SongScope {
    match (author, genre) {
        (Some(id), _) => SongScope::Author(id),
        (None, Some(id)) => SongScope::Genre(id),
        (None, None) => SongScope::All,
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Cms(#[from] songbook_lib::error::Error),
    #[error(transparent)]
    View(#[from] ViewError),
}

/// Starts logging into the cache directory. Runs without a log if the
/// directory is unavailable.
fn init_logging(verbose: bool) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    if let Some(dir) = path.parent()
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("Logging disabled: {}", e);
        return;
    }
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    match File::create(&path) {
        Ok(file) => {
            if let Err(e) = WriteLogger::init(level, simplelog::Config::default(), file) {
                eprintln!("Logging disabled: {}", e);
            }
        }
        Err(e) => eprintln!("Logging disabled: {}: {}", path.display(), e),
    }
}

fn build_client(config: &Config) -> Result<CmsClient, CliError> {
    let builder = CmsClient::builder()
        .url(&config.cms_url)
        .timeout(config.timeout);
    let client = match &config.access_token {
        Some(token) => builder.access_token(token).build()?,
        None => builder.build()?,
    };
    Ok(client)
}

async fn run(args: Args) -> Result<String, CliError> {
    let settings = Settings::load_default(args.config.as_deref())?;
    let config = Config::resolve(
        settings,
        Overrides {
            cms_url: args.cms_url.clone(),
            access_token: args.token.clone(),
            rows_per_page: args.command.list_args().and_then(|list| list.rows_per_page),
        },
    )?;
    log::info!("{:?} against {}", args.command, config.cms_url);
    let client = build_client(&config)?;

    let options = |list: &ListArgs| ListOptions {
        filter: list.filter.clone(),
        sort: list.sort.clone(),
        descending: list.desc,
        page: list.page,
        rows_per_page: config.rows_per_page,
    };

    let output = match &args.command {
        Command::Songs { list, author, genre } => {
            let view = list::show_songs(&client, scope(*author, *genre), &options(list)).await?;
            render::render_page(&view)
        }
        Command::Authors {
            grouped: true,
            by_first_name,
            ..
        } => {
            let order = if *by_first_name {
                NameOrder::FirstName
            } else {
                NameOrder::LastName
            };
            views::grouped_authors(&client, order).await?
        }
        Command::Authors { list, .. } => render::render_page(&list::show_authors(&client, &options(list)).await?),
        Command::Genres { list } => render::render_page(&list::show_genres(&client, &options(list)).await?),
        Command::Song { id } => views::song(&client, id).await?,
        Command::Pages => views::static_pages(&client).await?,
        Command::Page { id } => views::static_page(&client, *id).await?,
        Command::Search { term, songs } => views::search(&client, term, *songs).await?,
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_parse_songs_with_scope() {
        let args = Args::try_parse_from([
            "songbook",
            "songs",
            "--cms-url",
            "https://cms.example.org",
            "--author",
            "4",
            "--sort",
            "title",
            "--desc",
        ])
        .unwrap();
        let Command::Songs { list, author, genre } = args.command else {
            panic!("expected the songs command");
        };
        assert_eq!(scope(author, genre), SongScope::Author(4));
        assert!(list.desc);
        assert_eq!(list.page, 0);
        assert_eq!(args.cms_url.as_deref(), Some("https://cms.example.org"));
    }

    #[test]
    fn test_author_and_genre_conflict() {
        let result = Args::try_parse_from(["songbook", "songs", "--author", "4", "--genre", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(Args::try_parse_from(["songbook", "playlists"]).is_err());
    }

    #[test]
    fn test_rows_per_page_accepts_every_page_size() {
        for size in ROWS_PER_PAGE_OPTIONS {
            let size_arg = size.to_string();
            let args = Args::try_parse_from(["songbook", "genres", "--rows-per-page", size_arg.as_str()]).unwrap();
            assert_eq!(args.command.list_args().and_then(|list| list.rows_per_page), Some(size));
        }
    }

    #[test]
    fn test_rows_per_page_help_names_every_page_size() {
        let command = Args::command();
        let help = command
            .find_subcommand("songs")
            .and_then(|songs| songs.get_arguments().find(|arg| arg.get_id() == "rows_per_page"))
            .and_then(|arg| arg.get_help())
            .map(|help| help.to_string())
            .unwrap();
        for size in ROWS_PER_PAGE_OPTIONS {
            assert!(help.contains(&size.to_string()), "{} missing from {:?}", size, help);
        }
    }

    #[test]
    fn test_rows_per_page_rejects_other_sizes() {
        assert!(Args::try_parse_from(["songbook", "genres", "--rows-per-page", "7"]).is_err());
        let message = parse_rows_per_page("7").unwrap_err();
        assert_eq!(message, "expected one of 5, 10, 25, 50, 100, 200");
    }

    #[test]
    fn test_parse_grouped_authors() {
        let args = Args::try_parse_from(["songbook", "authors", "--grouped", "--by-first-name"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Authors {
                grouped: true,
                by_first_name: true,
                ..
            }
        ));
        assert!(Args::try_parse_from(["songbook", "authors", "--by-first-name"]).is_err());
    }

    #[test]
    fn test_parse_detail_and_search() {
        let args = Args::try_parse_from(["songbook", "song", "a1b2"]).unwrap();
        assert!(matches!(args.command, Command::Song { ref id } if id == "a1b2"));
        assert!(args.command.list_args().is_none());

        let args = Args::try_parse_from(["songbook", "page", "3", "-v"]).unwrap();
        assert!(matches!(args.command, Command::Page { id: 3 }));
        assert!(args.verbose);

        let args = Args::try_parse_from(["songbook", "search", "grace", "--songs"]).unwrap();
        assert!(matches!(args.command, Command::Search { ref term, songs: true } if term == "grace"));

        assert!(Args::try_parse_from(["songbook", "page", "about"]).is_err());
    }
}
