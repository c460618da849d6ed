use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xkcd_archive::config::{self, AppConfig};
use xkcd_archive::download::{self, HttpFetcher};
use xkcd_archive::search::{self, SearchQuery};
use xkcd_archive::storage::LocalStore;

#[derive(Debug, Parser)]
#[command(
    name = "xkcd-archive",
    about = "Download xkcd comic metadata and search it offline",
    version,
    long_version = env!("ARCHIVE_LONG_VERSION")
)]
struct Cli {
    /// Data directory / 数据目录
    #[arg(long, global = true)]
    dir: Option<PathBuf>,
    /// Max number of errors in sequence / 连续失败上限
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    max_failures: Option<u32>,
    /// JSON configuration file / 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch every comic until too many requests fail in a row
    Download {
        /// Remote base URL / 远程地址
        #[arg(long)]
        base_url: Option<String>,
        /// First id to request / 起始编号
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        start: Option<u32>,
        /// Per-request timeout in seconds / 请求超时
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Print the numbers of comics containing every term
    Search {
        /// Case-insensitive substrings, all must match
        terms: Vec<String>,
    },
}

impl Cli {
    /// File config first, flags on top / 命令行参数覆盖配置文件
    fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut app_config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => AppConfig::default(),
        };

        if let Some(dir) = &self.dir {
            app_config.storage.data_dir = dir.to_string_lossy().to_string();
        }
        if let Some(max_failures) = self.max_failures {
            app_config.download.max_failures = max_failures;
        }
        if let Command::Download { base_url, start, timeout } = &self.command {
            if let Some(base_url) = base_url {
                app_config.download.base_url = base_url.clone();
            }
            if let Some(start) = start {
                app_config.download.start_id = *start;
            }
            if timeout.is_some() {
                app_config.download.request_timeout_secs = *timeout;
            }
        }

        app_config.validate()?;
        Ok(app_config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xkcd_archive=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let app_config = cli.resolve_config()?;
    let store = LocalStore::new(app_config.get_data_dir());

    match cli.command {
        Command::Download { .. } => {
            tracing::info!("Downloading XKCD");
            store
                .ensure_dir()
                .with_context(|| format!("Failed to create data directory {:?}", store.root()))?;

            let fetcher = HttpFetcher::new(app_config.download.clone())?;
            download::run(&fetcher, &store, &app_config.download).await;
        }
        Command::Search { terms } => {
            tracing::info!("Search");
            let query = SearchQuery::new(&terms);

            let stats = tokio::task::spawn_blocking(move || {
                search::search(&store, &query, |num| println!("Found match: {}", num))
            })
            .await?
            .context("Search aborted")?;

            tracing::info!(
                "Scanned {} records ({} unparsable), {} matches",
                stats.scanned,
                stats.malformed,
                stats.matched
            );
        }
    }

    Ok(())
}
