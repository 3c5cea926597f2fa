use clap::Parser;
use pagewrightlib::{DirTree, Site, SiteFile};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_LOG_FILTER: &str = "pagewright=info,pagewrightlib=info";

#[derive(clap::Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Directory containing the shared and page templates
    #[clap(long, default_value = "templates", env = "PAGEWRIGHT_ROOT")]
    root: PathBuf,

    #[clap(long, default_value = "site.toml", env = "PAGEWRIGHT_CONFIG")]
    config: PathBuf,

    /// Address to serve on
    #[clap(long, global = true, default_value = "127.0.0.1:8000", env = "PAGEWRIGHT_BIND")]
    bind: SocketAddr,

    /// Defaults to `serve`
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Serve every configured page
    Serve,
    /// Compile every configured page and exit
    Check,
}

impl Args {
    fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}

fn build_site(args: &Args) -> Result<Site, eyre::Report> {
    let mut file = SiteFile::load(&args.config)?;
    let not_found = file.not_found.take();
    let (config, pages) = file.into_parts();

    let mut site = Site::new(config.build(), Arc::new(DirTree::new(&args.root)))?;
    for page in pages {
        site.page(page)?;
    }
    if let Some(page) = not_found {
        site.not_found_page(page);
    }
    Ok(site)
}

#[tokio::main]
async fn main() -> Result<(), eyre::Report> {
    dotenv::dotenv().ok();
    color_eyre::install()?;

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let site = build_site(&args)?;

    match args.command() {
        Command::Serve => {
            info!(bind = %args.bind, pages = site.pages().len(), "serving site");
            site.run(args.bind).await?;
        }
        Command::Check => {
            let pages = site.pages().len();
            site.into_endpoint()?;
            info!(pages, "all pages compiled");
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {

    #![allow(warnings, unused)]
    use super::*;

    #[test]
    fn serves_without_subcommand() {
        let args = Args::try_parse_from(["pagewright", "--root", "t", "--config", "s.toml"])
            .expect("arguments should parse");

        assert_eq!(args.command(), Command::Serve);
        assert_eq!(args.bind, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn accepts_bind_before_or_after_serve() {
        let before = Args::try_parse_from(["pagewright", "--bind", "0.0.0.0:9000"]).unwrap();
        let after = Args::try_parse_from(["pagewright", "serve", "--bind", "0.0.0.0:9000"]).unwrap();

        assert_eq!(before.command(), Command::Serve);
        assert_eq!(after.command(), Command::Serve);
        assert_eq!(before.bind, after.bind);
        assert_eq!(after.bind.port(), 9000);
    }

    #[test]
    fn parses_check() {
        let args = Args::try_parse_from(["pagewright", "check"]).unwrap();
        assert_eq!(args.command(), Command::Check);
    }
}
