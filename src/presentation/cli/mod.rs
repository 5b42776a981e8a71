pub mod ingest;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ingest::IngestCommand;

#[derive(Debug, Parser)]
#[command(author, version, about = "Ingest PNGs and serve them as an SEO catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Upload every PNG in a directory and add it to the catalog
    Ingest(IngestCommand),
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(
        long,
        env = "PNGCATALOG_DATABASE_URL",
        default_value = "sqlite://pngcatalog.db"
    )]
    pub database_url: String,

    #[arg(long, env = "PNGCATALOG_BIND_ADDRESS", default_value = "127.0.0.1:5000")]
    pub bind_address: SocketAddr,

    /// Public site origin used for canonical links and the sitemap
    #[arg(
        long,
        env = "PNGCATALOG_SITE_URL",
        default_value = "http://localhost:5000"
    )]
    pub site_url: String,

    /// CDN base that asset URLs are rewritten onto in SEO pages
    #[arg(long, env = "PNGCATALOG_CDN_URL")]
    pub cdn_url: Option<String>,

    /// Built frontend to serve, with fallback to its index.html
    #[arg(long, env = "PNGCATALOG_PUBLIC_DIR")]
    pub public_dir: Option<PathBuf>,
}
