use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "adfetch")]
#[command(about = "Ad Library download service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Server(ServerArgs),
    /// Execute one download request from a JSON file and print the response
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to (defaults to `server.bind_addr`)
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Path to a request body in the `POST /download` format
    #[arg(long)]
    pub request: PathBuf,
}
