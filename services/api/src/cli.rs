use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mealbridge::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "mealbridge-api",
    about = "Serve the donation/request lifecycle engine, or walk it on stdout",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (the default when no command is given)
    Serve(ServeArgs),
    /// Walk a donation and a request through the full lifecycle on stdout
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Bind host, overriding MEALBRIDGE_HOST
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Bind port, overriding MEALBRIDGE_PORT
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    match Cli::parse().command {
        Some(Command::Serve(args)) => server::run(args).await,
        Some(Command::Demo(args)) => run_demo(args),
        None => server::run(ServeArgs::default()).await,
    }
}
