//! Binary crate wiring: CLI parsing, in-memory stores and the HTTP server
//! around the `mealbridge` lifecycle engine.

mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use mealbridge::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
