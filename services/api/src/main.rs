use mealbridge_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("mealbridge-api: {err}");
        std::process::exit(1);
    }
}
