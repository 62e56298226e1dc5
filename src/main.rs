use clap::Parser;
use org_pulse::api::Error;
use org_pulse_app::Args;

/// Prints the contribution aggregation of a GitHub organization as JSON

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let json = org_pulse_app::render(&args).await?;
    println!("{}", json);

    Ok(())
}
