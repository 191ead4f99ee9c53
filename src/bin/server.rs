use clap::Parser;
use kaspa_roi::{
    args::ServerArgs, config::RoiConfig, logging::setup_tracing, prices::PriceSnapshot,
    server::run_server,
};
use tracing::error;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = ServerArgs::parse();
    let log_dir = RoiConfig::log_dir_for(&args.config);
    let (_writer, _guard) = setup_tracing(Some(&log_dir)).map_err(std::io::Error::other)?;
    let config = RoiConfig::read_config(Some(&args.config)).map_err(std::io::Error::other)?;

    let prices = match PriceSnapshot::load(&config.prices_file) {
        Ok(prices) => prices,
        Err(e) => {
            error!("Failed to read price snapshot, using defaults: {}", e);
            PriceSnapshot::new()
        }
    };

    run_server(config, prices).await
}
