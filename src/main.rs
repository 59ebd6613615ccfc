use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use log::{error, info};

use flight_fare::{AppState, Predictor, ServiceConfig, routes};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ServiceConfig::from_env()?;

    let predictor = match Predictor::load(&config.model_path, &config.encoders_path) {
        Ok(predictor) => Some(predictor),
        Err(e) => {
            error!("failed to load artifacts, every prediction will fail: {e}");
            None
        }
    };
    let state = web::Data::new(AppState::new(predictor));

    let addr = config.addr();
    info!("listening at {addr}");

    HttpServer::new(move || {
        App::new()
            .wrap(routes::cors())
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(&addr)
    .with_context(|| format!("failed to bind {addr}"))?
    .run()
    .await?;

    Ok(())
}
