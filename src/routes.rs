use actix_cors::Cors;
use actix_web::{HttpResponse, get, post, web};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{PredictRequest, Predictor, ServiceErr};

const CURRENCY: &str = "INR";

/// The state shared by every worker. `None` when the artifacts failed to load.
#[derive(Debug, Default)]
pub struct AppState {
    predictor: Option<Predictor>,
}

impl AppState {
    pub fn new(predictor: Option<Predictor>) -> Self {
        Self { predictor }
    }

    pub fn predictor(&self) -> Option<&Predictor> {
        self.predictor.as_ref()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub price: f64,
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

/// Registers the service's routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(predict).service(health);
}

/// Allows any origin, method and header.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
}

// The body is parsed by hand so that an unavailable model takes precedence over a bad body.
#[post("/predict")]
async fn predict(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ServiceErr> {
    let predictor = state.predictor().ok_or(ServiceErr::Unavailable)?;

    let request: PredictRequest = serde_json::from_slice(&body)
        .map_err(|e| ServiceErr::BadRequest(format!("invalid request body: {e}")))?;
    let trip = request.into_trip(predictor.encoders())?;
    let price = predictor.predict(&trip)?;
    debug!(price = price; "prediction served");

    Ok(HttpResponse::Ok().json(PredictResponse {
        price,
        currency: CURRENCY.to_string(),
    }))
}

#[get("/health")]
async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: state.predictor().is_some(),
    })
}
