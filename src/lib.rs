pub mod config;
pub mod error;
pub mod predictor;
pub mod request;
pub mod routes;

pub use config::ServiceConfig;
pub use error::ServiceErr;
pub use predictor::Predictor;
pub use request::PredictRequest;
pub use routes::AppState;
