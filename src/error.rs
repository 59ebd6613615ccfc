use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use machine_learning::MlErr;
use serde::Serialize;

/// The failures a prediction request can end in.
#[derive(Debug)]
pub enum ServiceErr {
    /// The artifacts could not be loaded at startup.
    Unavailable,
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl fmt::Display for ServiceErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceErr::Unavailable => write!(f, "Model not loaded"),
            ServiceErr::BadRequest(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ServiceErr {}

impl From<MlErr> for ServiceErr {
    fn from(e: MlErr) -> Self {
        ServiceErr::BadRequest(e.to_string())
    }
}

impl ResponseError for ServiceErr {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceErr::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceErr::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
