pub mod descriptor;
pub mod events;
pub mod feed;
pub mod health;
pub mod posts;

use actix_web::HttpResponse;
use serde_json::json;

use crate::error::SocialError;

/// Maps a failed user action onto an HTTP status with the error text as body.
pub fn error_response(err: &SocialError) -> HttpResponse {
    let mut builder = match err {
        SocialError::NotConnected | SocialError::ProviderUnavailable(_) => {
            HttpResponse::ServiceUnavailable()
        }
        SocialError::OperationInFlight | SocialError::Cancelled(_) => HttpResponse::Conflict(),
        SocialError::UserRejected(_) => HttpResponse::Forbidden(),
        SocialError::ChainMismatch { .. } | SocialError::Rpc { .. } => HttpResponse::BadGateway(),
        SocialError::ReceiptTimeout { .. } => HttpResponse::GatewayTimeout(),
        SocialError::Reverted(_) => HttpResponse::UnprocessableEntity(),
        SocialError::Encoding(_) | SocialError::UnsupportedShape(_) | SocialError::UnknownMethod(_) => {
            HttpResponse::BadRequest()
        }
        SocialError::Setup(_) | SocialError::Decoding(_) => HttpResponse::InternalServerError(),
    };
    builder.json(json!({ "error": err.to_string() }))
}
