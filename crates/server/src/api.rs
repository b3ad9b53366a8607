use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use phone_append_metrics::metrics_router;
use phone_append_types::{AddressParts, LookdownResult};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ServiceContext;

/// Query parameters in the order they are checked
const REQUIRED_PARAMS: [&str; 7] = [
    "sid",
    "token",
    "address",
    "city",
    "state",
    "postalCode",
    "country",
];

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid service context: {0}")]
    Context(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing parameter {0}")]
    Missing(&'static str),

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Missing(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Missing(param) => (status, Json(json!({ "missing": param }))).into_response(),
            ApiError::Unauthorized => {
                (status, Json(json!({ "status": "unauthorized" }))).into_response()
            }
            ApiError::Internal(_) => (status, Json("Server error")).into_response(),
        }
    }
}

/// A lookdown request after every parameter has been found
#[derive(Debug)]
struct LookdownRequest {
    sid: String,
    token: String,
    address: AddressParts,
}

impl LookdownRequest {
    fn from_params(mut params: HashMap<String, String>) -> Result<Self, ApiError> {
        let mut values = Vec::with_capacity(REQUIRED_PARAMS.len());
        for name in REQUIRED_PARAMS {
            values.push(params.remove(name).ok_or(ApiError::Missing(name))?);
        }
        let [sid, token, line1, city, region, postal_code, country]: [String; 7] = values
            .try_into()
            .map_err(|_| ApiError::Internal("parameter count mismatch".to_string()))?;

        Ok(Self {
            sid,
            token,
            address: AddressParts {
                line1: Some(line1),
                line2: None,
                city: Some(city),
                region: Some(region),
                country: Some(country),
                postal_code: Some(postal_code),
            },
        })
    }
}

/// `/api` plus the metrics and health endpoints
pub fn router(ctx: Arc<ServiceContext>) -> Router {
    let metrics = metrics_router(ctx.metrics.clone());
    Router::new()
        .route("/api", get(lookdown_handler))
        .with_state(ctx)
        .merge(metrics)
}

/// Bind and serve until the process is stopped
pub async fn serve(ctx: ServiceContext, bind: SocketAddr) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|source| ServerError::Bind { addr: bind, source })?;
    info!(
        %bind,
        vendors = ?ctx.vendor_identities(),
        "Lookdown service listening"
    );

    axum::serve(listener, router(Arc::new(ctx))).await?;
    Ok(())
}

async fn lookdown_handler(
    State(ctx): State<Arc<ServiceContext>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let response = match lookdown(&ctx, params).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            warn!(error = %e, "Lookdown request rejected");
            e.into_response()
        }
    };
    ctx.metrics.record_lookdown_request(response.status().as_u16());
    response
}

async fn lookdown(ctx: &ServiceContext, params: HashMap<String, String>) -> Result<Value, ApiError> {
    let request = LookdownRequest::from_params(params)?;
    if !ctx.credentials.matches(&request.sid, &request.token) {
        return Err(ApiError::Unauthorized);
    }

    for vendor in &ctx.vendors {
        let identity = vendor.identity();
        debug!(provider = identity, "Asking vendor for lookdown");
        let outcome = vendor.lookdown(&request.address).await;
        if let Err(e) = &outcome {
            warn!(
                provider = identity,
                error_kind = e.kind(),
                error = %e,
                "Lookdown failed"
            );
        }

        let result = LookdownResult::from(outcome);
        if !result.success {
            continue;
        }
        let contacts = result.into_contacts();
        if contacts.is_empty() {
            debug!(provider = identity, "Vendor returned no contacts");
            continue;
        }

        info!(provider = identity, contacts = contacts.len(), "Lookdown resolved");
        let data = serde_json::to_value(contacts).map_err(|e| ApiError::Internal(e.to_string()))?;
        return Ok(json!({ "data": data }));
    }

    Ok(json!([]))
}
