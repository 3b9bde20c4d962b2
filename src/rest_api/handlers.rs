//! HTTP handlers for the REST API

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use kube::api::Api;
use tracing::{error, instrument};

use crate::controller::ControllerState;
use crate::crd::Channel;

use super::dto::{
    ChannelDetailResponse, ChannelListResponse, ChannelSummary, ErrorResponse, HealthResponse,
};

/// Health check endpoint
#[instrument]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// List all Channels across namespaces
#[instrument(skip(state))]
pub async fn list_channels(
    State(state): State<Arc<ControllerState>>,
) -> Result<Json<ChannelListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let api: Api<Channel> = Api::all(state.client.clone());

    match api.list(&Default::default()).await {
        Ok(channels) => {
            let items: Vec<ChannelSummary> =
                channels.items.iter().map(ChannelSummary::from).collect();
            let total = items.len();
            Ok(Json(ChannelListResponse { items, total }))
        }
        Err(e) => {
            error!("Failed to list channels: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("list_failed", &e.to_string())),
            ))
        }
    }
}

/// Get a specific Channel
#[instrument(skip(state), fields(name = %name, namespace = %namespace))]
pub async fn get_channel(
    State(state): State<Arc<ControllerState>>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<ChannelDetailResponse>, (StatusCode, Json<ErrorResponse>)> {
    let api: Api<Channel> = Api::namespaced(state.client.clone(), &namespace);

    match api.get(&name).await {
        Ok(channel) => Ok(Json(ChannelDetailResponse::from(channel))),
        Err(kube::Error::Api(e)) if e.code == 404 => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "not_found",
                &format!("Channel {}/{} not found", namespace, name),
            )),
        )),
        Err(e) => {
            error!("Failed to get channel {}/{}: {:?}", namespace, name, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("get_failed", &e.to_string())),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_version() {
        let Json(body) = health().await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
