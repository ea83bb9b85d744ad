use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::catalog::{CatalogProvider, Clock, ProfileStore};
use super::domain::{ApplicantProfile, ProfileId};
use super::service::{RecommendationError, RecommendationService};

/// Router builder exposing HTTP endpoints for ranked recommendations.
pub fn recommendation_router<C, P, K>(service: Arc<RecommendationService<C, P, K>>) -> Router
where
    C: CatalogProvider + 'static,
    P: ProfileStore + 'static,
    K: Clock + 'static,
{
    Router::new()
        .route(
            "/api/v1/profiles/:profile_id/recommendations",
            get(profile_recommendations_handler::<C, P, K>),
        )
        .route(
            "/api/v1/recommendations",
            post(adhoc_recommendations_handler::<C, P, K>),
        )
        .with_state(service)
}

/// Ad-hoc ranking request for a profile that is not held in the store.
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub profile: ApplicantProfile,
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

pub(crate) async fn profile_recommendations_handler<C, P, K>(
    State(service): State<Arc<RecommendationService<C, P, K>>>,
    Path(profile_id): Path<String>,
) -> Response
where
    C: CatalogProvider + 'static,
    P: ProfileStore + 'static,
    K: Clock + 'static,
{
    let id = ProfileId(profile_id);
    match service.recommend(&id) {
        Ok(set) => (StatusCode::OK, axum::Json(set)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn adhoc_recommendations_handler<C, P, K>(
    State(service): State<Arc<RecommendationService<C, P, K>>>,
    axum::Json(request): axum::Json<RecommendationRequest>,
) -> Response
where
    C: CatalogProvider + 'static,
    P: ProfileStore + 'static,
    K: Clock + 'static,
{
    let now = request.now.unwrap_or_else(|| service.now());
    match service.recommend_for(&request.profile, now) {
        Ok(set) => (StatusCode::OK, axum::Json(set)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: RecommendationError) -> Response {
    let status = match &error {
        RecommendationError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
        RecommendationError::InvalidProfile(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RecommendationError::Catalog(_) | RecommendationError::ProfileStore(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
