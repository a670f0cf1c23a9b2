use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::AuthUser,
    models::{LoginRequest, RegisterRequest, TokenResponse},
    routes::{extract::ApiJson, AppState},
};

pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> AppResult<Json<Value>> {
    state.auth.register(request).await?;
    Ok(Json(json!({ "message": "User registered successfully" })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.auth.login(request).await?;
    Ok(Json(token))
}

/// Greets the holder of a valid bearer token
pub async fn protected(AuthUser(claims): AuthUser) -> Json<Value> {
    Json(json!({
        "message": format!("Hello {}, you have access to this protected route!", claims.sub)
    }))
}
