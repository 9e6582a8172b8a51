use axum::{extract::State, http::StatusCode, Json};
use tracing::instrument;

use auth_identity::{
    LoginRequest, LogoutResponse, RefreshRequest, RegisterRequest, TokenPair, UserProfile,
};

use crate::error::{api_success, ApiResponse, ApiResult, AppJson};
use crate::middleware::AuthContext;
use crate::server::AuthgateServer;

/// Create an account and open its first session
#[instrument(skip_all)]
pub async fn register(
    State(server): State<AuthgateServer>,
    AppJson(request): AppJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TokenPair>>)> {
    let pair = server.auth_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(api_success(pair))))
}

#[instrument(skip_all)]
pub async fn login(
    State(server): State<AuthgateServer>,
    AppJson(request): AppJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<TokenPair>>> {
    let pair = server.auth_service.login(request).await?;
    Ok(Json(api_success(pair)))
}

/// Exchange a refresh token for a new pair; the old token stops working
#[instrument(skip_all)]
pub async fn refresh(
    State(server): State<AuthgateServer>,
    AppJson(request): AppJson<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<TokenPair>>> {
    let pair = server.auth_service.refresh(request).await?;
    Ok(Json(api_success(pair)))
}

#[instrument(skip_all)]
pub async fn logout(
    State(server): State<AuthgateServer>,
    AppJson(request): AppJson<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<LogoutResponse>>> {
    let response = server.auth_service.logout(request).await?;
    Ok(Json(api_success(response)))
}

#[instrument(skip_all, fields(user_id = %auth.user_id))]
pub async fn me(
    State(server): State<AuthgateServer>,
    auth: AuthContext,
) -> ApiResult<Json<ApiResponse<UserProfile>>> {
    let profile = server.auth_service.whoami(auth.user_id).await?;
    Ok(Json(api_success(profile)))
}
