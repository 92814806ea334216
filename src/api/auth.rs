use tracing::instrument;
use validator::Validate;

use super::client::ApiClient;
use crate::core::AppError;
use crate::models::users::{
    AuthResponse, ChangePasswordPayload, LoginPayload, RegisterPayload, UpdateProfilePayload, User,
};

#[instrument(name = "Login", skip(client, payload))]
pub async fn login(client: &ApiClient, payload: &LoginPayload) -> Result<AuthResponse, AppError> {
    payload.validate()?;
    client.execute(client.post("/auth/login").json(payload)).await
}

#[instrument(name = "Register", skip(client, payload))]
pub async fn register(
    client: &ApiClient,
    payload: &RegisterPayload,
) -> Result<AuthResponse, AppError> {
    payload.validate()?;
    client
        .execute(client.post("/auth/register").json(payload))
        .await
}

/// Checks the held credential against the backend. Answers the current
/// user when the session is still good.
#[instrument(name = "Verify Session", skip(client))]
pub async fn verify_session(client: &ApiClient) -> Result<User, AppError> {
    client.execute(client.get("/auth/verify")).await
}

#[instrument(name = "Get Profile", skip(client))]
pub async fn get_profile(client: &ApiClient) -> Result<User, AppError> {
    client.execute(client.get("/auth/profile")).await
}

#[instrument(name = "Update Profile", skip(client, payload))]
pub async fn update_profile(
    client: &ApiClient,
    payload: &UpdateProfilePayload,
) -> Result<User, AppError> {
    payload.validate()?;
    client
        .execute(client.put("/auth/profile").json(payload))
        .await
}

#[instrument(name = "Change Password", skip(client, payload))]
pub async fn change_password(
    client: &ApiClient,
    payload: &ChangePasswordPayload,
) -> Result<(), AppError> {
    payload.validate()?;
    client
        .execute_empty(client.post("/auth/change-password").json(payload))
        .await
}

#[instrument(name = "Logout", skip(client))]
pub async fn logout(client: &ApiClient) -> Result<(), AppError> {
    client.execute_empty(client.post("/auth/logout")).await
}
