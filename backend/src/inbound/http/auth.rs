//! Account API handlers.
//!
//! ```text
//! POST /auth/signup {"username":"reader42","password":"hunter22"}
//! POST /auth/login  username=reader42&password=hunter22 (form encoded)
//! ```
//!
//! Login follows the password-grant shape: form-encoded credentials in,
//! bearer token out.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{CredentialValidationError, Error, LoginCredentials, SignupDraft, User};

use super::ApiResult;
use super::state::HttpState;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SignupRequest {
    /// Desired account name.
    pub username: String,
    /// Plaintext password; hashed before storage.
    pub password: String,
}

/// Form-encoded login credentials.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginForm {
    /// Account name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed access token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

fn map_credential_error(err: CredentialValidationError) -> Error {
    let field = match err {
        CredentialValidationError::EmptyUsername
        | CredentialValidationError::UsernameTooShort => "username",
        CredentialValidationError::EmptyPassword
        | CredentialValidationError::PasswordTooShort => "password",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = User),
        (status = 400, description = "Invalid or duplicate username", body = Error),
        (status = 409, description = "Registration race lost", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup"
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<web::Json<User>> {
    let draft = SignupDraft::try_from_parts(&payload.username, &payload.password)
        .map_err(map_credential_error)?;
    let user = state.accounts.register(&draft).await?;
    Ok(web::Json(user))
}

/// Authenticate and obtain a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login success", body = TokenResponse),
        (status = 400, description = "Missing credentials", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Form<LoginForm>,
) -> ApiResult<web::Json<TokenResponse>> {
    let credentials = LoginCredentials::try_from_parts(&payload.username, &payload.password)
        .map_err(map_credential_error)?;
    let user = state.accounts.authenticate(&credentials).await?;
    let access_token = state.tokens.issue(user.username().as_str())?;
    Ok(web::Json(TokenResponse {
        access_token,
        token_type: "bearer".to_owned(),
    }))
}
