//! Account API handlers.
//!
//! ```text
//! POST /api/users/register {"name":"Ada","email":"ada@example.com","password":"secret1","role":"owner"}
//! POST /api/users/login    {"email":"ada@example.com","password":"secret1"}
//! GET  /api/users/profile  Authorization: Bearer <token>
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{
    Account, Error, LoginCredentials, LoginValidationError, Registration, RegistrationDraft, Role,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedAccount;
use crate::inbound::http::state::HttpState;

/// Registration request body. Missing fields are reported as violations.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    /// Email address, unique ignoring case.
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    /// At least six characters.
    #[schema(example = "secret1")]
    pub password: Option<String>,
    /// `user` or `owner`.
    #[schema(example = "owner")]
    pub role: Option<String>,
}

impl From<RegisterRequest> for RegistrationDraft {
    fn from(value: RegisterRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            password: value.password.map(Zeroizing::new),
            role: value.role,
        }
    }
}

/// Login request body.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Registered email.
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    /// Plain-text password.
    #[schema(example = "secret1")]
    pub password: Option<String>,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Successful login body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Bearer token valid for two hours.
    pub token: String,
    /// Role of the account.
    pub role: Role,
}

/// Public view of an account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    /// Account identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Normalised email.
    pub email: String,
    /// Role fixed at registration.
    pub role: Role,
}

impl From<&Account> for ProfileResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id().to_string(),
            name: account.name().to_owned(),
            email: account.email().to_string(),
            role: account.role(),
        }
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let violation = match err {
        LoginValidationError::EmptyEmail => "Email is required",
        LoginValidationError::EmptyPassword => "Password is required",
    };
    Error::validation_failed(vec![violation.to_owned()])
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = MessageResponse),
        (status = 400, description = "Validation failed or email taken", body = Error),
        (status = 503, description = "Account store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from_draft(payload.into_inner().into())
        .map_err(|err| Error::validation_failed(err.0))?;
    state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(MessageResponse::new("User registered successfully")))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid email or password", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let password = Zeroizing::new(password.unwrap_or_default());
    let credentials =
        LoginCredentials::try_from_parts(email.as_deref().unwrap_or_default(), &password)
            .map_err(map_login_validation_error)?;

    let outcome = state.accounts.login(credentials).await?;
    Ok(web::Json(LoginResponse {
        message: "Login successful".to_owned(),
        token: outcome.token,
        role: outcome.role,
    }))
}

/// Profile of the authenticated account.
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Account vanished", body = Error)
    ),
    tags = ["users"],
    operation_id = "profile"
)]
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
) -> ApiResult<web::Json<ProfileResponse>> {
    let account = state.account_query.profile(caller.into_inner().id()).await?;
    Ok(web::Json(ProfileResponse::from(&account)))
}

/// Register account routes on a scope mounted at `/api/users`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register).service(login).service(profile);
}
