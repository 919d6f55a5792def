//! Registration, login and the signed-in user's profile.

use hrdesk_auth::{
    LoginPayload, LoginRequest, MessageResponse, RefreshTokenRequest, RegisterRequest,
    RegisterResponse, ResendVerificationRequest, SessionCredentials, TokenKey, TokenStore,
    UpdateProfileRequest, User, VerifyEmailRequest, VerifyEmailResponse,
};
use hrdesk_core::DomainError;

use crate::cache::Tag;
use crate::client::{ApiClient, unwrap_envelope};
use crate::dispatcher::Dispatcher;
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::interceptor::REFRESH_TOKEN_PATH;
use crate::request::HttpMethod;

pub const REGISTER: Endpoint = Endpoint::mutation("register", HttpMethod::Post, "/users/register", &[]);
pub const VERIFY_EMAIL: Endpoint = Endpoint::mutation("verify_email", HttpMethod::Post, "/users/verify-email", &[]);
pub const RESEND_VERIFICATION: Endpoint = Endpoint::mutation(
    "resend_verification",
    HttpMethod::Post,
    "/users/resend-verification",
    &[],
);
pub const LOGIN: Endpoint = Endpoint::mutation("login", HttpMethod::Post, "/auth/login", &[Tag::Auth]);
pub const ME: Endpoint = Endpoint::query("me", HttpMethod::Get, "/auth/me", &[Tag::Auth]);
pub const REFRESH_TOKEN: Endpoint = Endpoint::mutation("refresh_token", HttpMethod::Post, REFRESH_TOKEN_PATH, &[]);
pub const UPDATE_PROFILE: Endpoint = Endpoint::mutation("update_profile", HttpMethod::Put, "/users/profile", &[Tag::Auth]);

pub const ENDPOINTS: &[Endpoint] = &[
    REGISTER,
    VERIFY_EMAIL,
    RESEND_VERIFICATION,
    LOGIN,
    ME,
    REFRESH_TOKEN,
    UPDATE_PROFILE,
];

impl<D, S> ApiClient<D, S>
where
    D: Dispatcher,
    S: TokenStore,
{
    /// Create an account; it stays pending until the emailed code is verified.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        request.validate()?;
        self.mutate_plain(&REGISTER, REGISTER.request().json(request)?).await
    }

    pub async fn verify_email(&self, request: &VerifyEmailRequest) -> Result<VerifyEmailResponse, ApiError> {
        request.validate()?;
        self.mutate_plain(&VERIFY_EMAIL, VERIFY_EMAIL.request().json(request)?)
            .await
    }

    pub async fn resend_verification(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(DomainError::validation("email is required").into());
        }
        let body = ResendVerificationRequest {
            email: email.to_string(),
        };
        self.mutate_plain(&RESEND_VERIFICATION, RESEND_VERIFICATION.request().json(&body)?)
            .await
    }

    /// Sign in and persist the returned token pair.
    pub async fn login(&self, request: &LoginRequest) -> Result<User, ApiError> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(DomainError::validation("email and password are required").into());
        }
        let payload: LoginPayload = self.mutate_data(&LOGIN, LOGIN.request().json(request)?).await?;
        self.tokens().store(&payload.credentials());
        tracing::info!(user_id = %payload.user.id, "signed in");
        Ok(payload.user)
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.query_data(&ME, ME.request()).await
    }

    /// Exchange the stored refresh token for a new pair and persist it.
    ///
    /// The interceptor does this on its own when a request is rejected; this
    /// is for shells that want to refresh proactively. It bypasses the
    /// interceptor: a rejected refresh is reported as is and leaves the stored
    /// tokens alone.
    pub async fn refresh_token(&self) -> Result<SessionCredentials, ApiError> {
        let refresh_token = self
            .tokens()
            .get(TokenKey::RefreshToken)
            .ok_or_else(|| ApiError::from(DomainError::validation("no refresh token stored")))?;
        let body = RefreshTokenRequest { refresh_token };
        let request = REFRESH_TOKEN.request().json(&body)?;
        let credentials: SessionCredentials = unwrap_envelope(self.dispatch_unauthenticated(&request).await?)?;
        self.tokens().store(&credentials);
        Ok(credentials)
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<User, ApiError> {
        self.mutate_data(&UPDATE_PROFILE, UPDATE_PROFILE.request().json(request)?)
            .await
    }

    /// Forget the session locally: tokens and every cached result.
    pub fn logout(&self) {
        self.tokens().clear_all();
        self.cache().clear();
        tracing::info!("signed out");
    }
}
