//! `hrdesk-auth`
//!
//! Identity, session credentials and the Token Store.
//!
//! This crate is intentionally decoupled from HTTP: it models who the user is,
//! which credentials the session holds and where they are persisted.

pub mod authorize;
pub mod credentials;
pub mod roles;
pub mod token_store;
pub mod user;

pub use authorize::{AccessPolicy, Capability};
pub use credentials::{LoginPayload, LoginRequest, RefreshTokenRequest, SessionCredentials};
pub use roles::Role;
pub use token_store::{FileTokenStore, InMemoryTokenStore, TokenKey, TokenStore};
pub use user::{
    AccountStatus, Acknowledgement, ApproveUserRequest, MessageResponse, RegisterRequest,
    RegisterResponse, RejectUserRequest, ResendVerificationRequest, SetUserStatusRequest,
    UpdateProfileRequest, UpdateUserRequest, UpdateUserRolesRequest, User, UserFilter, UserPage,
    UserRef, UserStatus, VerifyEmailRequest, VerifyEmailResponse,
};
