//! User administration (admin and HR).

use hrdesk_auth::{
    AccountStatus, Acknowledgement, ApproveUserRequest, RejectUserRequest, SetUserStatusRequest,
    TokenStore, UpdateUserRequest, UpdateUserRolesRequest, User, UserFilter, UserPage,
};
use hrdesk_core::UserId;

use crate::cache::Tag;
use crate::client::ApiClient;
use crate::dispatcher::Dispatcher;
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::request::HttpMethod;

const REVIEW: &[Tag] = &[Tag::Users, Tag::PendingUsers];
const EDIT: &[Tag] = &[Tag::Users];

pub const ALL_USERS: Endpoint = Endpoint::query("all_users", HttpMethod::Get, "/users", &[Tag::Users]);
pub const PENDING_USERS: Endpoint =
    Endpoint::query("pending_users", HttpMethod::Get, "/users/pending", &[Tag::PendingUsers]);
pub const USER_BY_ID: Endpoint = Endpoint::query("user_by_id", HttpMethod::Get, "/users/{id}", &[Tag::Users]);
pub const APPROVE_USER: Endpoint = Endpoint::mutation("approve_user", HttpMethod::Post, "/users/{id}/approve", REVIEW);
pub const REJECT_USER: Endpoint = Endpoint::mutation("reject_user", HttpMethod::Post, "/users/{id}/reject", REVIEW);
pub const UPDATE_USER: Endpoint = Endpoint::mutation("update_user", HttpMethod::Put, "/users/{id}", EDIT);
pub const UPDATE_USER_ROLES: Endpoint =
    Endpoint::mutation("update_user_roles", HttpMethod::Put, "/users/{id}/roles", EDIT);
pub const SET_USER_STATUS: Endpoint =
    Endpoint::mutation("set_user_status", HttpMethod::Put, "/users/{id}/status", EDIT);
pub const DELETE_USER: Endpoint = Endpoint::mutation("delete_user", HttpMethod::Delete, "/users/{id}", EDIT);

pub const ENDPOINTS: &[Endpoint] = &[
    ALL_USERS,
    PENDING_USERS,
    USER_BY_ID,
    APPROVE_USER,
    REJECT_USER,
    UPDATE_USER,
    UPDATE_USER_ROLES,
    SET_USER_STATUS,
    DELETE_USER,
];

impl<D, S> ApiClient<D, S>
where
    D: Dispatcher,
    S: TokenStore,
{
    pub async fn all_users(&self, filter: &UserFilter) -> Result<UserPage, ApiError> {
        self.query_data(&ALL_USERS, ALL_USERS.request().query_pairs(filter.to_query()))
            .await
    }

    /// Accounts that verified their email and await approval.
    pub async fn pending_users(&self) -> Result<Vec<User>, ApiError> {
        self.query_data(&PENDING_USERS, PENDING_USERS.request()).await
    }

    pub async fn user_by_id(&self, user_id: &UserId) -> Result<User, ApiError> {
        self.query_data(&USER_BY_ID, USER_BY_ID.request_with(&[user_id.as_str()]))
            .await
    }

    pub async fn approve_user(&self, user_id: &UserId, request: &ApproveUserRequest) -> Result<User, ApiError> {
        request.validate()?;
        let req = APPROVE_USER
            .request_with(&[user_id.as_str()])
            .json(request)?;
        self.mutate_data(&APPROVE_USER, req).await
    }

    pub async fn reject_user(&self, user_id: &UserId, request: &RejectUserRequest) -> Result<User, ApiError> {
        request.validate()?;
        let req = REJECT_USER
            .request_with(&[user_id.as_str()])
            .json(request)?;
        self.mutate_data(&REJECT_USER, req).await
    }

    pub async fn update_user(&self, user_id: &UserId, request: &UpdateUserRequest) -> Result<User, ApiError> {
        let req = UPDATE_USER
            .request_with(&[user_id.as_str()])
            .json(request)?;
        self.mutate_data(&UPDATE_USER, req).await
    }

    pub async fn update_user_roles(&self, user_id: &UserId, request: &UpdateUserRolesRequest) -> Result<User, ApiError> {
        request.validate()?;
        let req = UPDATE_USER_ROLES
            .request_with(&[user_id.as_str()])
            .json(request)?;
        self.mutate_data(&UPDATE_USER_ROLES, req).await
    }

    /// Suspend or reactivate an account.
    pub async fn set_user_status(&self, user_id: &UserId, status: AccountStatus) -> Result<User, ApiError> {
        let req = SET_USER_STATUS
            .request_with(&[user_id.as_str()])
            .json(&SetUserStatusRequest { status })?;
        self.mutate_data(&SET_USER_STATUS, req).await
    }

    pub async fn delete_user(&self, user_id: &UserId) -> Result<Acknowledgement, ApiError> {
        self.mutate_plain(&DELETE_USER, DELETE_USER.request_with(&[user_id.as_str()]))
            .await
    }
}
