//! Leave requests, balances and statistics.

use hrdesk_auth::TokenStore;
use hrdesk_core::{LeaveId, UserId};
use hrdesk_leave::{
    ApplyLeaveRequest, ApproveLeaveRequest, Leave, LeaveBalance, LeaveFilter, LeavePage,
    LeaveStatistics, RejectLeaveRequest,
};

use crate::cache::Tag;
use crate::client::ApiClient;
use crate::dispatcher::Dispatcher;
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::request::HttpMethod;

const WRITE_OWN: &[Tag] = &[Tag::Leaves, Tag::LeaveBalance];
const REVIEW: &[Tag] = &[Tag::Leaves, Tag::LeaveStatistics];

pub const APPLY_LEAVE: Endpoint = Endpoint::mutation("apply_leave", HttpMethod::Post, "/leaves", WRITE_OWN);
pub const MY_LEAVES: Endpoint = Endpoint::query("my_leaves", HttpMethod::Get, "/leaves/my-leaves", &[Tag::Leaves]);
pub const MY_BALANCE: Endpoint =
    Endpoint::query("my_balance", HttpMethod::Get, "/leaves/my-balance", &[Tag::LeaveBalance]);
pub const CANCEL_LEAVE: Endpoint = Endpoint::mutation("cancel_leave", HttpMethod::Put, "/leaves/{id}/cancel", WRITE_OWN);
pub const ALL_LEAVES: Endpoint = Endpoint::query("all_leaves", HttpMethod::Get, "/leaves", &[Tag::Leaves]);
pub const PENDING_LEAVES: Endpoint =
    Endpoint::query("pending_leaves", HttpMethod::Get, "/leaves/pending", &[Tag::Leaves]);
pub const LEAVE_BY_ID: Endpoint = Endpoint::query("leave_by_id", HttpMethod::Get, "/leaves/{id}", &[Tag::Leaves]);
pub const APPROVE_LEAVE: Endpoint =
    Endpoint::mutation("approve_leave", HttpMethod::Post, "/leaves/{id}/approve", REVIEW);
pub const REJECT_LEAVE: Endpoint = Endpoint::mutation("reject_leave", HttpMethod::Post, "/leaves/{id}/reject", REVIEW);
pub const LEAVE_STATISTICS: Endpoint = Endpoint::query(
    "leave_statistics",
    HttpMethod::Get,
    "/leaves/statistics",
    &[Tag::LeaveStatistics],
);
pub const USER_BALANCE: Endpoint = Endpoint::query(
    "user_balance",
    HttpMethod::Get,
    "/leaves/user/{id}/balance",
    &[Tag::LeaveBalance],
);

pub const ENDPOINTS: &[Endpoint] = &[
    APPLY_LEAVE,
    MY_LEAVES,
    MY_BALANCE,
    CANCEL_LEAVE,
    ALL_LEAVES,
    PENDING_LEAVES,
    LEAVE_BY_ID,
    APPROVE_LEAVE,
    REJECT_LEAVE,
    LEAVE_STATISTICS,
    USER_BALANCE,
];

impl<D, S> ApiClient<D, S>
where
    D: Dispatcher,
    S: TokenStore,
{
    /// Submit a leave request for the signed-in user.
    pub async fn apply_leave(&self, request: &ApplyLeaveRequest) -> Result<Leave, ApiError> {
        request.validate()?;
        self.mutate_data(&APPLY_LEAVE, APPLY_LEAVE.request().json(request)?)
            .await
    }

    pub async fn my_leaves(&self, filter: &LeaveFilter) -> Result<LeavePage, ApiError> {
        self.query_data(&MY_LEAVES, MY_LEAVES.request().query_pairs(filter.to_query()))
            .await
    }

    /// Balance for `year`, or the current year when `None`.
    pub async fn my_balance(&self, year: Option<i32>) -> Result<LeaveBalance, ApiError> {
        self.query_data(&MY_BALANCE, MY_BALANCE.request().query_opt("year", year))
            .await
    }

    pub async fn cancel_leave(&self, leave_id: &LeaveId) -> Result<Leave, ApiError> {
        self.mutate_data(&CANCEL_LEAVE, CANCEL_LEAVE.request_with(&[leave_id.as_str()]))
            .await
    }

    pub async fn all_leaves(&self, filter: &LeaveFilter) -> Result<LeavePage, ApiError> {
        self.query_data(&ALL_LEAVES, ALL_LEAVES.request().query_pairs(filter.to_query()))
            .await
    }

    pub async fn pending_leaves(&self, page: Option<u32>, limit: Option<u32>) -> Result<LeavePage, ApiError> {
        let request = PENDING_LEAVES
            .request()
            .query_opt("page", page)
            .query_opt("limit", limit);
        self.query_data(&PENDING_LEAVES, request).await
    }

    pub async fn leave_by_id(&self, leave_id: &LeaveId) -> Result<Leave, ApiError> {
        self.query_data(&LEAVE_BY_ID, LEAVE_BY_ID.request_with(&[leave_id.as_str()]))
            .await
    }

    pub async fn approve_leave(&self, leave_id: &LeaveId, request: &ApproveLeaveRequest) -> Result<Leave, ApiError> {
        let req = APPROVE_LEAVE
            .request_with(&[leave_id.as_str()])
            .json(request)?;
        self.mutate_data(&APPROVE_LEAVE, req).await
    }

    /// Reject a pending request; remarks are mandatory.
    pub async fn reject_leave(&self, leave_id: &LeaveId, request: &RejectLeaveRequest) -> Result<Leave, ApiError> {
        request.validate()?;
        let req = REJECT_LEAVE
            .request_with(&[leave_id.as_str()])
            .json(request)?;
        self.mutate_data(&REJECT_LEAVE, req).await
    }

    pub async fn leave_statistics(&self, user_id: Option<&UserId>, year: Option<i32>) -> Result<LeaveStatistics, ApiError> {
        let request = LEAVE_STATISTICS
            .request()
            .query_opt("userId", user_id)
            .query_opt("year", year);
        self.query_data(&LEAVE_STATISTICS, request).await
    }

    pub async fn user_balance(&self, user_id: &UserId, year: Option<i32>) -> Result<LeaveBalance, ApiError> {
        let request = USER_BALANCE
            .request_with(&[user_id.as_str()])
            .query_opt("year", year);
        self.query_data(&USER_BALANCE, request).await
    }
}
