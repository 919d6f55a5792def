//! Leave requests, balances and statistics.
//!
//! Balances and day counts are computed by the backend; the client only
//! checks that a request is well-formed before submitting it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use hrdesk_auth::UserRef;
use hrdesk_core::{DomainError, DomainResult, LeaveId, Pagination, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Enumerations
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Casual,
    Sick,
    Paid,
    Unpaid,
    Maternity,
    Paternity,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::Casual => "casual",
            LeaveType::Sick => "sick",
            LeaveType::Paid => "paid",
            LeaveType::Unpaid => "unpaid",
            LeaveType::Maternity => "maternity",
            LeaveType::Paternity => "paternity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HalfDayPeriod {
    FirstHalf,
    SecondHalf,
}

// ─────────────────────────────────────────────────────────────────────────────
// Read models
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leave {
    #[serde(rename = "_id")]
    pub id: LeaveId,
    #[serde(rename = "userId")]
    pub applicant: UserRef,
    pub leave_type: LeaveType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_days: f64,
    pub reason: String,
    pub status: LeaveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub is_half_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_day_period: Option<HalfDayPeriod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Leave {
    /// Only pending requests can be cancelled by the applicant or reviewed.
    pub fn is_open(&self) -> bool {
        self.status == LeaveStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeavePage {
    pub leaves: Vec<Leave>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Allowance {
    pub total: f64,
    pub used: f64,
    pub remaining: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnpaidUsage {
    pub used: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CarryForward {
    pub casual: f64,
    pub sick: f64,
    pub paid: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: UserId,
    pub year: i32,
    pub casual: Allowance,
    pub sick: Allowance,
    pub paid: Allowance,
    pub unpaid: UnpaidUsage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carry_forward: Option<CarryForward>,
}

impl LeaveBalance {
    /// Remaining allowance for a leave type; `None` for types without a quota.
    pub fn remaining(&self, leave_type: LeaveType) -> Option<f64> {
        match leave_type {
            LeaveType::Casual => Some(self.casual.remaining),
            LeaveType::Sick => Some(self.sick.remaining),
            LeaveType::Paid => Some(self.paid.remaining),
            LeaveType::Unpaid | LeaveType::Maternity | LeaveType::Paternity => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTally {
    pub count: u64,
    pub total_days: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveStatistics {
    pub pending: StatusTally,
    pub approved: StatusTally,
    pub rejected: StatusTally,
    pub cancelled: StatusTally,
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyLeaveRequest {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    #[serde(default)]
    pub is_half_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_day_period: Option<HalfDayPeriod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

impl ApplyLeaveRequest {
    pub fn full_days(
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            leave_type,
            start_date,
            end_date,
            reason: reason.into(),
            is_half_day: false,
            half_day_period: None,
            attachments: Vec::new(),
        }
    }

    pub fn half_day(
        leave_type: LeaveType,
        date: NaiveDate,
        period: HalfDayPeriod,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            leave_type,
            start_date: date,
            end_date: date,
            reason: reason.into(),
            is_half_day: true,
            half_day_period: Some(period),
            attachments: Vec::new(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.end_date < self.start_date {
            return Err(DomainError::validation("end date cannot be before start date"));
        }
        if self.reason.trim().is_empty() {
            return Err(DomainError::validation("reason is required"));
        }
        if self.is_half_day {
            if self.start_date != self.end_date {
                return Err(DomainError::validation(
                    "a half-day leave must start and end on the same day",
                ));
            }
            if self.half_day_period.is_none() {
                return Err(DomainError::validation("half-day period is required"));
            }
        }
        Ok(())
    }

    /// Calendar days covered by the request, for display before submission.
    ///
    /// The backend's count is authoritative (it may skip holidays).
    pub fn calendar_days(&self) -> f64 {
        if self.is_half_day {
            return 0.5;
        }
        let span = (self.end_date - self.start_date).num_days();
        (span.max(0) + 1) as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveLeaveRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectLeaveRequest {
    pub remarks: String,
}

impl RejectLeaveRequest {
    pub fn validate(&self) -> DomainResult<()> {
        if self.remarks.trim().is_empty() {
            return Err(DomainError::validation("remarks are required to reject a leave"));
        }
        Ok(())
    }
}

/// Filters shared by the leave listings (`my-leaves`, `pending` and the full list).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveFilter {
    pub status: Option<LeaveStatus>,
    pub leave_type: Option<LeaveType>,
    pub user_id: Option<UserId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl LeaveFilter {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// Query pairs in a stable order; unset filters are omitted.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(status) = self.status {
            q.push(("status", status.as_str().to_string()));
        }
        if let Some(leave_type) = self.leave_type {
            q.push(("leaveType", leave_type.as_str().to_string()));
        }
        if let Some(user_id) = &self.user_id {
            q.push(("userId", user_id.to_string()));
        }
        if let Some(start) = self.start_date {
            q.push(("startDate", start.to_string()));
        }
        if let Some(end) = self.end_date {
            q.push(("endDate", end.to_string()));
        }
        if let Some(page) = self.page {
            q.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            q.push(("limit", limit.to_string()));
        }
        q
    }
}
