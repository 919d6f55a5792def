//! `hrdesk-leave`
//!
//! Leave request workflow models.

pub mod leave;

pub use leave::{
    ApplyLeaveRequest, ApproveLeaveRequest, HalfDayPeriod, Leave, LeaveBalance, LeaveFilter,
    LeavePage, LeaveStatistics, LeaveStatus, LeaveType, RejectLeaveRequest,
};
