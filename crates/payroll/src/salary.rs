//! Salary records, structures and payroll requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hrdesk_auth::UserRef;
use hrdesk_core::{DomainError, DomainResult, Pagination, SalaryId, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Enumerations
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SalaryStatus {
    Pending,
    Processed,
    Paid,
    OnHold,
}

impl SalaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalaryStatus::Pending => "pending",
            SalaryStatus::Processed => "processed",
            SalaryStatus::Paid => "paid",
            SalaryStatus::OnHold => "on-hold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    BankTransfer,
    Cheque,
    Cash,
}

// ─────────────────────────────────────────────────────────────────────────────
// Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Earning and deduction components of a monthly salary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryStructure {
    pub basic: f64,
    pub hra: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_allowance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_allowance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_allowances: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provident_fund: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_tax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_tax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_deductions: Option<f64>,
}

impl SalaryStructure {
    /// Sum of all earning components.
    pub fn gross(&self) -> f64 {
        self.basic
            + self.hra
            + self.medical_allowance.unwrap_or(0.0)
            + self.transport_allowance.unwrap_or(0.0)
            + self.other_allowances.unwrap_or(0.0)
            + self.bonus.unwrap_or(0.0)
    }

    /// Sum of all deduction components.
    pub fn total_deductions(&self) -> f64 {
        self.provident_fund.unwrap_or(0.0)
            + self.professional_tax.unwrap_or(0.0)
            + self.income_tax.unwrap_or(0.0)
            + self.other_deductions.unwrap_or(0.0)
    }

    pub fn net(&self) -> f64 {
        self.gross() - self.total_deductions()
    }

    fn validate(&self) -> DomainResult<()> {
        if !(self.basic > 0.0) {
            return Err(DomainError::validation("basic salary must be greater than 0"));
        }
        let components = [
            self.hra,
            self.medical_allowance.unwrap_or(0.0),
            self.transport_allowance.unwrap_or(0.0),
            self.other_allowances.unwrap_or(0.0),
            self.bonus.unwrap_or(0.0),
            self.total_deductions(),
        ];
        if components.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(DomainError::validation("salary components cannot be negative"));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Read models
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Salary {
    #[serde(rename = "_id")]
    pub id: SalaryId,
    #[serde(rename = "userId")]
    pub employee: UserRef,
    pub month: u32,
    pub year: i32,
    pub structure: SalaryStructure,
    pub gross_salary: f64,
    pub total_deductions: f64,
    pub net_salary: f64,
    pub status: SalaryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_credit_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub working_days: u32,
    pub present_days: f64,
    pub leave_days: f64,
    pub absent_days: f64,
    #[serde(default)]
    pub is_prorated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_by: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryPage {
    pub salaries: Vec<Salary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountTally {
    pub count: u64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub pending: AmountTally,
    pub processed: AmountTally,
    pub paid: AmountTally,
    #[serde(rename = "on-hold")]
    pub on_hold: AmountTally,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTally {
    pub month: u32,
    pub count: u64,
    pub total_amount: f64,
    pub avg_salary: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryStatistics {
    pub by_status: StatusBreakdown,
    #[serde(default)]
    pub by_month: Vec<MonthTally>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    pub user_id: UserId,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkGenerateResult {
    #[serde(default)]
    pub success: Vec<UserId>,
    #[serde(default)]
    pub failed: Vec<BulkFailure>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalaryRequest {
    pub user_id: UserId,
    pub month: u32,
    pub year: i32,
    pub structure: SalaryStructure,
    pub gross_salary: f64,
    pub total_deductions: f64,
    pub net_salary: f64,
    pub working_days: u32,
    pub present_days: f64,
    pub leave_days: f64,
    pub absent_days: f64,
    #[serde(default)]
    pub is_prorated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl CreateSalaryRequest {
    /// Build a request for a full month of attendance; totals are derived from
    /// the structure.
    pub fn new(
        user_id: UserId,
        month: u32,
        year: i32,
        structure: SalaryStructure,
        working_days: u32,
    ) -> Self {
        Self {
            user_id,
            month,
            year,
            gross_salary: structure.gross(),
            total_deductions: structure.total_deductions(),
            net_salary: structure.net(),
            structure,
            working_days,
            present_days: f64::from(working_days),
            leave_days: 0.0,
            absent_days: 0.0,
            is_prorated: false,
            credit_date: None,
            remarks: None,
        }
    }

    /// Replace the attendance figures.
    pub fn with_attendance(mut self, present_days: f64, leave_days: f64, absent_days: f64) -> Self {
        self.present_days = present_days;
        self.leave_days = leave_days;
        self.absent_days = absent_days;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_period(self.month, self.year)?;
        self.structure.validate()?;
        if [self.present_days, self.leave_days, self.absent_days]
            .iter()
            .any(|d| !d.is_finite() || *d < 0.0)
        {
            return Err(DomainError::validation("attendance days cannot be negative"));
        }
        if self.present_days + self.absent_days > f64::from(self.working_days) {
            return Err(DomainError::validation(
                "present days + absent days cannot exceed working days",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkGenerateSalaryRequest {
    pub month: u32,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl BulkGenerateSalaryRequest {
    pub fn validate(&self) -> DomainResult<()> {
        validate_period(self.month, self.year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSalaryStatusRequest {
    pub status: SalaryStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSalaryPaymentRequest {
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_credit_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Partial update of a salary record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSalaryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<SalaryStructure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absent_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Filters for the salary listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalaryFilter {
    pub user_id: Option<UserId>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub status: Option<SalaryStatus>,
    pub department: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl SalaryFilter {
    /// Query pairs in a stable order; unset filters are omitted.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(user_id) = &self.user_id {
            q.push(("userId", user_id.to_string()));
        }
        if let Some(year) = self.year {
            q.push(("year", year.to_string()));
        }
        if let Some(month) = self.month {
            q.push(("month", month.to_string()));
        }
        if let Some(status) = self.status {
            q.push(("status", status.as_str().to_string()));
        }
        if let Some(department) = &self.department {
            q.push(("department", department.clone()));
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

fn validate_period(month: u32, year: i32) -> DomainResult<()> {
    if !(1..=12).contains(&month) {
        return Err(DomainError::validation(format!("month must be 1-12, got {month}")));
    }
    if year < 1970 {
        return Err(DomainError::validation(format!("implausible payroll year {year}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn user() -> UserId {
        UserId::new("u-1").unwrap()
    }

    fn structure() -> SalaryStructure {
        SalaryStructure {
            basic: 50_000.0,
            hra: 20_000.0,
            transport_allowance: Some(1_600.0),
            medical_allowance: Some(1_250.0),
            provident_fund: Some(6_000.0),
            professional_tax: Some(200.0),
            ..Default::default()
        }
    }

    #[test]
    fn totals_follow_structure() {
        let s = structure();
        assert_eq!(s.gross(), 72_850.0);
        assert_eq!(s.total_deductions(), 6_200.0);
        assert_eq!(s.net(), 66_650.0);
    }

    #[test]
    fn create_request_carries_derived_totals() {
        let req = CreateSalaryRequest::new(user(), 3, 2024, structure(), 26);
        assert_eq!(req.gross_salary, 72_850.0);
        assert_eq!(req.net_salary, 66_650.0);
        assert_eq!(req.present_days, 26.0);
        assert!(req.validate().is_ok());

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["structure"]["transportAllowance"], 1_600.0);
        assert!(json["structure"].get("bonus").is_none());
    }

    #[test]
    fn attendance_cannot_exceed_working_days() {
        let req = CreateSalaryRequest::new(user(), 3, 2024, structure(), 26).with_attendance(24.0, 0.0, 3.0);
        let err = req.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("cannot exceed")));
    }

    #[test]
    fn basic_must_be_positive() {
        let s = SalaryStructure {
            basic: 0.0,
            ..structure()
        };
        assert!(CreateSalaryRequest::new(user(), 3, 2024, s, 26).validate().is_err());
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        let req = BulkGenerateSalaryRequest {
            month: 13,
            year: 2024,
            department: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn statistics_read_on_hold_bucket() {
        let raw = serde_json::json!({
            "byStatus": {
                "pending": { "count": 1, "totalAmount": 100.0 },
                "processed": { "count": 0, "totalAmount": 0.0 },
                "paid": { "count": 2, "totalAmount": 250.0 },
                "on-hold": { "count": 1, "totalAmount": 90.0 }
            },
            "byMonth": [{ "month": 3, "count": 4, "totalAmount": 440.0, "avgSalary": 110.0 }]
        });
        let stats: SalaryStatistics = serde_json::from_value(raw).unwrap();
        assert_eq!(stats.by_status.on_hold.count, 1);
        assert_eq!(stats.by_month[0].avg_salary, 110.0);
    }

    #[test]
    fn status_uses_kebab_case() {
        let req = UpdateSalaryStatusRequest {
            status: SalaryStatus::OnHold,
        };
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            serde_json::json!({ "status": "on-hold" })
        );
    }

    proptest! {
        /// Net pay is always gross minus deductions, whatever the components.
        #[test]
        fn net_is_gross_minus_deductions(
            basic in 1u32..1_000_000,
            hra in 0u32..500_000,
            bonus in proptest::option::of(0u32..100_000),
            pf in proptest::option::of(0u32..100_000),
            tax in proptest::option::of(0u32..100_000),
        ) {
            let s = SalaryStructure {
                basic: f64::from(basic),
                hra: f64::from(hra),
                bonus: bonus.map(f64::from),
                provident_fund: pf.map(f64::from),
                income_tax: tax.map(f64::from),
                ..Default::default()
            };
            let expected_gross = f64::from(basic) + f64::from(hra) + f64::from(bonus.unwrap_or(0));
            let expected_deductions = f64::from(pf.unwrap_or(0)) + f64::from(tax.unwrap_or(0));
            prop_assert_eq!(s.gross(), expected_gross);
            prop_assert_eq!(s.total_deductions(), expected_deductions);
            prop_assert_eq!(s.net(), expected_gross - expected_deductions);
        }
    }
}
