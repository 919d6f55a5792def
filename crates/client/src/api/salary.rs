//! Salary records and payroll runs.

use hrdesk_auth::{Acknowledgement, TokenStore};
use hrdesk_core::SalaryId;
use hrdesk_payroll::{
    BulkGenerateResult, BulkGenerateSalaryRequest, CreateSalaryRequest, ProcessSalaryPaymentRequest,
    Salary, SalaryFilter, SalaryPage, SalaryStatistics, SalaryStatus, UpdateSalaryRequest,
    UpdateSalaryStatusRequest,
};

use crate::cache::Tag;
use crate::client::ApiClient;
use crate::dispatcher::Dispatcher;
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::request::HttpMethod;

const SALARY_WRITES: &[Tag] = &[Tag::Salaries, Tag::SalaryStatistics];

pub const MY_SALARIES: Endpoint =
    Endpoint::query("my_salaries", HttpMethod::Get, "/salaries/my-salaries", &[Tag::Salaries]);
pub const SALARY_BY_ID: Endpoint = Endpoint::query("salary_by_id", HttpMethod::Get, "/salaries/{id}", &[Tag::Salaries]);
pub const ALL_SALARIES: Endpoint = Endpoint::query("all_salaries", HttpMethod::Get, "/salaries", &[Tag::Salaries]);
pub const SALARY_STATISTICS: Endpoint = Endpoint::query(
    "salary_statistics",
    HttpMethod::Get,
    "/salaries/statistics",
    &[Tag::SalaryStatistics],
);
pub const CREATE_SALARY: Endpoint = Endpoint::mutation("create_salary", HttpMethod::Post, "/salaries", SALARY_WRITES);
pub const BULK_GENERATE: Endpoint =
    Endpoint::mutation("bulk_generate", HttpMethod::Post, "/salaries/bulk-generate", SALARY_WRITES);
pub const UPDATE_SALARY_STATUS: Endpoint = Endpoint::mutation(
    "update_salary_status",
    HttpMethod::Put,
    "/salaries/{id}/status",
    SALARY_WRITES,
);
pub const PROCESS_PAYMENT: Endpoint = Endpoint::mutation(
    "process_payment",
    HttpMethod::Post,
    "/salaries/{id}/process-payment",
    SALARY_WRITES,
);
pub const UPDATE_SALARY: Endpoint = Endpoint::mutation("update_salary", HttpMethod::Put, "/salaries/{id}", SALARY_WRITES);
pub const DELETE_SALARY: Endpoint =
    Endpoint::mutation("delete_salary", HttpMethod::Delete, "/salaries/{id}", SALARY_WRITES);

pub const ENDPOINTS: &[Endpoint] = &[
    MY_SALARIES,
    SALARY_BY_ID,
    ALL_SALARIES,
    SALARY_STATISTICS,
    CREATE_SALARY,
    BULK_GENERATE,
    UPDATE_SALARY_STATUS,
    PROCESS_PAYMENT,
    UPDATE_SALARY,
    DELETE_SALARY,
];

impl<D, S> ApiClient<D, S>
where
    D: Dispatcher,
    S: TokenStore,
{
    /// Payslips of the signed-in user. Only year, month and paging apply.
    pub async fn my_salaries(&self, filter: &SalaryFilter) -> Result<SalaryPage, ApiError> {
        let own = SalaryFilter {
            user_id: None,
            status: None,
            department: None,
            ..filter.clone()
        };
        self.query_data(&MY_SALARIES, MY_SALARIES.request().query_pairs(own.to_query()))
            .await
    }

    pub async fn salary_by_id(&self, salary_id: &SalaryId) -> Result<Salary, ApiError> {
        self.query_data(&SALARY_BY_ID, SALARY_BY_ID.request_with(&[salary_id.as_str()]))
            .await
    }

    pub async fn all_salaries(&self, filter: &SalaryFilter) -> Result<SalaryPage, ApiError> {
        self.query_data(&ALL_SALARIES, ALL_SALARIES.request().query_pairs(filter.to_query()))
            .await
    }

    pub async fn salary_statistics(&self, year: Option<i32>, department: Option<&str>) -> Result<SalaryStatistics, ApiError> {
        let request = SALARY_STATISTICS
            .request()
            .query_opt("year", year)
            .query_opt("department", department);
        self.query_data(&SALARY_STATISTICS, request).await
    }

    pub async fn create_salary(&self, request: &CreateSalaryRequest) -> Result<Salary, ApiError> {
        request.validate()?;
        self.mutate_data(&CREATE_SALARY, CREATE_SALARY.request().json(request)?)
            .await
    }

    /// Generate salary records for every active employee for one month.
    pub async fn bulk_generate(&self, request: &BulkGenerateSalaryRequest) -> Result<BulkGenerateResult, ApiError> {
        request.validate()?;
        let result: BulkGenerateResult = self
            .mutate_data(&BULK_GENERATE, BULK_GENERATE.request().json(request)?)
            .await?;
        tracing::info!(
            month = request.month,
            year = request.year,
            generated = result.success.len(),
            failed = result.failed.len(),
            "bulk salary generation finished"
        );
        Ok(result)
    }

    pub async fn update_salary_status(&self, salary_id: &SalaryId, status: SalaryStatus) -> Result<Salary, ApiError> {
        let req = UPDATE_SALARY_STATUS
            .request_with(&[salary_id.as_str()])
            .json(&UpdateSalaryStatusRequest { status })?;
        self.mutate_data(&UPDATE_SALARY_STATUS, req).await
    }

    pub async fn process_payment(
        &self,
        salary_id: &SalaryId,
        request: &ProcessSalaryPaymentRequest,
    ) -> Result<Salary, ApiError> {
        let req = PROCESS_PAYMENT
            .request_with(&[salary_id.as_str()])
            .json(request)?;
        self.mutate_data(&PROCESS_PAYMENT, req).await
    }

    pub async fn update_salary(&self, salary_id: &SalaryId, request: &UpdateSalaryRequest) -> Result<Salary, ApiError> {
        let req = UPDATE_SALARY
            .request_with(&[salary_id.as_str()])
            .json(request)?;
        self.mutate_data(&UPDATE_SALARY, req).await
    }

    pub async fn delete_salary(&self, salary_id: &SalaryId) -> Result<Acknowledgement, ApiError> {
        self.mutate_plain(&DELETE_SALARY, DELETE_SALARY.request_with(&[salary_id.as_str()]))
            .await
    }
}
