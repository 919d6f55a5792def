//! `hrdesk-payroll`
//!
//! Salary record models.

pub mod salary;

pub use salary::{
    AmountTally, BulkFailure, BulkGenerateResult, BulkGenerateSalaryRequest, CreateSalaryRequest,
    MonthTally, PaymentMethod, ProcessSalaryPaymentRequest, Salary, SalaryFilter, SalaryPage,
    SalaryStatistics, SalaryStatus, SalaryStructure, StatusBreakdown, UpdateSalaryRequest,
    UpdateSalaryStatusRequest,
};
