//! Fiscal calendar and period status management.
//!
//! - `status` - The status catalog, permission table and adjacency
//! - `period_status` - Status snapshot with audit fields and deadlines
//! - `period` - Fiscal years and periods
//! - `service` - Persisted period transitions

pub mod error;
pub mod period;
pub mod period_status;
pub mod service;
pub mod status;

#[cfg(test)]
mod status_props;

pub use error::FiscalError;
pub use period::{FiscalPeriod, FiscalYear};
pub use period_status::{
    DeadlineKind, DeadlinePriority, FiscalPeriodStatus, PeriodDeadlines, ScheduledTransition,
    TransitionRequest,
};
pub use service::FiscalPeriodService;
pub use status::{FiscalPeriodStatusType, StatusGroup, StatusPermissions};
