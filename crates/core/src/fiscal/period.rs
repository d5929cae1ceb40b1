//! Fiscal year and period types.

use chartwell_shared::types::{CompanyId, FiscalPeriodId, FiscalYearId};
use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::FiscalError;
use super::period_status::{FiscalPeriodStatus, TransitionRequest};
use super::status::FiscalPeriodStatusType;

/// Fiscal year definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear {
    /// Unique identifier.
    pub id: FiscalYearId,
    /// Company this fiscal year belongs to.
    pub company_id: CompanyId,
    /// Year name (e.g., "FY2026").
    pub name: String,
    /// Start date of the fiscal year.
    pub start_date: NaiveDate,
    /// End date of the fiscal year.
    pub end_date: NaiveDate,
    /// Whether this is the current active fiscal year.
    pub is_active: bool,
}

impl FiscalYear {
    /// Creates a fiscal year.
    ///
    /// # Errors
    ///
    /// Fails if `start_date` is after `end_date`.
    pub fn new(
        company_id: CompanyId,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, FiscalError> {
        if start_date > end_date {
            return Err(FiscalError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            id: FiscalYearId::new(),
            company_id,
            name: name.into(),
            start_date,
            end_date,
            is_active: true,
        })
    }

    /// Returns true if the given date falls within this year.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Splits the year into calendar-month periods, numbered from 1.
    ///
    /// Every period starts as `FuturePeriod`; the last one ends on the
    /// year's end date.
    #[must_use]
    pub fn monthly_periods(&self) -> Vec<FiscalPeriod> {
        let mut periods = Vec::new();
        let mut start = self.start_date;
        let mut number = 1;
        while start <= self.end_date {
            let next = start
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX);
            let end = next
                .checked_sub_days(Days::new(1))
                .map_or(self.end_date, |d| d.min(self.end_date));
            periods.push(FiscalPeriod {
                id: FiscalPeriodId::new(),
                fiscal_year_id: self.id,
                period_number: number,
                name: start.format("%B %Y").to_string(),
                start_date: start,
                end_date: end,
                status: FiscalPeriodStatus::new(FiscalPeriodStatusType::FuturePeriod),
                version: 0,
            });
            if next == NaiveDate::MAX {
                break;
            }
            start = next;
            number += 1;
        }
        periods
    }
}

/// A fiscal period within a fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Fiscal year this period belongs to.
    pub fiscal_year_id: FiscalYearId,
    /// Period number within the year (1-12 for monthly).
    pub period_number: u32,
    /// Period name (e.g., "January 2026").
    pub name: String,
    /// Start date of the period.
    pub start_date: NaiveDate,
    /// End date of the period.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: FiscalPeriodStatus,
    /// Optimistic concurrency version.
    pub version: i64,
}

impl FiscalPeriod {
    /// Creates a period.
    ///
    /// # Errors
    ///
    /// Fails if `start_date` is after `end_date`.
    pub fn new(
        fiscal_year_id: FiscalYearId,
        period_number: u32,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: FiscalPeriodStatus,
    ) -> Result<Self, FiscalError> {
        if start_date > end_date {
            return Err(FiscalError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            id: FiscalPeriodId::new(),
            fiscal_year_id,
            period_number,
            name: name.into(),
            start_date,
            end_date,
            status,
            version: 0,
        })
    }

    /// Returns true if transactions can be posted to this period.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status.allows_new_transactions()
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Moves the period to another status. Returns the previous status type.
    ///
    /// # Errors
    ///
    /// See [`FiscalPeriodStatus::transition_to`]; the period is unchanged on
    /// error.
    pub fn transition(
        &mut self,
        request: &TransitionRequest,
        now: DateTime<Utc>,
    ) -> Result<FiscalPeriodStatusType, FiscalError> {
        let next = self.status.transition_to(request, now)?;
        let previous = self.status.status();
        self.status = next;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_contains_date_is_inclusive() {
        let period = FiscalPeriod::new(
            FiscalYearId::new(),
            1,
            "January 2026",
            date(2026, 1, 1),
            date(2026, 1, 31),
            FiscalPeriodStatus::new(FiscalPeriodStatusType::Open),
        )
        .unwrap();
        assert!(period.contains_date(date(2026, 1, 1)));
        assert!(period.contains_date(date(2026, 1, 31)));
        assert!(!period.contains_date(date(2026, 2, 1)));
        assert!(period.is_open());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = FiscalYear::new(CompanyId::new(), "FY", date(2026, 12, 31), date(2026, 1, 1));
        assert!(matches!(result, Err(FiscalError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_monthly_periods() {
        let year = FiscalYear::new(CompanyId::new(), "FY2026", date(2026, 1, 1), date(2026, 12, 31))
            .unwrap();
        let periods = year.monthly_periods();
        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].name, "January 2026");
        assert_eq!(periods[1].end_date, date(2026, 2, 28));
        assert_eq!(periods[11].period_number, 12);
        assert_eq!(periods[11].end_date, date(2026, 12, 31));
        assert!(periods.iter().all(|p| p.fiscal_year_id == year.id));
        assert!(
            periods
                .iter()
                .all(|p| p.status.status() == FiscalPeriodStatusType::FuturePeriod)
        );
    }

    #[test]
    fn test_transition_updates_period() {
        let mut period = FiscalPeriod::new(
            FiscalYearId::new(),
            1,
            "January 2026",
            date(2026, 1, 1),
            date(2026, 1, 31),
            FiscalPeriodStatus::new(FiscalPeriodStatusType::FuturePeriod),
        )
        .unwrap();
        let previous = period
            .transition(&TransitionRequest::to(FiscalPeriodStatusType::Open), Utc::now())
            .unwrap();
        assert_eq!(previous, FiscalPeriodStatusType::FuturePeriod);
        assert!(period.is_open());

        let err = period
            .transition(&TransitionRequest::to(FiscalPeriodStatusType::Archived), Utc::now())
            .unwrap_err();
        assert!(matches!(err, FiscalError::InvalidTransition { .. }));
        assert_eq!(period.status.status(), FiscalPeriodStatusType::Open);
    }
}
