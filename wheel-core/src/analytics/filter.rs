//! Analytics filter
//!
//! | Field | Constraint |
//! |-------|------------|
//! | start_date / end_date | inclusive, ISO `YYYY-MM-DD` string compare |
//! | restaurant_id / rider_id / customer_id | equality |
//! | status | collapsed status equality |
//! | payment_status | equality |
//!
//! Fields combine with AND; an absent field is no constraint.

use crate::utils::time::{format_date, parse_date, shift_date};
use serde::{Deserialize, Serialize};
use shared::analytics::OrderFact;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::order::{PaymentStatus, SimpleStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SimpleStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    /// Set by [`AnalyticsFilter::merge`] when two equality constraints disagree
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    contradictory: bool,
}

fn invalid_filter(field: &str, msg: impl Into<String>) -> AppError {
    AppError::with_message(ErrorCode::InvalidFilter, msg).with_detail("field", field)
}

/// AND of two equality constraints; `Err(())` when both are set and differ
fn intersect_eq<T: Clone + PartialEq>(a: &Option<T>, b: &Option<T>) -> Result<Option<T>, ()> {
    match (a, b) {
        (Some(x), Some(y)) if x != y => Err(()),
        (Some(x), _) => Ok(Some(x.clone())),
        (None, other) => Ok(other.clone()),
    }
}

impl AnalyticsFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            ..Self::default()
        }
    }

    pub fn with_restaurant(mut self, id: impl Into<String>) -> Self {
        self.restaurant_id = Some(id.into());
        self
    }

    pub fn with_rider(mut self, id: impl Into<String>) -> Self {
        self.rider_id = Some(id.into());
        self
    }

    pub fn with_customer(mut self, id: impl Into<String>) -> Self {
        self.customer_id = Some(id.into());
        self
    }

    pub fn with_status(mut self, status: SimpleStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = Some(status);
        self
    }

    /// Reject malformed dates, inverted ranges and empty ids
    pub fn validate(&self) -> AppResult<()> {
        let start = match &self.start_date {
            Some(d) => Some(
                parse_date(d)
                    .map_err(|_| invalid_filter("start_date", format!("Invalid start_date: {}", d)))?,
            ),
            None => None,
        };
        let end = match &self.end_date {
            Some(d) => Some(
                parse_date(d)
                    .map_err(|_| invalid_filter("end_date", format!("Invalid end_date: {}", d)))?,
            ),
            None => None,
        };
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(invalid_filter(
                    "start_date",
                    format!("start_date {} is after end_date {}", s, e),
                ));
            }
        }

        for (field, value) in [
            ("restaurant_id", &self.restaurant_id),
            ("rider_id", &self.rider_id),
            ("customer_id", &self.customer_id),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(invalid_filter(field, format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }

    /// Field-wise AND
    ///
    /// Date ranges intersect. Conflicting equality constraints yield a filter
    /// that matches nothing.
    pub fn merge(&self, other: &AnalyticsFilter) -> AnalyticsFilter {
        let start_date = match (&self.start_date, &other.start_date) {
            (Some(a), Some(b)) => Some(a.max(b).clone()),
            (a, b) => a.clone().or_else(|| b.clone()),
        };
        let end_date = match (&self.end_date, &other.end_date) {
            (Some(a), Some(b)) => Some(a.min(b).clone()),
            (a, b) => a.clone().or_else(|| b.clone()),
        };

        let mut contradictory = self.contradictory || other.contradictory;
        let mut eq = |a: &Option<String>, b: &Option<String>| {
            intersect_eq(a, b).unwrap_or_else(|()| {
                contradictory = true;
                None
            })
        };
        let restaurant_id = eq(&self.restaurant_id, &other.restaurant_id);
        let rider_id = eq(&self.rider_id, &other.rider_id);
        let customer_id = eq(&self.customer_id, &other.customer_id);
        let status = intersect_eq(&self.status, &other.status).unwrap_or_else(|()| {
            contradictory = true;
            None
        });
        let payment_status =
            intersect_eq(&self.payment_status, &other.payment_status).unwrap_or_else(|()| {
                contradictory = true;
                None
            });

        AnalyticsFilter {
            start_date,
            end_date,
            restaurant_id,
            rider_id,
            customer_id,
            status,
            payment_status,
            contradictory,
        }
    }

    /// True when no fact can ever match
    pub fn is_unsatisfiable(&self) -> bool {
        if self.contradictory {
            return true;
        }
        matches!((&self.start_date, &self.end_date), (Some(s), Some(e)) if s > e)
    }

    pub fn matches_date(&self, date: &str) -> bool {
        if self.start_date.as_deref().is_some_and(|s| date < s) {
            return false;
        }
        if self.end_date.as_deref().is_some_and(|e| date > e) {
            return false;
        }
        true
    }

    pub fn matches(&self, fact: &OrderFact) -> bool {
        if self.contradictory || !self.matches_date(&fact.date) {
            return false;
        }
        if self
            .restaurant_id
            .as_deref()
            .is_some_and(|id| fact.restaurant_id != id)
        {
            return false;
        }
        if self
            .rider_id
            .as_deref()
            .is_some_and(|id| fact.rider_id.as_deref() != Some(id))
        {
            return false;
        }
        if self
            .customer_id
            .as_deref()
            .is_some_and(|id| fact.customer_id != id)
        {
            return false;
        }
        if self.status.is_some_and(|s| fact.status != s) {
            return false;
        }
        if self.payment_status.is_some_and(|s| fact.payment_status != s) {
            return false;
        }
        true
    }

    pub fn apply(&self, facts: &[OrderFact]) -> Vec<OrderFact> {
        facts.iter().filter(|f| self.matches(f)).cloned().collect()
    }

    /// Same constraints over the equally long period ending the day before `start_date`
    ///
    /// `None` unless both dates are set and parse.
    pub fn previous_period(&self) -> Option<AnalyticsFilter> {
        let start = parse_date(self.start_date.as_deref()?).ok()?;
        let end = parse_date(self.end_date.as_deref()?).ok()?;
        if start > end {
            return None;
        }
        let days = (end - start).num_days() + 1;
        let previous_end = shift_date(start, -1);
        let previous_start = shift_date(start, -days);

        let mut previous = self.clone();
        previous.start_date = Some(format_date(previous_start));
        previous.end_date = Some(format_date(previous_end));
        Some(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::facts_fixture;
    use shared::error::ErrorKind;

    #[test]
    fn test_validate() {
        assert!(AnalyticsFilter::new().validate().is_ok());
        assert!(AnalyticsFilter::between("2024-03-01", "2024-03-31").validate().is_ok());

        let err = AnalyticsFilter::between("2024-03-31", "2024-03-01")
            .validate()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFilter);
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);

        assert!(AnalyticsFilter::between("2024-02-30", "2024-03-01").validate().is_err());
        assert!(AnalyticsFilter::between("yesterday", "2024-03-01").validate().is_err());
        assert!(AnalyticsFilter::new().with_rider(" ").validate().is_err());
    }

    #[test]
    fn test_matches_date_inclusive() {
        let f = AnalyticsFilter::between("2024-03-10", "2024-03-12");
        assert!(!f.matches_date("2024-03-09"));
        assert!(f.matches_date("2024-03-10"));
        assert!(f.matches_date("2024-03-12"));
        assert!(!f.matches_date("2024-03-13"));
    }

    #[test]
    fn test_merge_intersects_ranges() {
        let a = AnalyticsFilter::between("2024-03-01", "2024-03-20").with_restaurant("rest-1");
        let b = AnalyticsFilter::between("2024-03-10", "2024-03-31").with_rider("rider-1");
        let m = a.merge(&b);
        assert_eq!(m.start_date.as_deref(), Some("2024-03-10"));
        assert_eq!(m.end_date.as_deref(), Some("2024-03-20"));
        assert_eq!(m.restaurant_id.as_deref(), Some("rest-1"));
        assert_eq!(m.rider_id.as_deref(), Some("rider-1"));
        assert!(!m.is_unsatisfiable());
    }

    #[test]
    fn test_merge_conflict_matches_nothing() {
        let a = AnalyticsFilter::new().with_status(SimpleStatus::Delivered);
        let b = AnalyticsFilter::new().with_status(SimpleStatus::Cancelled);
        assert!(a.merge(&b).is_unsatisfiable());

        let disjoint = AnalyticsFilter::between("2024-03-01", "2024-03-05")
            .merge(&AnalyticsFilter::between("2024-03-10", "2024-03-20"));
        assert!(disjoint.is_unsatisfiable());
    }

    #[test]
    fn test_merged_conflict_survives_serialization() {
        let merged = AnalyticsFilter::new()
            .with_status(SimpleStatus::Delivered)
            .merge(&AnalyticsFilter::new().with_status(SimpleStatus::Cancelled));
        let json = serde_json::to_string(&merged).unwrap();
        let restored: AnalyticsFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, merged);
        assert!(restored.is_unsatisfiable());
        assert!(restored.apply(&facts_fixture()).is_empty());

        // 普通过滤条件不带这个字段
        let plain = serde_json::to_string(&AnalyticsFilter::new().with_rider("rider-1")).unwrap();
        assert_eq!(plain, r#"{"rider_id":"rider-1"}"#);
    }

    #[test]
    fn test_previous_period() {
        let f = AnalyticsFilter::between("2024-03-08", "2024-03-14").with_restaurant("rest-1");
        let p = f.previous_period().unwrap();
        assert_eq!(p.start_date.as_deref(), Some("2024-03-01"));
        assert_eq!(p.end_date.as_deref(), Some("2024-03-07"));
        assert_eq!(p.restaurant_id.as_deref(), Some("rest-1"));

        assert!(AnalyticsFilter::new().previous_period().is_none());
        let open = AnalyticsFilter {
            start_date: Some("2024-03-08".into()),
            ..Default::default()
        };
        assert!(open.previous_period().is_none());
    }
}
