use chrono::{DateTime, NaiveDate, Utc};

use crate::contract::model::{Assignment, AssignmentStatus};
use crate::domain::error::DomainError;

impl Assignment {
    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(DomainError::invalid_state(
                "Assignment",
                format!("assignment {} is {}, expected ACTIVE", self.id, self.status),
            ))
        }
    }

    /// ACTIVE -> COMPLETED.
    pub fn check_out(&mut self, date: NaiveDate, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_active()?;
        if date < self.check_in_date {
            return Err(DomainError::validation(
                "check_out_date",
                format!("{} is before check-in {}", date, self.check_in_date),
            ));
        }
        self.status = AssignmentStatus::Completed;
        self.check_out_date = Some(date);
        self.updated_at = now;
        Ok(())
    }

    /// ACTIVE -> CANCELLED. The reason lands in `notes`.
    pub fn cancel(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.status = AssignmentStatus::Cancelled;
        let reason = reason.trim();
        if !reason.is_empty() {
            self.notes = Some(reason.to_string());
        }
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn active(check_in: NaiveDate) -> Assignment {
        let now = Utc::now();
        Assignment {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            check_in_date: check_in,
            check_out_date: None,
            status: AssignmentStatus::Active,
            monthly_fee: Some(900.0),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn check_out_is_terminal() {
        let mut a = active(d(2024, 9, 1));
        a.check_out(d(2025, 1, 15), Utc::now()).unwrap();
        assert_eq!(a.status, AssignmentStatus::Completed);
        assert_eq!(a.check_out_date, Some(d(2025, 1, 15)));

        assert!(a.check_out(d(2025, 1, 16), Utc::now()).is_err());
        assert!(a.cancel("late", Utc::now()).is_err());
    }

    #[test]
    fn check_out_before_check_in_is_rejected() {
        let mut a = active(d(2024, 9, 1));
        let err = a.check_out(d(2024, 8, 31), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert!(a.is_active());
    }

    #[test]
    fn cancel_records_reason() {
        let mut a = active(d(2024, 9, 1));
        a.notes = Some("bunk by the window".into());
        a.cancel("moved off campus", Utc::now()).unwrap();
        assert_eq!(a.status, AssignmentStatus::Cancelled);
        assert_eq!(a.check_out_date, None);
        assert_eq!(a.notes.as_deref(), Some("moved off campus"));
    }
}
