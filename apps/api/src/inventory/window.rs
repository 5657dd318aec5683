use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::wine::{DrinkingWindow, DrinkingWindowStatus, WineRow};

/// A wine is "approaching" once its earliest drinking date is this close.
pub const APPROACHING_DAYS: i64 = 180;

/// Client-supplied drinking window dates; status is always derived server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindowDates {
    pub earliest_date: NaiveDate,
    pub peak_start_date: NaiveDate,
    pub peak_end_date: NaiveDate,
    pub latest_date: NaiveDate,
}

impl From<&DrinkingWindow> for WindowDates {
    fn from(w: &DrinkingWindow) -> Self {
        WindowDates {
            earliest_date: w.earliest_date,
            peak_start_date: w.peak_start_date,
            peak_end_date: w.peak_end_date,
            latest_date: w.latest_date,
        }
    }
}

impl WindowDates {
    /// Rejects windows whose dates are out of chronological order.
    pub fn validate(&self) -> Result<(), AppError> {
        let ordered = self.earliest_date <= self.peak_start_date
            && self.peak_start_date <= self.peak_end_date
            && self.peak_end_date <= self.latest_date;
        if !ordered {
            return Err(AppError::Validation(
                "drinking_window: dates must satisfy earliest <= peak_start <= peak_end <= latest"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_window(self, today: NaiveDate) -> DrinkingWindow {
        let status = compute_window_status(&self, today);
        DrinkingWindow {
            earliest_date: self.earliest_date,
            peak_start_date: self.peak_start_date,
            peak_end_date: self.peak_end_date,
            latest_date: self.latest_date,
            status,
        }
    }
}

pub fn compute_window_status(dates: &WindowDates, today: NaiveDate) -> DrinkingWindowStatus {
    if today < dates.earliest_date {
        if (dates.earliest_date - today).num_days() <= APPROACHING_DAYS {
            DrinkingWindowStatus::Approaching
        } else {
            DrinkingWindowStatus::TooYoung
        }
    } else if today < dates.peak_start_date {
        DrinkingWindowStatus::Ready
    } else if today <= dates.peak_end_date {
        DrinkingWindowStatus::Peak
    } else if today <= dates.latest_date {
        DrinkingWindowStatus::Declining
    } else {
        DrinkingWindowStatus::OverHill
    }
}

/// Stored statuses go stale; readers recompute against today's date.
pub fn current_status(window: &DrinkingWindow, today: NaiveDate) -> DrinkingWindowStatus {
    compute_window_status(&WindowDates::from(window), today)
}

/// Rewrites the stored status on a row about to be returned to a client.
pub fn refresh_status(wine: &mut WineRow, today: NaiveDate) {
    if let Some(window) = wine.drinking_window.as_mut() {
        window.0.status = current_status(&window.0, today);
    }
}

/// How suitable a bottle is for opening now, in [0,1].
pub fn readiness_score(status: Option<DrinkingWindowStatus>) -> f64 {
    match status {
        Some(DrinkingWindowStatus::Peak) => 1.0,
        Some(DrinkingWindowStatus::Ready) | Some(DrinkingWindowStatus::Declining) => 0.7,
        // No window recorded: assume drinkable.
        None => 0.6,
        Some(DrinkingWindowStatus::Approaching) => 0.4,
        Some(DrinkingWindowStatus::TooYoung) | Some(DrinkingWindowStatus::OverHill) => 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn window() -> WindowDates {
        WindowDates {
            earliest_date: d(2024, 1, 1),
            peak_start_date: d(2026, 1, 1),
            peak_end_date: d(2030, 12, 31),
            latest_date: d(2035, 12, 31),
        }
    }

    #[test]
    fn test_status_progression() {
        let w = window();
        assert_eq!(
            compute_window_status(&w, d(2020, 1, 1)),
            DrinkingWindowStatus::TooYoung
        );
        assert_eq!(
            compute_window_status(&w, d(2023, 9, 1)),
            DrinkingWindowStatus::Approaching
        );
        assert_eq!(
            compute_window_status(&w, d(2025, 6, 1)),
            DrinkingWindowStatus::Ready
        );
        assert_eq!(
            compute_window_status(&w, d(2026, 1, 1)),
            DrinkingWindowStatus::Peak
        );
        assert_eq!(
            compute_window_status(&w, d(2032, 1, 1)),
            DrinkingWindowStatus::Declining
        );
        assert_eq!(
            compute_window_status(&w, d(2036, 1, 1)),
            DrinkingWindowStatus::OverHill
        );
    }

    #[test]
    fn test_out_of_order_dates_rejected() {
        let mut w = window();
        w.peak_end_date = d(2025, 1, 1);
        assert!(matches!(w.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_equal_dates_are_allowed() {
        let w = WindowDates {
            earliest_date: d(2025, 1, 1),
            peak_start_date: d(2025, 1, 1),
            peak_end_date: d(2025, 1, 1),
            latest_date: d(2025, 1, 1),
        };
        assert!(w.validate().is_ok());
    }

    #[test]
    fn test_refresh_replaces_stale_status() {
        use crate::inventory::stats::tests::{make_wine, with_window};

        // Saved in 2023 while still approaching its window.
        let mut wine = with_window(
            make_wine("Barolo", "red", 1),
            ["2024-01-01", "2026-01-01", "2030-12-31", "2035-12-31"],
            d(2023, 9, 1),
        );
        assert_eq!(wine.window().unwrap().status, DrinkingWindowStatus::Approaching);

        refresh_status(&mut wine, d(2027, 3, 1));
        assert_eq!(wine.window().unwrap().status, DrinkingWindowStatus::Peak);

        let mut plain = make_wine("Table red", "red", 1);
        refresh_status(&mut plain, d(2027, 3, 1));
        assert!(plain.drinking_window.is_none());
    }

    #[test]
    fn test_readiness_without_window_sits_between_ready_and_approaching() {
        assert_eq!(readiness_score(None), 0.6);
        assert_eq!(readiness_score(Some(DrinkingWindowStatus::Approaching)), 0.4);
        assert_eq!(readiness_score(Some(DrinkingWindowStatus::TooYoung)), 0.1);
    }

    #[test]
    fn test_readiness_prefers_peak() {
        assert!(
            readiness_score(Some(DrinkingWindowStatus::Peak))
                > readiness_score(Some(DrinkingWindowStatus::Ready))
        );
        assert!(
            readiness_score(Some(DrinkingWindowStatus::Ready))
                > readiness_score(Some(DrinkingWindowStatus::OverHill))
        );
    }
}
