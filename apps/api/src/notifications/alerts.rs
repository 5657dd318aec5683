//! Drinking-window alerts for bottles in stock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::wine::{DrinkingWindowStatus, WineRow};

/// Alert when the peak starts within this many days.
pub const ENTERING_PEAK_DAYS: i64 = 30;
/// Alert when the peak ends within this many days.
pub const LEAVING_PEAK_DAYS: i64 = 60;
pub const MAX_ALERTS: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    EnteringPeak,
    LeavingPeak,
    OverHill,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::EnteringPeak => "entering_peak",
            AlertKind::LeavingPeak => "leaving_peak",
            AlertKind::OverHill => "over_hill",
        }
    }
}

/// Ordered so that `High` sorts greatest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DrinkingWindowAlert {
    pub wine_id: Uuid,
    pub wine_name: String,
    pub kind: AlertKind,
    pub urgency: Urgency,
    /// Days until the event, or days since it for `over_hill`.
    pub days: i64,
    pub title: String,
    pub message: String,
}

fn in_days(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {n} days"),
    }
}

/// The single most pressing alert for a wine, if any. Over-the-hill beats
/// leaving peak, which beats entering peak.
pub fn classify_wine(wine: &WineRow, today: NaiveDate) -> Option<DrinkingWindowAlert> {
    if wine.quantity <= 0 {
        return None;
    }
    let window = wine.window()?;
    let name = wine.display_name();

    let to_peak_start = (window.peak_start_date - today).num_days();
    let to_peak_end = (window.peak_end_date - today).num_days();
    let since_latest = (today - window.latest_date).num_days();

    let over_hill = since_latest > 0 || window.status == DrinkingWindowStatus::OverHill;

    let (kind, urgency, days, title, message) = if over_hill {
        (
            AlertKind::OverHill,
            Urgency::High,
            since_latest.max(0),
            format!("{name} may be past its best"),
            format!(
                "{name} has passed the end of its drinking window. Open it soon, and expect it to have faded."
            ),
        )
    } else if (0..=LEAVING_PEAK_DAYS).contains(&to_peak_end) {
        (
            AlertKind::LeavingPeak,
            if to_peak_end <= 14 {
                Urgency::High
            } else {
                Urgency::Medium
            },
            to_peak_end,
            format!("{name} is leaving its peak"),
            format!(
                "{name} leaves its peak drinking window {}. Plan to open it before then.",
                in_days(to_peak_end)
            ),
        )
    } else if (0..=ENTERING_PEAK_DAYS).contains(&to_peak_start) {
        (
            AlertKind::EnteringPeak,
            if to_peak_start <= 7 {
                Urgency::Medium
            } else {
                Urgency::Low
            },
            to_peak_start,
            format!("{name} is entering its peak"),
            format!(
                "{name} reaches its peak drinking window {}.",
                in_days(to_peak_start)
            ),
        )
    } else {
        return None;
    };

    Some(DrinkingWindowAlert {
        wine_id: wine.id,
        wine_name: name,
        kind,
        urgency,
        days,
        title,
        message,
    })
}

/// Alerts for a cellar: most urgent first, then soonest, at most ten.
pub fn generate_alerts(wines: &[WineRow], today: NaiveDate) -> Vec<DrinkingWindowAlert> {
    let mut alerts: Vec<DrinkingWindowAlert> = wines
        .iter()
        .filter_map(|w| classify_wine(w, today))
        .collect();
    alerts.sort_by(|a, b| b.urgency.cmp(&a.urgency).then(a.days.cmp(&b.days)));
    alerts.truncate(MAX_ALERTS);
    alerts
}
