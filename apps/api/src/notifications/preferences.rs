//! Notification preferences: defaults, full replacement and partial merge.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::notification::NotificationPreferencesRow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Immediate,
    Daily,
    Weekly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Immediate => "immediate",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }

    /// Days during which the same alert is not repeated.
    pub fn repeat_after_days(&self) -> i32 {
        match self {
            Frequency::Immediate | Frequency::Daily => 1,
            Frequency::Weekly => 7,
        }
    }

    fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_lowercase().as_str() {
            "immediate" => Ok(Frequency::Immediate),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            _ => Err(AppError::Validation(
                "frequency: must be one of immediate, daily, weekly".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationPreferences {
    pub drinking_window_alerts: bool,
    pub recommendation_alerts: bool,
    pub inventory_reminders: bool,
    pub system_alerts: bool,
    pub email_enabled: bool,
    pub push_enabled: bool,
    pub quiet_hours_enabled: bool,
    pub quiet_hours_start: String,
    pub quiet_hours_end: String,
    pub frequency: Frequency,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            drinking_window_alerts: true,
            recommendation_alerts: true,
            inventory_reminders: true,
            system_alerts: true,
            email_enabled: false,
            push_enabled: false,
            quiet_hours_enabled: false,
            quiet_hours_start: "22:00".to_string(),
            quiet_hours_end: "08:00".to_string(),
            frequency: Frequency::Daily,
        }
    }
}

impl From<NotificationPreferencesRow> for NotificationPreferences {
    fn from(row: NotificationPreferencesRow) -> Self {
        Self {
            drinking_window_alerts: row.drinking_window_alerts,
            recommendation_alerts: row.recommendation_alerts,
            inventory_reminders: row.inventory_reminders,
            system_alerts: row.system_alerts,
            email_enabled: row.email_enabled,
            push_enabled: row.push_enabled,
            quiet_hours_enabled: row.quiet_hours_enabled,
            quiet_hours_start: row.quiet_hours_start,
            quiet_hours_end: row.quiet_hours_end,
            frequency: Frequency::parse(&row.frequency).unwrap_or(Frequency::Daily),
        }
    }
}

impl NotificationPreferences {
    /// True when `now` falls in the quiet window. Windows may wrap midnight.
    pub fn is_quiet_at(&self, now: NaiveTime) -> bool {
        if !self.quiet_hours_enabled {
            return false;
        }
        let (Ok(start), Ok(end)) = (parse_hhmm(&self.quiet_hours_start), parse_hhmm(&self.quiet_hours_end))
        else {
            return false;
        };
        if start <= end {
            now >= start && now < end
        } else {
            now >= start || now < end
        }
    }
}

fn parse_hhmm(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M")
}

fn check_hhmm(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.len() != 5 || parse_hhmm(trimmed).is_err() {
        return Err(AppError::Validation(format!(
            "{field}: must be a time in HH:MM format"
        )));
    }
    Ok(trimmed.to_string())
}

/// Request body for both PUT and PATCH. Every field is optional at the type
/// level so that a missing boolean on PUT yields a field-level 400.
#[derive(Debug, Default, Deserialize)]
pub struct PreferencesInput {
    pub drinking_window_alerts: Option<bool>,
    pub recommendation_alerts: Option<bool>,
    pub inventory_reminders: Option<bool>,
    pub system_alerts: Option<bool>,
    pub email_enabled: Option<bool>,
    pub push_enabled: Option<bool>,
    pub quiet_hours_enabled: Option<bool>,
    pub quiet_hours_start: Option<String>,
    pub quiet_hours_end: Option<String>,
    pub frequency: Option<String>,
}

impl PreferencesInput {
    fn booleans(&self) -> [(&'static str, Option<bool>); 7] {
        [
            ("drinking_window_alerts", self.drinking_window_alerts),
            ("recommendation_alerts", self.recommendation_alerts),
            ("inventory_reminders", self.inventory_reminders),
            ("system_alerts", self.system_alerts),
            ("email_enabled", self.email_enabled),
            ("push_enabled", self.push_enabled),
            ("quiet_hours_enabled", self.quiet_hours_enabled),
        ]
    }

    /// Full replacement: every boolean is required. Times and frequency fall
    /// back to the defaults when omitted.
    pub fn into_replacement(self) -> Result<NotificationPreferences, AppError> {
        let missing: Vec<&str> = self
            .booleans()
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }
        self.merge_onto(NotificationPreferences::default())
    }

    /// Partial update over an existing record.
    pub fn merge_onto(
        self,
        base: NotificationPreferences,
    ) -> Result<NotificationPreferences, AppError> {
        let quiet_hours_start = match self.quiet_hours_start {
            Some(v) => check_hhmm("quiet_hours_start", &v)?,
            None => base.quiet_hours_start,
        };
        let quiet_hours_end = match self.quiet_hours_end {
            Some(v) => check_hhmm("quiet_hours_end", &v)?,
            None => base.quiet_hours_end,
        };
        let frequency = match self.frequency {
            Some(v) => Frequency::parse(&v)?,
            None => base.frequency,
        };

        Ok(NotificationPreferences {
            drinking_window_alerts: self
                .drinking_window_alerts
                .unwrap_or(base.drinking_window_alerts),
            recommendation_alerts: self
                .recommendation_alerts
                .unwrap_or(base.recommendation_alerts),
            inventory_reminders: self
                .inventory_reminders
                .unwrap_or(base.inventory_reminders),
            system_alerts: self.system_alerts.unwrap_or(base.system_alerts),
            email_enabled: self.email_enabled.unwrap_or(base.email_enabled),
            push_enabled: self.push_enabled.unwrap_or(base.push_enabled),
            quiet_hours_enabled: self.quiet_hours_enabled.unwrap_or(base.quiet_hours_enabled),
            quiet_hours_start,
            quiet_hours_end,
            frequency,
        })
    }
}
