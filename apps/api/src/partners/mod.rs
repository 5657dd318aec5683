// Drinking partners: people the user often shares bottles with.

pub mod handlers;
pub mod repo;

use serde::Deserialize;

use crate::errors::AppError;

const MAX_NAME_CHARS: usize = 100;
const MAX_NOTES_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct NewPartner {
    pub name: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub taste_notes: Option<String>,
}

fn clean_optional(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    if let Some(v) = &value {
        if v.chars().count() > MAX_NOTES_CHARS {
            return Err(AppError::Validation(format!(
                "{field}: must be at most {MAX_NOTES_CHARS} characters"
            )));
        }
    }
    Ok(value)
}

impl NewPartner {
    /// Trims fields and enforces a non-empty name.
    pub fn validated(self) -> Result<NewPartner, AppError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("name: must not be empty".to_string()));
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(AppError::Validation(format!(
                "name: must be at most {MAX_NAME_CHARS} characters"
            )));
        }
        Ok(NewPartner {
            name,
            notes: clean_optional("notes", self.notes)?,
            taste_notes: clean_optional("taste_notes", self.taste_notes)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_rejected() {
        let p = NewPartner {
            name: "   ".into(),
            notes: None,
            taste_notes: None,
        };
        assert!(matches!(p.validated(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_fields_trimmed_and_blank_notes_dropped() {
        let p = NewPartner {
            name: "  Sam ".into(),
            notes: Some("  ".into()),
            taste_notes: Some(" loves Riesling ".into()),
        }
        .validated()
        .unwrap();
        assert_eq!(p.name, "Sam");
        assert_eq!(p.notes, None);
        assert_eq!(p.taste_notes.as_deref(), Some("loves Riesling"));
    }
}
