use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Aircraft types offered when registering a tail.
pub const AIRCRAFT_TYPES: [&str; 2] = ["B747", "B777"];

/// Operators offered when registering a tail.
pub const OPERATORS: [&str; 3] = ["Aerotranscargo", "Romcargo", "One Air"];

/// Longest accepted tail number.
pub const MAX_REGISTRATION_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    #[default]
    Active,
    Inactive,
}

impl RegistrationStatus {
    pub fn all() -> &'static [RegistrationStatus] {
        &[RegistrationStatus::Active, RegistrationStatus::Inactive]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Active => "active",
            RegistrationStatus::Inactive => "inactive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegistrationStatus::Active => "Active",
            RegistrationStatus::Inactive => "Inactive",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            RegistrationStatus::Active => RegistrationStatus::Inactive,
            RegistrationStatus::Inactive => RegistrationStatus::Active,
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RegistrationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(RegistrationStatus::Active),
            "inactive" => Ok(RegistrationStatus::Inactive),
            _ => Err(Error::InvalidValue {
                field: "registration status",
                value: s.to_string(),
            }),
        }
    }
}

/// An aircraft in the fleet register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    /// Tail number, stored upper case.
    pub registration: String,
    pub status: RegistrationStatus,
    pub aircraft_type: String,
    pub operator: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    pub fn is_active(&self) -> bool {
        self.status == RegistrationStatus::Active
    }
}

/// Editable fields of a registration, as entered in the form.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationDraft {
    pub registration: String,
    pub status: RegistrationStatus,
    pub aircraft_type: String,
    pub operator: String,
}

impl Default for RegistrationDraft {
    fn default() -> Self {
        Self {
            registration: String::new(),
            status: RegistrationStatus::Active,
            aircraft_type: AIRCRAFT_TYPES[0].to_string(),
            operator: OPERATORS[0].to_string(),
        }
    }
}

impl RegistrationDraft {
    pub fn of(registration: &Registration) -> Self {
        Self {
            registration: registration.registration.clone(),
            status: registration.status,
            aircraft_type: registration.aircraft_type.clone(),
            operator: registration.operator.clone(),
        }
    }

    /// The draft trimmed, with the tail upper-cased. Blank or over-long
    /// tails and empty type/operator are rejected.
    pub fn normalized(&self) -> Result<Self> {
        let tail = self.registration.trim().to_uppercase();
        if tail.is_empty() || tail.chars().count() > MAX_REGISTRATION_LEN {
            return Err(Error::InvalidValue {
                field: "registration",
                value: self.registration.clone(),
            });
        }
        let aircraft_type = self.aircraft_type.trim();
        if aircraft_type.is_empty() {
            return Err(Error::InvalidValue {
                field: "aircraft type",
                value: self.aircraft_type.clone(),
            });
        }
        let operator = self.operator.trim();
        if operator.is_empty() {
            return Err(Error::InvalidValue {
                field: "operator",
                value: self.operator.clone(),
            });
        }
        Ok(Self {
            registration: tail,
            status: self.status,
            aircraft_type: aircraft_type.to_string(),
            operator: operator.to_string(),
        })
    }

    /// A new register entry from an already normalized draft.
    pub fn into_registration(self) -> Registration {
        let now = Utc::now();
        Registration {
            id: uuid::Uuid::new_v4().to_string(),
            registration: self.registration,
            status: self.status,
            aircraft_type: self.aircraft_type,
            operator: self.operator,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Tails of the active registrations, in register order.
pub fn active_tails(registrations: &[Registration]) -> Vec<String> {
    registrations
        .iter()
        .filter(|r| r.is_active())
        .map(|r| r.registration.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(tail: &str) -> RegistrationDraft {
        RegistrationDraft {
            registration: tail.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalized_upper_cases_and_trims() {
        let d = draft("  er-jai ").normalized().unwrap();
        assert_eq!(d.registration, "ER-JAI");
        assert_eq!(d.aircraft_type, "B747");
        assert_eq!(d.status, RegistrationStatus::Active);
    }

    #[test]
    fn test_normalized_rejects_blank_and_long_tails() {
        assert!(matches!(
            draft("   ").normalized(),
            Err(Error::InvalidValue { field: "registration", .. })
        ));
        assert!(draft(&"X".repeat(21)).normalized().is_err());
        assert!(draft(&"X".repeat(20)).normalized().is_ok());

        let mut no_operator = draft("ER-JAI");
        no_operator.operator = " ".into();
        assert!(matches!(
            no_operator.normalized(),
            Err(Error::InvalidValue { field: "operator", .. })
        ));
    }

    #[test]
    fn test_status_parsing_and_toggle() {
        assert_eq!("Inactive".parse::<RegistrationStatus>().unwrap(), RegistrationStatus::Inactive);
        assert!("retired".parse::<RegistrationStatus>().is_err());
        assert_eq!(RegistrationStatus::Active.toggled(), RegistrationStatus::Inactive);
    }

    #[test]
    fn test_active_tails_skip_inactive() {
        let a = draft("YR-ABC").into_registration();
        let mut b = draft("ER-BAJ").into_registration();
        b.status = RegistrationStatus::Inactive;
        assert_eq!(active_tails(&[a, b]), vec!["YR-ABC".to_string()]);
    }
}
