use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not one of {allowed}")]
pub struct UnknownVariant {
    pub value: String,
    pub allowed: String,
}

/// A closed set of string-coded values stored as TEXT and exchanged verbatim over the API.
pub trait Enumeration: Copy + Sized + 'static {
    const VARIANTS: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn allowed() -> String {
        Self::VARIANTS
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn lookup(value: &str) -> Result<Self, UnknownVariant> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.as_str() == value)
            .ok_or_else(|| UnknownVariant {
                value: value.to_string(),
                allowed: Self::allowed(),
            })
    }
}

macro_rules! closed_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl Enumeration for $name {
            const VARIANTS: &'static [Self] = &[$($name::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::lookup(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownVariant;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::lookup(&value)
            }
        }
    };
}

closed_enum!(Role {
    User => "user",
    CompanyHr => "companyHR",
    Admin => "admin",
});

closed_enum!(AccountStatus {
    Online => "online",
    Offline => "offline",
    Blocked => "blocked",
});

closed_enum!(JobLocation {
    Onsite => "onsite",
    Remotely => "remotely",
    Hybrid => "hybrid",
});

closed_enum!(WorkingTime {
    PartTime => "part-time",
    FullTime => "full-time",
});

closed_enum!(SeniorityLevel {
    Junior => "Junior",
    MidLevel => "Mid-Level",
    Senior => "Senior",
    TeamLead => "Team-Lead",
    Cto => "CTO",
});

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_exact() {
        assert_eq!("companyHR".parse::<Role>().unwrap(), Role::CompanyHr);
        assert!("companyhr".parse::<Role>().is_err());
        assert_eq!(
            SeniorityLevel::try_from("Team-Lead".to_string()).unwrap(),
            SeniorityLevel::TeamLead
        );
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&WorkingTime::PartTime).unwrap();
        assert_eq!(json, "\"part-time\"");
        let status: AccountStatus = serde_json::from_str("\"blocked\"").unwrap();
        assert_eq!(status, AccountStatus::Blocked);
    }

    #[test]
    fn unknown_values_list_the_allowed_set() {
        let err = "everywhere".parse::<JobLocation>().unwrap_err();
        assert_eq!(err.allowed, "onsite, remotely, hybrid");
    }
}
