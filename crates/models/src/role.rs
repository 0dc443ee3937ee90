use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Caller role carried by the identity claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::Admin => "admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    /// Case-insensitive; anything else is an unknown role. Unknown or
    /// missing roles are treated as unauthenticated by the guard, never
    /// defaulted to a privileged role.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "instructor" => Ok(Self::Instructor),
            "admin" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

/// The three service surfaces and the roles each admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Student,
    Instructor,
    Admin,
}

impl Surface {
    pub fn allows(self, role: Role) -> bool {
        match self {
            Self::Admin => role == Role::Admin,
            Self::Instructor => matches!(role, Role::Instructor | Role::Admin),
            Self::Student => matches!(role, Role::Student | Role::Instructor | Role::Admin),
        }
    }

    /// Roles admitted by this surface, for the denial message.
    pub fn allowed_roles(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Instructor => "instructor, admin",
            Self::Student => "student, instructor, admin",
        }
    }
}

impl Display for Surface {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Student => write!(f, "student"),
            Self::Instructor => write!(f, "instructor"),
            Self::Admin => write!(f, "admin"),
        }
    }
}
