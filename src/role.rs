use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::SessionError, models::Session};

/// Role
///
/// The authorization identity of the signed-in principal.
///
/// The five admin categories known to the dashboard are enumerated explicitly. Any
/// other role string the server hands out lands in `Unrecognized`, so a role added
/// server-side does not break deserialization, while every `match` on `Role` still
/// has to decide what that new role may do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    SuperAdmin,
    PteAdmin,
    IeltsAdmin,
    DuolingoAdmin,
    SatAdmin,
    /// A non-empty role string not (yet) enumerated client-side.
    Unrecognized(String),
}

impl Role {
    /// Every enumerated role, in menu order.
    pub const KNOWN: [Role; 5] = [
        Role::SuperAdmin,
        Role::PteAdmin,
        Role::IeltsAdmin,
        Role::DuolingoAdmin,
        Role::SatAdmin,
    ];

    /// Wire form of the role, as the Auth API spells it.
    pub fn as_str(&self) -> &str {
        match self {
            Role::SuperAdmin => "superAdmin",
            Role::PteAdmin => "pteAdmin",
            Role::IeltsAdmin => "ieltsAdmin",
            Role::DuolingoAdmin => "duolingoAdmin",
            Role::SatAdmin => "satAdmin",
            Role::Unrecognized(raw) => raw,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    /// Re-reads a hand-built `Unrecognized` through `FromStr`, so
    /// `Unrecognized("superAdmin")` becomes `SuperAdmin` and a blank string is refused.
    pub(crate) fn normalized(self) -> Result<Role, SessionError> {
        match self {
            Role::Unrecognized(raw) => raw.parse(),
            known => Ok(known),
        }
    }
}

impl FromStr for Role {
    type Err = SessionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let role = match trimmed {
            "" => return Err(SessionError::InvalidSession),
            "superAdmin" => Role::SuperAdmin,
            "pteAdmin" => Role::PteAdmin,
            "ieltsAdmin" => Role::IeltsAdmin,
            "duolingoAdmin" => Role::DuolingoAdmin,
            "satAdmin" => Role::SatAdmin,
            other => Role::Unrecognized(other.to_string()),
        };
        Ok(role)
    }
}

impl TryFrom<String> for Role {
    type Error = SessionError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// resolve
///
/// Maps the current session to the principal's role. An empty session resolves to
/// `None`, which callers must treat as "unauthenticated". No default role is ever
/// substituted.
pub fn resolve(session: &Session) -> Option<Role> {
    session.principal.as_ref().map(|principal| principal.role.clone())
}
