use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::AuthError;

/// Permissions a client may request from the authorization server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Uuid,
    TargetedId,
    Username,
    ScopedUsername,
    Email,
    Title,
    FirstName,
    LastName,
    FullName,
    Department,
    Affiliations,
    ScopedAffiliations,
    Groups,
}

impl Scope {
    pub const ALL: [Scope; 13] = [
        Scope::Uuid,
        Scope::TargetedId,
        Scope::Username,
        Scope::ScopedUsername,
        Scope::Email,
        Scope::Title,
        Scope::FirstName,
        Scope::LastName,
        Scope::FullName,
        Scope::Department,
        Scope::Affiliations,
        Scope::ScopedAffiliations,
        Scope::Groups,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uuid => "uuid",
            Self::TargetedId => "targeted_id",
            Self::Username => "username",
            Self::ScopedUsername => "scoped_username",
            Self::Email => "email",
            Self::Title => "title",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::FullName => "full_name",
            Self::Department => "department",
            Self::Affiliations => "affiliations",
            Self::ScopedAffiliations => "scoped_affiliations",
            Self::Groups => "groups",
        }
    }

    /// Space-joins `scopes` in the order given. An empty list is rejected.
    pub fn join(scopes: &[Scope]) -> Result<String, AuthError> {
        if scopes.is_empty() {
            return Err(AuthError::EmptyScopes);
        }
        let tokens: Vec<&str> = scopes.iter().map(|scope| scope.as_str()).collect();
        Ok(tokens.join(" "))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = AuthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scope| scope.as_str() == value)
            .ok_or_else(|| AuthError::UnknownScope(value.to_string()))
    }
}
