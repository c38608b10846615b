// ── Authenticated principals ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ids::PrincipalId;

/// Platform role carried on every user record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

/// An authenticated actor, supplied by the identity provider.
///
/// `is_super_admin` is a separate flag on the user record and is what the
/// access guard consults; a `SUPER_ADMIN` role without the flag grants
/// nothing beyond role membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: Role,
    #[serde(default)]
    pub is_super_admin: bool,
}

impl Principal {
    pub fn new(id: impl Into<PrincipalId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            is_super_admin: false,
        }
    }

    pub fn user(id: &str) -> Self {
        Self::new(id, Role::User)
    }

    pub fn admin(id: &str) -> Self {
        Self::new(id, Role::Admin)
    }

    pub fn super_admin(id: &str) -> Self {
        Self {
            is_super_admin: true,
            ..Self::new(id, Role::SuperAdmin)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_from_wire_spelling() {
        assert_eq!("SUPER_ADMIN".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn principal_deserializes_without_flag() {
        let p: Principal = serde_json::from_str(r#"{"id":"u1","role":"USER"}"#).unwrap();
        assert_eq!(p, Principal::user("u1"));
    }
}
