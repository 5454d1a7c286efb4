use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Organizer,
    Admin,
}

impl UserRole {
    /// Admins inherit every organizer capability.
    pub fn can_manage_events(self) -> bool {
        matches!(self, UserRole::Organizer | UserRole::Admin)
    }

    pub fn is_admin(self) -> bool {
        self == UserRole::Admin
    }

    /// Where a client should land after signing in.
    pub fn landing_path(self) -> &'static str {
        match self {
            UserRole::Admin => "/admin",
            UserRole::Organizer => "/organizer",
            UserRole::User => "/",
        }
    }
}

/// Public view of a user row; the password hash is never selected into it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_capabilities() {
        assert!(!UserRole::User.can_manage_events());
        assert!(UserRole::Organizer.can_manage_events());
        assert!(UserRole::Admin.can_manage_events());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Organizer.is_admin());
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(
            serde_json::to_string(&UserRole::Organizer).unwrap(),
            "\"organizer\""
        );
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
        assert!(serde_json::from_str::<UserRole>("\"root\"").is_err());
    }

    #[test]
    fn test_landing_path() {
        assert_eq!(UserRole::Admin.landing_path(), "/admin");
        assert_eq!(UserRole::Organizer.landing_path(), "/organizer");
        assert_eq!(UserRole::User.landing_path(), "/");
    }
}
