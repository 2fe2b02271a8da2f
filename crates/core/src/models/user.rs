//! The authenticated account as reported by `/api/auth/me`.

use serde::{Deserialize, Serialize};

use crate::types::{UserId, UserRole};

/// A storefront account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

impl User {
    /// Whether the account may use the admin data-access endpoints.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// First word of the name, for greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_defaults_to_customer() {
        let user: User =
            serde_json::from_str(r#"{"id":5,"name":"Neha Rao","email":"neha@example.com"}"#)
                .unwrap();
        assert!(!user.is_admin());
        assert_eq!(user.first_name(), "Neha");
    }

    #[test]
    fn test_admin_role() {
        let user: User = serde_json::from_str(
            r#"{"id":1,"name":"Ops","email":"ops@example.com","role":"admin"}"#,
        )
        .unwrap();
        assert!(user.is_admin());
    }
}
