//! Saved service addresses.

use serde::{Deserialize, Serialize};

use crate::types::AddressId;

/// An address where a service is performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAddress {
    pub id: AddressId,
    #[serde(default)]
    pub label: Option<String>,
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default)]
    pub landmark: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl UserAddress {
    /// Single-line rendering for summaries.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.address_line1.as_str()];
        if let Some(line2) = self.address_line2.as_deref().filter(|l| !l.is_empty()) {
            parts.push(line2);
        }
        parts.push(&self.city);
        parts.push(&self.state);
        format!("{} - {}", parts.join(", "), self.pincode)
    }
}

/// Why an address form was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("Pincode must be 6 digits")]
    InvalidPincode,
    #[error("Phone number must have 10 digits")]
    InvalidPhone,
}

/// Body for creating or updating an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressInput {
    /// Trim every field and turn blank optional fields into `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn opt(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            label: opt(self.label),
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address_line1: self.address_line1.trim().to_string(),
            address_line2: opt(self.address_line2),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            pincode: self.pincode.trim().to_string(),
            landmark: opt(self.landmark),
            is_default: self.is_default,
        }
    }

    /// Check required fields and formats.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), AddressError> {
        let required = [
            ("Full name", &self.full_name),
            ("Phone", &self.phone),
            ("Address", &self.address_line1),
            ("City", &self.city),
            ("State", &self.state),
            ("Pincode", &self.pincode),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AddressError::Missing(name));
            }
        }

        let pincode = self.pincode.trim();
        if pincode.len() != 6 || !pincode.chars().all(|c| c.is_ascii_digit()) {
            return Err(AddressError::InvalidPincode);
        }

        let digits = self.phone.chars().filter(char::is_ascii_digit).count();
        if digits < 10 {
            return Err(AddressError::InvalidPhone);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> AddressInput {
        AddressInput {
            label: Some("Home".to_string()),
            full_name: "Asha Menon".to_string(),
            phone: "+91 98450 12345".to_string(),
            address_line1: "12 MG Road".to_string(),
            address_line2: Some("   ".to_string()),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
            landmark: None,
            is_default: true,
        }
    }

    #[test]
    fn test_valid_address() {
        assert_eq!(input().validate(), Ok(()));
    }

    #[test]
    fn test_missing_field() {
        let mut a = input();
        a.city = " ".to_string();
        assert_eq!(a.validate(), Err(AddressError::Missing("City")));
    }

    #[test]
    fn test_invalid_pincode() {
        let mut a = input();
        a.pincode = "56001".to_string();
        assert_eq!(a.validate(), Err(AddressError::InvalidPincode));
        a.pincode = "56000A".to_string();
        assert_eq!(a.validate(), Err(AddressError::InvalidPincode));
    }

    #[test]
    fn test_invalid_phone() {
        let mut a = input();
        a.phone = "12345".to_string();
        assert_eq!(a.validate(), Err(AddressError::InvalidPhone));
    }

    #[test]
    fn test_normalized_drops_blank_optionals() {
        let a = input().normalized();
        assert_eq!(a.address_line2, None);
        assert_eq!(a.label.as_deref(), Some("Home"));
    }

    #[test]
    fn test_one_line() {
        let address = UserAddress {
            id: AddressId::new(1),
            label: None,
            full_name: "Asha".to_string(),
            phone: "9845012345".to_string(),
            address_line1: "12 MG Road".to_string(),
            address_line2: Some("Flat 4B".to_string()),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
            landmark: None,
            is_default: false,
        };
        assert_eq!(
            address.one_line(),
            "12 MG Road, Flat 4B, Bengaluru, Karnataka - 560001"
        );
    }
}
