//! Site-wide contact settings and the contact form message.

use serde::{Deserialize, Serialize};

/// Contact details shown in the footer and on the contact page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSettings {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub working_hours: Option<String>,
}

impl ContactSettings {
    /// `wa.me` link built from the WhatsApp number's digits.
    #[must_use]
    pub fn whatsapp_link(&self) -> Option<String> {
        let digits: String = self
            .whatsapp
            .as_deref()?
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        (!digits.is_empty()).then(|| format!("https://wa.me/{digits}"))
    }
}

/// Body of `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatsapp_link() {
        let settings = ContactSettings {
            whatsapp: Some("+91 98450-12345".to_string()),
            ..ContactSettings::default()
        };
        assert_eq!(
            settings.whatsapp_link().as_deref(),
            Some("https://wa.me/919845012345")
        );
        assert_eq!(ContactSettings::default().whatsapp_link(), None);
    }
}
