//! Static page content: the About and Contact documents.

use serde::{Deserialize, Serialize};

use super::non_empty;
use crate::errors::AppError;

/// Logical key of a singleton content document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKey {
    About,
    Contact,
}

impl ContentKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKey::About => "about",
            ContentKey::Contact => "contact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutContent {
    pub hero_title: String,
    pub hero_subtitle: String,
    #[serde(default)]
    pub story: String,
    #[serde(default)]
    pub mission: String,
    #[serde(default)]
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address_lines: Vec<String>,
    #[serde(default)]
    pub business_hours_lines: Vec<String>,
}

/// Request body for PUT /api/content/about.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutContentRequest {
    #[serde(default)]
    pub hero_title: Option<String>,
    #[serde(default)]
    pub hero_subtitle: Option<String>,
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default)]
    pub mission: Option<String>,
    #[serde(default)]
    pub reasons: Option<Vec<String>>,
}

impl AboutContentRequest {
    pub fn validate(self) -> Result<AboutContent, AppError> {
        let (Some(hero_title), Some(hero_subtitle)) =
            (non_empty(self.hero_title), non_empty(self.hero_subtitle))
        else {
            return Err(AppError::Validation(
                "heroTitle and heroSubtitle are required".to_string(),
            ));
        };

        Ok(AboutContent {
            hero_title,
            hero_subtitle,
            story: self.story.unwrap_or_default(),
            mission: self.mission.unwrap_or_default(),
            reasons: self.reasons.unwrap_or_default(),
        })
    }
}

/// Request body for PUT /api/content/contact.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfoRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address_lines: Option<Vec<String>>,
    #[serde(default)]
    pub business_hours_lines: Option<Vec<String>>,
}

impl ContactInfoRequest {
    pub fn validate(self) -> Result<ContactInfo, AppError> {
        let (Some(email), Some(phone)) = (non_empty(self.email), non_empty(self.phone)) else {
            return Err(AppError::Validation(
                "email and phone are required".to_string(),
            ));
        };

        Ok(ContactInfo {
            email,
            phone,
            address_lines: self.address_lines.unwrap_or_default(),
            business_hours_lines: self.business_hours_lines.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_about_defaults() {
        let about = AboutContentRequest {
            hero_title: Some("Discover Korea".into()),
            hero_subtitle: Some("Small group tours".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(about.story, "");
        assert_eq!(about.mission, "");
        assert!(about.reasons.is_empty());
    }

    #[test]
    fn test_about_requires_hero_fields() {
        let missing = AboutContentRequest {
            hero_subtitle: Some("Small group tours".into()),
            ..Default::default()
        };
        assert!(matches!(missing.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_contact_requires_email_and_phone() {
        let missing_phone = ContactInfoRequest {
            email: Some("hello@ktravel.example".into()),
            phone: Some(String::new()),
            ..Default::default()
        };
        assert!(missing_phone.validate().is_err());

        let ok = ContactInfoRequest {
            email: Some("hello@ktravel.example".into()),
            phone: Some("+82 2 000 0000".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert!(ok.address_lines.is_empty());
        assert!(ok.business_hours_lines.is_empty());
    }
}
