//! Partner organisations shown on the portal.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{optional_text, require_text, PartnerId, Timestamp, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    pub description: Option<String>,
    pub logo_path: Option<String>,
    pub website_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_path: Option<String>,
    pub website_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerFields {
    pub name: String,
    pub description: Option<String>,
    pub logo_path: Option<String>,
    pub website_url: Option<String>,
}

impl PartnerDraft {
    pub fn validate(&self) -> Result<PartnerFields, ValidationError> {
        let website_url = optional_text("website_url", self.website_url.as_deref(), 1024)?;
        if let Some(url) = &website_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ValidationError::invalid_format(
                    "website_url",
                    "must start with http:// or https://",
                ));
            }
        }

        Ok(PartnerFields {
            name: require_text("name", self.name.as_deref(), 255)?,
            description: optional_text("description", self.description.as_deref(), 10_000)?,
            logo_path: optional_text("logo_path", self.logo_path.as_deref(), 1024)?,
            website_url,
        })
    }
}
