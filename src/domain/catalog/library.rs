//! Medical library documents.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{optional_text, require_text, DocumentId, Timestamp, ValidationError};

/// Document language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ru,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" => Ok(Language::Ru),
            "en" => Ok(Language::En),
            other => Err(ValidationError::invalid_format(
                "language",
                format!("unsupported language '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDocument {
    pub id: DocumentId,
    pub title: String,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub image_path: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub language: Language,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryDocumentDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub image_path: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDocumentFields {
    pub title: String,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub image_path: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub language: Language,
}

impl LibraryDocumentDraft {
    pub fn validate(&self) -> Result<LibraryDocumentFields, ValidationError> {
        let language = match self.language.as_deref().map(str::trim) {
            None | Some("") => Language::default(),
            Some(raw) => raw.parse()?,
        };

        Ok(LibraryDocumentFields {
            title: require_text("title", self.title.as_deref(), 255)?,
            description: optional_text("description", self.description.as_deref(), 50_000)?,
            file_path: optional_text("file_path", self.file_path.as_deref(), 1024)?,
            image_path: optional_text("image_path", self.image_path.as_deref(), 1024)?,
            publication_date: self.publication_date,
            language,
        })
    }
}
