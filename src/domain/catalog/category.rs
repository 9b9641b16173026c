//! Event categories.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    optional_text, require_text, slugify, CategoryId, Timestamp, ValidationError,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Unvalidated category input from the back-office form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryDraft {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Validated category fields ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFields {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
}

impl CategoryDraft {
    pub fn validate(&self) -> Result<CategoryFields, ValidationError> {
        let name = require_text("name", self.name.as_deref(), 255)?;
        let slug = match optional_text("slug", self.slug.as_deref(), 255)? {
            Some(s) => slugify(&s),
            None => slugify(&name),
        };
        if slug.is_empty() {
            return Err(ValidationError::invalid_format(
                "slug",
                "could not derive a slug from the name",
            ));
        }

        Ok(CategoryFields {
            name,
            slug,
            description: optional_text("description", self.description.as_deref(), 10_000)?,
            is_active: self.is_active.unwrap_or(true),
            sort_order: self.sort_order.unwrap_or(0),
        })
    }
}
