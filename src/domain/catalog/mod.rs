//! Back-office catalog: categories, speakers, partners and the medical library.

mod category;
mod errors;
mod library;
mod partner;
mod speaker;

pub use category::{Category, CategoryDraft, CategoryFields};
pub use errors::CatalogError;
pub use library::{Language, LibraryDocument, LibraryDocumentDraft, LibraryDocumentFields};
pub use partner::{Partner, PartnerDraft, PartnerFields};
pub use speaker::{Speaker, SpeakerDraft, SpeakerFields};

#[cfg(test)]
pub(crate) use speaker::sample_speaker;

use crate::domain::foundation::ValidationError;

/// Unvalidated back-office input for one catalog entity.
pub trait CatalogDraft: Send + Sync {
    type Fields: Send + Sync + 'static;

    /// Entity name used in not-found messages.
    const ENTITY: &'static str;

    fn validate_fields(&self) -> Result<Self::Fields, ValidationError>;
}

impl CatalogDraft for CategoryDraft {
    type Fields = CategoryFields;
    const ENTITY: &'static str = "Category";

    fn validate_fields(&self) -> Result<CategoryFields, ValidationError> {
        self.validate()
    }
}

impl CatalogDraft for SpeakerDraft {
    type Fields = SpeakerFields;
    const ENTITY: &'static str = "Speaker";

    fn validate_fields(&self) -> Result<SpeakerFields, ValidationError> {
        self.validate()
    }
}

impl CatalogDraft for PartnerDraft {
    type Fields = PartnerFields;
    const ENTITY: &'static str = "Partner";

    fn validate_fields(&self) -> Result<PartnerFields, ValidationError> {
        self.validate()
    }
}

impl CatalogDraft for LibraryDocumentDraft {
    type Fields = LibraryDocumentFields;
    const ENTITY: &'static str = "Document";

    fn validate_fields(&self) -> Result<LibraryDocumentFields, ValidationError> {
        self.validate()
    }
}
