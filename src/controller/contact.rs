//! One-shot contact-message submission: validate, convert, insert.

use thiserror::Error;
use tracing::debug;

use crate::domain::validation::{validate_contact, ValidationErrors};
use crate::domain::ContactForm;
use crate::infra::store::{QuoteStore, StoreError};

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("the form has invalid fields")]
    Invalid(ValidationErrors),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validate and persist a contact message. Field problems come back as
/// `Invalid`; store problems are retryable and lose nothing.
pub async fn submit_contact<S: QuoteStore>(store: &S, form: &ContactForm) -> Result<(), ContactError> {
    let errors = validate_contact(form);
    if !errors.is_empty() {
        return Err(ContactError::Invalid(errors));
    }

    let submission = form.clone().into_submission();
    store.insert_contact(&submission).await?;
    debug!("contact message persisted");
    Ok(())
}
