//! Field validation for the portal's forms. All rules for a form are
//! evaluated in a single pass; every violation is collected, none short-
//! circuits another field.

use std::collections::BTreeMap;

use super::forms::{ContactForm, QuoteForm};

/// Mapping from field name to a human-readable violation. Empty means the
/// form is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    by_field: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.by_field.insert(field, message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_field.len()
    }

    pub fn message(&self, field: &str) -> Option<&str> {
        self.by_field.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.by_field
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }
}

/// Validate the full quote form, the gate in front of the estimate step.
pub fn validate_quote(form: &QuoteForm) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if form.service_type.is_none() {
        errors.insert("service_type", "Select a service type");
    }
    if form.origin.trim().is_empty() {
        errors.insert("origin", "Enter the origin city or location");
    }
    if form.destination.trim().is_empty() {
        errors.insert("destination", "Enter the destination city or location");
    }
    if form.weight.trim().is_empty() {
        errors.insert("weight", "Weight is required");
    } else if parse_positive(&form.weight).is_none() {
        errors.insert("weight", "Enter the shipment weight as a positive number");
    }
    if form.contact_name.trim().is_empty() {
        errors.insert("contact_name", "Enter your full name");
    }
    if form.email.trim().is_empty() {
        errors.insert("email", "Email address is required");
    } else if !email_shape_ok(form.email.trim()) {
        errors.insert("email", "Enter a valid email address");
    }
    if form.phone.trim().is_empty() {
        errors.insert("phone", "Phone number is required");
    }

    errors
}

/// Validate the contact page form. Phone and company are optional there.
pub fn validate_contact(form: &ContactForm) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if form.name.trim().is_empty() {
        errors.insert("name", "Enter your name");
    }
    if form.email.trim().is_empty() {
        errors.insert("email", "Email address is required");
    } else if !email_shape_ok(form.email.trim()) {
        errors.insert("email", "Enter a valid email address");
    }
    if form.message.trim().is_empty() {
        errors.insert("message", "Enter a message");
    }

    errors
}

/// Parse a raw numeric input, accepting only finite values greater than zero.
pub(crate) fn parse_positive(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

/// `local@domain.tld` shape check; intentionally no more clever than the
/// address pattern the forms advertise.
fn email_shape_ok(value: &str) -> bool {
    if value.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}
