//! Client-side form state: raw values exactly as the user entered them.
//! Typed records are only produced once validation has passed.

use std::collections::BTreeSet;

use time::Date;

use super::entities::{ContactSubmission, QuoteRequest, ServiceType, SpecialRequirement};
use super::validation::{parse_positive, validate_quote, ValidationErrors};

/// Working state of the quote wizard. Numeric fields stay raw strings so
/// validation can report exactly what the user typed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuoteForm {
    pub service_type: Option<ServiceType>,
    pub origin: String,
    pub destination: String,
    pub pickup_date: Option<Date>,
    pub delivery_date: Option<Date>,
    pub weight: String,
    pub length: String,
    pub width: String,
    pub height: String,
    pub special_requirements: BTreeSet<SpecialRequirement>,
    pub contact_name: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
}

impl QuoteForm {
    pub fn from_prefill(prefill: QuotePrefill) -> Self {
        Self {
            service_type: ServiceType::parse(&prefill.service_type),
            origin: prefill.origin,
            destination: prefill.destination,
            weight: prefill.weight,
            ..Self::default()
        }
    }

    /// Flip a special requirement in or out of the set.
    pub fn toggle_requirement(&mut self, requirement: SpecialRequirement) {
        if !self.special_requirements.remove(&requirement) {
            self.special_requirements.insert(requirement);
        }
    }

    /// Convert the form into the record to persist. Re-runs validation so a
    /// request can never be built from an invalid form; unparseable optional
    /// dimensions are dropped rather than rejected.
    pub fn build_request(&self, estimated_cost: u32) -> Result<QuoteRequest, ValidationErrors> {
        let errors = validate_quote(self);
        if !errors.is_empty() {
            return Err(errors);
        }

        let Some(service_type) = self.service_type else {
            return Err(ValidationErrors::single(
                "service_type",
                "Select a service type",
            ));
        };
        let Some(weight) = parse_positive(&self.weight) else {
            return Err(ValidationErrors::single(
                "weight",
                "Enter the shipment weight as a positive number",
            ));
        };

        let company = self.company_name.trim();
        Ok(QuoteRequest {
            service_type,
            origin: self.origin.trim().to_string(),
            destination: self.destination.trim().to_string(),
            pickup_date: self.pickup_date,
            delivery_date: self.delivery_date,
            weight,
            length: parse_positive(&self.length),
            width: parse_positive(&self.width),
            height: parse_positive(&self.height),
            special_requirements: self.special_requirements.clone(),
            contact_name: self.contact_name.trim().to_string(),
            company_name: (!company.is_empty()).then(|| company.to_string()),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            estimated_cost,
        })
    }
}

/// Partial pre-fill handed over by the quick-quote widget elsewhere on the
/// site. Everything is raw text; an unknown service slug simply leaves the
/// service unselected in step one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuotePrefill {
    pub service_type: String,
    pub origin: String,
    pub destination: String,
    pub weight: String,
}

/// Working state of the contact page form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub message: String,
}

impl ContactForm {
    pub fn into_submission(self) -> ContactSubmission {
        let phone = self.phone.trim();
        let company = self.company.trim();
        ContactSubmission {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            company: (!company.is_empty()).then(|| company.to_string()),
            message: self.message.trim().to_string(),
        }
    }
}
