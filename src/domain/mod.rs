//! Domain logic for quoting and shipment tracking lives here.

pub mod entities;
pub mod estimate;
pub mod forms;
pub mod validation;

pub use entities::{
    ContactSubmission, QuoteRequest, ServiceType, Shipment, ShipmentStatus, SpecialRequirement,
    StatusTone, TimelineEvent,
};
pub use estimate::{base_rate, estimate, SPECIAL_REQUIREMENT_SURCHARGE, WEIGHT_FACTOR};
pub use forms::{ContactForm, QuoteForm, QuotePrefill};
pub use validation::{validate_contact, validate_quote, ValidationErrors};
