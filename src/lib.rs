//! Core engine for a freight logistics customer portal.
//!
//! The embedding site renders pages and copy; this crate owns the parts
//! with actual control flow:
//!
//! - the multi-step **quote wizard** ([`QuoteWizard`]): collects shipment
//!   parameters, validates each step, attaches a deterministic price
//!   estimate, and persists the request exactly once;
//! - the **shipment tracker** ([`ShipmentTracker`]): resolves a tracking
//!   number or customer email to a shipment and keeps the snapshot live
//!   through a change-notification subscription;
//! - the **contact intake** ([`submit_contact`]).
//!
//! Both controllers are generic over the store traits in [`infra`], so the
//! REST-backed production client and the in-memory backend used in tests
//! are interchangeable.

pub mod controller;
pub mod domain;
pub mod infra;

pub use controller::{
    submit_contact, Advance, ContactError, QuoteWizard, SearchError, SearchOutcome,
    ShipmentTracker, TrackingView, WizardStep,
};
pub use domain::{
    estimate, validate_contact, validate_quote, ContactForm, ContactSubmission, QuoteForm,
    QuotePrefill, QuoteRequest, ServiceType, Shipment, ShipmentStatus, SpecialRequirement,
    StatusTone, TimelineEvent, ValidationErrors,
};
pub use infra::{
    MemoryStore, QuoteStore, RestStore, ShipmentStore, ShipmentWatch, StoreError,
};
