//! Controllers driven by the embedding UI: the quote wizard, the shipment
//! tracker, and the contact submission flow.

pub mod contact;
pub mod quote;
pub mod tracking;

pub use contact::{submit_contact, ContactError};
pub use quote::{Advance, QuoteWizard, WizardStep};
pub use tracking::{SearchError, SearchOutcome, ShipmentTracker, TrackingView};
