//! Record-store implementations and the traits the controllers depend on.

pub mod memory;
pub mod rest;
pub mod store;

pub use memory::{MemoryStore, StoredContact, StoredQuote};
pub use rest::RestStore;
pub use store::{QuoteStore, ShipmentStore, ShipmentWatch, StoreError};
