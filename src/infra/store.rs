//! The record-store seam. Controllers are generic over these traits so the
//! production REST client and the in-memory backend are interchangeable.

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::{ContactSubmission, QuoteRequest, Shipment};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store rejected the request: {0}")]
    Rejected(String),
}

/// Write side of the store: single-document inserts, no partial writes.
#[allow(async_fn_in_trait)]
pub trait QuoteStore {
    async fn insert_quote(&self, quote: &QuoteRequest) -> Result<(), StoreError>;
    async fn insert_contact(&self, submission: &ContactSubmission) -> Result<(), StoreError>;
}

/// Read side of the store plus change notifications.
#[allow(async_fn_in_trait)]
pub trait ShipmentStore {
    /// Exact-match lookup by canonical (upper-case) tracking number.
    async fn shipment_by_tracking(
        &self,
        tracking_number: &str,
    ) -> Result<Option<Shipment>, StoreError>;

    /// Most recently created shipment for a customer email, if any.
    async fn latest_shipment_for_email(&self, email: &str)
        -> Result<Option<Shipment>, StoreError>;

    /// Open a change-notification stream scoped to one tracking number.
    /// Events are full replacement snapshots in the order the store emits
    /// them.
    async fn watch_shipment(&self, tracking_number: &str) -> Result<ShipmentWatch, StoreError>;
}

/// Handle on a live shipment subscription: a bounded stream of replacement
/// snapshots plus the feeder task keeping it supplied. Closing is
/// fire-and-forget and idempotent; dropping the handle closes it.
#[derive(Debug)]
pub struct ShipmentWatch {
    tracking_number: String,
    updates: mpsc::Receiver<Shipment>,
    feeder: Option<JoinHandle<()>>,
}

impl ShipmentWatch {
    pub(crate) fn new(
        tracking_number: String,
        updates: mpsc::Receiver<Shipment>,
        feeder: JoinHandle<()>,
    ) -> Self {
        Self {
            tracking_number,
            updates,
            feeder: Some(feeder),
        }
    }

    /// Tracking number this watch is filtered to.
    pub fn tracking_number(&self) -> &str {
        &self.tracking_number
    }

    /// Next replacement snapshot, or `None` once the watch is closed and
    /// drained.
    pub async fn recv(&mut self) -> Option<Shipment> {
        self.updates.recv().await
    }

    /// Release the subscription. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
        }
        self.updates.close();
    }
}

impl Drop for ShipmentWatch {
    fn drop(&mut self) {
        self.close();
    }
}
