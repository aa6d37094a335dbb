//! In-memory record store. Backs the test suites and offline demos with the
//! same contract the REST client fulfils, including change notifications.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{ContactSubmission, QuoteRequest, Shipment};
use crate::infra::store::{QuoteStore, ShipmentStore, ShipmentWatch, StoreError};

const UPDATE_BUS_CAPACITY: usize = 32;
const WATCH_CHANNEL_CAPACITY: usize = 16;

/// A persisted quote row; the store mints the id.
#[derive(Clone, Debug)]
pub struct StoredQuote {
    pub id: Uuid,
    pub request: QuoteRequest,
}

/// A persisted contact-message row.
#[derive(Clone, Debug)]
pub struct StoredContact {
    pub id: Uuid,
    pub submission: ContactSubmission,
}

#[derive(Default)]
struct Inner {
    quotes: Vec<StoredQuote>,
    contacts: Vec<StoredContact>,
    shipments: Vec<Shipment>,
    fail_writes: bool,
    fail_reads: bool,
}

#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    updates: broadcast::Sender<Shipment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_BUS_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            updates,
        }
    }

    pub async fn seed_shipment(&self, shipment: Shipment) {
        self.inner.lock().await.shipments.push(shipment);
    }

    /// Replace the stored row and notify watchers. Updates reach watchers in
    /// the order they are published here; the store is the source of truth.
    pub async fn publish_update(&self, shipment: Shipment) {
        {
            let mut inner = self.inner.lock().await;
            match inner
                .shipments
                .iter_mut()
                .find(|stored| stored.tracking_number == shipment.tracking_number)
            {
                Some(stored) => *stored = shipment.clone(),
                None => inner.shipments.push(shipment.clone()),
            }
        }
        // No receivers is fine; nobody is watching this shipment right now.
        let _ = self.updates.send(shipment);
    }

    pub async fn quotes(&self) -> Vec<StoredQuote> {
        self.inner.lock().await.quotes.clone()
    }

    pub async fn contacts(&self) -> Vec<StoredContact> {
        self.inner.lock().await.contacts.clone()
    }

    /// Make subsequent inserts fail, for exercising the retry paths.
    pub async fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().await.fail_writes = fail;
    }

    /// Make subsequent lookups fail, for exercising the transport-error
    /// paths.
    pub async fn set_fail_reads(&self, fail: bool) {
        self.inner.lock().await.fail_reads = fail;
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteStore for MemoryStore {
    async fn insert_quote(&self, quote: &QuoteRequest) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_writes {
            return Err(StoreError::Rejected("insert refused".to_string()));
        }
        inner.quotes.push(StoredQuote {
            id: Uuid::new_v4(),
            request: quote.clone(),
        });
        Ok(())
    }

    async fn insert_contact(&self, submission: &ContactSubmission) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_writes {
            return Err(StoreError::Rejected("insert refused".to_string()));
        }
        inner.contacts.push(StoredContact {
            id: Uuid::new_v4(),
            submission: submission.clone(),
        });
        Ok(())
    }
}

impl ShipmentStore for MemoryStore {
    async fn shipment_by_tracking(
        &self,
        tracking_number: &str,
    ) -> Result<Option<Shipment>, StoreError> {
        let inner = self.inner.lock().await;
        if inner.fail_reads {
            return Err(StoreError::Rejected("lookup unavailable".to_string()));
        }
        Ok(inner
            .shipments
            .iter()
            .find(|shipment| shipment.tracking_number == tracking_number)
            .cloned())
    }

    async fn latest_shipment_for_email(
        &self,
        email: &str,
    ) -> Result<Option<Shipment>, StoreError> {
        let inner = self.inner.lock().await;
        if inner.fail_reads {
            return Err(StoreError::Rejected("lookup unavailable".to_string()));
        }
        Ok(inner
            .shipments
            .iter()
            .filter(|shipment| {
                shipment
                    .customer_email
                    .as_deref()
                    .is_some_and(|stored| stored.eq_ignore_ascii_case(email))
            })
            .max_by_key(|shipment| shipment.created_at)
            .cloned())
    }

    async fn watch_shipment(&self, tracking_number: &str) -> Result<ShipmentWatch, StoreError> {
        let mut bus = self.updates.subscribe();
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let wanted = tracking_number.to_string();

        let feeder = tokio::spawn({
            let wanted = wanted.clone();
            async move {
                loop {
                    match bus.recv().await {
                        Ok(update) if update.tracking_number == wanted => {
                            if tx.send(update).await.is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // Best-effort delivery; the next update catches up.
                            debug!(skipped, %wanted, "shipment update stream lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        });

        Ok(ShipmentWatch::new(wanted, rx, feeder))
    }
}
