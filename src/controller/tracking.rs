//! Shipment lookup with live updates. A search resolves an identifier to a
//! snapshot, then keeps it current through a store subscription scoped to
//! that shipment until the next search, a reset, or disposal.

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::Shipment;
use crate::infra::store::{ShipmentStore, ShipmentWatch, StoreError};

/// What the tracking page should currently show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingView {
    /// Nothing searched yet.
    Idle,
    /// A lookup is in flight.
    Loading,
    /// A shipment is displayed and subscribed to.
    Live,
    /// The search completed but matched nothing.
    NotFound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Found,
    NotFound,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("enter a tracking number or email address")]
    EmptyQuery,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct ShipmentTracker<S> {
    store: S,
    snapshot: Option<Shipment>,
    watch: Option<ShipmentWatch>,
    last_search: Option<String>,
    loading: bool,
    searched: bool,
}

impl<S: ShipmentStore> ShipmentTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            snapshot: None,
            watch: None,
            last_search: None,
            loading: false,
            searched: false,
        }
    }

    pub fn view(&self) -> TrackingView {
        if self.loading {
            TrackingView::Loading
        } else if self.snapshot.is_some() {
            TrackingView::Live
        } else if self.searched {
            TrackingView::NotFound
        } else {
            TrackingView::Idle
        }
    }

    pub fn shipment(&self) -> Option<&Shipment> {
        self.snapshot.as_ref()
    }

    /// Normalized identifier of the most recent completed search.
    pub fn last_search(&self) -> Option<&str> {
        self.last_search.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the displayed shipment is subscribed to change notifications.
    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    /// Resolve an identifier: exact tracking-number match on the upper-cased
    /// input, then (for inputs that look like an email address) the most
    /// recently created shipment for that customer. On success the previous
    /// subscription is gone and a new one is scoped to the found shipment.
    /// A store failure leaves the previous snapshot untouched.
    pub async fn search(&mut self, identifier: &str) -> Result<SearchOutcome, SearchError> {
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let tracking = trimmed.to_uppercase();

        // The old subscription must never outlive its search.
        self.release_watch();

        self.loading = true;
        let looked_up = self.lookup(&tracking, trimmed).await;
        self.loading = false;

        match looked_up {
            Ok(Some(shipment)) => {
                self.last_search = Some(tracking);
                match self.store.watch_shipment(&shipment.tracking_number).await {
                    Ok(watch) => self.watch = Some(watch),
                    // Display the snapshot anyway; updates are best-effort.
                    Err(err) => warn!("could not open shipment watch: {err}"),
                }
                self.snapshot = Some(shipment);
                self.searched = true;
                Ok(SearchOutcome::Found)
            }
            Ok(None) => {
                self.last_search = Some(tracking);
                self.snapshot = None;
                self.searched = true;
                Ok(SearchOutcome::NotFound)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn lookup(
        &self,
        tracking: &str,
        trimmed: &str,
    ) -> Result<Option<Shipment>, StoreError> {
        if let Some(found) = self.store.shipment_by_tracking(tracking).await? {
            return Ok(Some(found));
        }
        if trimmed.contains('@') {
            return self.store.latest_shipment_for_email(trimmed).await;
        }
        Ok(None)
    }

    /// Merge one change event. An event for the displayed shipment replaces
    /// the snapshot wholesale (arrival order wins); anything else is
    /// ignored. Returns whether the snapshot changed.
    pub fn apply_update(&mut self, update: Shipment) -> bool {
        match &self.snapshot {
            Some(current) if current.tracking_number == update.tracking_number => {
                self.snapshot = Some(update);
                true
            }
            _ => {
                debug!(
                    tracking_number = %update.tracking_number,
                    "ignoring update for a shipment that is not displayed"
                );
                false
            }
        }
    }

    /// Wait for the next applied update and return the fresh snapshot.
    /// Returns `None` when no subscription is open or the stream ended.
    pub async fn next_update(&mut self) -> Option<&Shipment> {
        loop {
            let update = self.watch.as_mut()?.recv().await?;
            if self.apply_update(update) {
                return self.snapshot.as_ref();
            }
        }
    }

    /// "Try another": drop the snapshot and subscription, back to idle.
    pub fn reset(&mut self) {
        self.release_watch();
        self.snapshot = None;
        self.last_search = None;
        self.searched = false;
    }

    fn release_watch(&mut self) {
        if let Some(mut watch) = self.watch.take() {
            debug!(tracking_number = watch.tracking_number(), "releasing shipment watch");
            watch.close();
        }
    }
}

impl<S> Drop for ShipmentTracker<S> {
    fn drop(&mut self) {
        if let Some(mut watch) = self.watch.take() {
            watch.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::domain::ShipmentStatus;
    use crate::infra::memory::MemoryStore;

    fn shipment(tracking: &str, email: Option<&str>, created_unix: i64) -> Shipment {
        Shipment {
            tracking_number: tracking.to_string(),
            status: ShipmentStatus::Processing,
            origin: "Madrid".to_string(),
            destination: "Berlin".to_string(),
            current_location: None,
            weight: 50.0,
            service_type: "european-road".to_string(),
            estimated_delivery: None,
            timeline: Vec::new(),
            customer_email: email.map(str::to_string),
            created_at: OffsetDateTime::from_unix_timestamp(created_unix)
                .unwrap_or(OffsetDateTime::UNIX_EPOCH),
        }
    }

    #[tokio::test]
    async fn unknown_identifier_yields_not_found() {
        let mut tracker = ShipmentTracker::new(MemoryStore::new());
        let outcome = tracker.search("ABC123").await.unwrap();
        assert_eq!(outcome, SearchOutcome::NotFound);
        assert_eq!(tracker.view(), TrackingView::NotFound);
        assert!(tracker.shipment().is_none());
    }

    #[tokio::test]
    async fn empty_input_is_rejected_before_any_lookup() {
        let mut tracker = ShipmentTracker::new(MemoryStore::new());
        assert!(matches!(
            tracker.search("   ").await,
            Err(SearchError::EmptyQuery)
        ));
        assert_eq!(tracker.view(), TrackingView::Idle);
    }

    #[tokio::test]
    async fn search_normalizes_to_canonical_tracking_number() {
        let store = MemoryStore::new();
        store.seed_shipment(shipment("ABC123", None, 0)).await;

        let mut tracker = ShipmentTracker::new(store);
        let outcome = tracker.search("  abc123 ").await.unwrap();
        assert_eq!(outcome, SearchOutcome::Found);
        assert_eq!(tracker.last_search(), Some("ABC123"));
        assert_eq!(tracker.view(), TrackingView::Live);
        assert!(tracker.is_watching());
    }

    #[tokio::test]
    async fn email_fallback_picks_the_latest_shipment() {
        let store = MemoryStore::new();
        store
            .seed_shipment(shipment("OLD111", Some("ana@example.com"), 1_000))
            .await;
        store
            .seed_shipment(shipment("NEW222", Some("ana@example.com"), 2_000))
            .await;

        let mut tracker = ShipmentTracker::new(store);
        tracker.search("ana@example.com").await.unwrap();
        let found = tracker.shipment().unwrap();
        assert_eq!(found.tracking_number, "NEW222");
        // The watch is scoped to the resolved shipment, not the query.
        assert!(tracker.is_watching());
    }

    #[tokio::test]
    async fn matching_update_replaces_the_snapshot() {
        let store = MemoryStore::new();
        store.seed_shipment(shipment("ABC123", None, 0)).await;

        let mut tracker = ShipmentTracker::new(store.clone());
        tracker.search("ABC123").await.unwrap();

        let mut updated = shipment("ABC123", None, 0);
        updated.status = ShipmentStatus::InTransit;
        updated.current_location = Some("Lyon, France".to_string());
        store.publish_update(updated).await;

        let fresh = tracker.next_update().await.unwrap();
        assert_eq!(fresh.status, ShipmentStatus::InTransit);
        assert_eq!(fresh.current_location.as_deref(), Some("Lyon, France"));
    }

    #[tokio::test]
    async fn updates_for_other_shipments_are_ignored() {
        let store = MemoryStore::new();
        store.seed_shipment(shipment("ABC123", None, 0)).await;

        let mut tracker = ShipmentTracker::new(store);
        tracker.search("ABC123").await.unwrap();

        let mut other = shipment("XYZ999", None, 0);
        other.status = ShipmentStatus::Delivered;
        assert!(!tracker.apply_update(other));
        assert_eq!(
            tracker.shipment().unwrap().status,
            ShipmentStatus::Processing
        );
    }

    #[tokio::test]
    async fn a_new_search_releases_the_previous_subscription() {
        let store = MemoryStore::new();
        store.seed_shipment(shipment("ABC123", None, 0)).await;
        store.seed_shipment(shipment("DEF456", None, 0)).await;

        let mut tracker = ShipmentTracker::new(store.clone());
        tracker.search("ABC123").await.unwrap();
        tracker.search("DEF456").await.unwrap();

        // An update to the first shipment must not reach the display.
        let mut stale = shipment("ABC123", None, 0);
        stale.status = ShipmentStatus::Delivered;
        store.publish_update(stale).await;

        let mut fresh = shipment("DEF456", None, 0);
        fresh.status = ShipmentStatus::PickedUp;
        store.publish_update(fresh).await;

        let applied = tracker.next_update().await.unwrap();
        assert_eq!(applied.tracking_number, "DEF456");
        assert_eq!(applied.status, ShipmentStatus::PickedUp);
        assert_eq!(
            tracker.shipment().unwrap().tracking_number,
            "DEF456"
        );
    }

    #[tokio::test]
    async fn store_failure_keeps_the_previous_snapshot() {
        let store = MemoryStore::new();
        store.seed_shipment(shipment("ABC123", None, 0)).await;

        let mut tracker = ShipmentTracker::new(store.clone());
        tracker.search("ABC123").await.unwrap();

        store.set_fail_reads(true).await;
        assert!(matches!(
            tracker.search("DEF456").await,
            Err(SearchError::Store(_))
        ));
        assert_eq!(tracker.view(), TrackingView::Live);
        assert_eq!(tracker.shipment().unwrap().tracking_number, "ABC123");
        assert!(!tracker.is_loading());
    }

    #[tokio::test]
    async fn reset_returns_to_idle() {
        let store = MemoryStore::new();
        store.seed_shipment(shipment("ABC123", None, 0)).await;

        let mut tracker = ShipmentTracker::new(store);
        tracker.search("ABC123").await.unwrap();
        tracker.reset();

        assert_eq!(tracker.view(), TrackingView::Idle);
        assert!(tracker.shipment().is_none());
        assert!(!tracker.is_watching());
        assert_eq!(tracker.last_search(), None);
    }
}
