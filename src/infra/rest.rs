//! REST client for the portal's record store (PostgREST-style endpoints).
//!
//! - Typed inserts for quote requests and contact messages.
//! - Shipment lookups by tracking number or customer email.
//! - Change notifications realized by polling the watched row and emitting
//!   a replacement snapshot whenever it differs from the last one seen.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::{
    ContactSubmission, QuoteRequest, Shipment, ShipmentStatus, TimelineEvent,
};
use crate::infra::store::{QuoteStore, ShipmentStore, ShipmentWatch, StoreError};

const USER_AGENT: &str = "freight-portal/1.0.0";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);
const WATCH_CHANNEL_CAPACITY: usize = 8;

const QUOTES_TABLE: &str = "quotes";
const CONTACTS_TABLE: &str = "contact_submissions";
const SHIPMENTS_TABLE: &str = "shipments";

const DATE_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

#[derive(Clone)]
pub struct RestStore {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
    poll_interval: Duration,
}

impl RestStore {
    /// Client against a PostgREST-style base URL, e.g.
    /// `https://db.example.com/rest/v1`.
    pub fn new(base: &str) -> Result<Self, StoreError> {
        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url,
            api_key: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn url(&self, table: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(table)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder
                .header("apikey", key)
                .bearer_auth(key),
            None => builder,
        }
    }

    async fn insert_row<T: Serialize>(&self, table: &str, row: &T) -> Result<(), StoreError> {
        let url = self.url(table)?;
        debug!(%url, "inserting record");
        self.request(self.http.post(url))
            .header("Prefer", "return=minimal")
            // PostgREST accepts a batch; we always write a single document.
            .json(&[row])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn fetch_one(&self, url: Url) -> Result<Option<Shipment>, StoreError> {
        debug!(%url, "querying shipments");
        let rows: Vec<ShipmentDto> = self
            .request(self.http.get(url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(rows.into_iter().next().map(Shipment::from))
    }
}

impl QuoteStore for RestStore {
    async fn insert_quote(&self, quote: &QuoteRequest) -> Result<(), StoreError> {
        self.insert_row(QUOTES_TABLE, &QuoteInsertDto::from(quote))
            .await
    }

    async fn insert_contact(&self, submission: &ContactSubmission) -> Result<(), StoreError> {
        self.insert_row(CONTACTS_TABLE, &ContactInsertDto::from(submission))
            .await
    }
}

impl ShipmentStore for RestStore {
    async fn shipment_by_tracking(
        &self,
        tracking_number: &str,
    ) -> Result<Option<Shipment>, StoreError> {
        let mut url = self.url(SHIPMENTS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("tracking_number", &format!("eq.{tracking_number}"))
            .append_pair("limit", "1");
        self.fetch_one(url).await
    }

    async fn latest_shipment_for_email(
        &self,
        email: &str,
    ) -> Result<Option<Shipment>, StoreError> {
        let mut url = self.url(SHIPMENTS_TABLE)?;
        url.query_pairs_mut()
            .append_pair("customer_email", &format!("eq.{email}"))
            .append_pair("order", "created_at.desc")
            .append_pair("limit", "1");
        self.fetch_one(url).await
    }

    async fn watch_shipment(&self, tracking_number: &str) -> Result<ShipmentWatch, StoreError> {
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let wanted = tracking_number.to_string();
        let store = self.clone();
        let interval = self.poll_interval;

        let feeder = tokio::spawn({
            let wanted = wanted.clone();
            async move {
                let mut last: Option<Shipment> = None;
                loop {
                    tokio::time::sleep(interval).await;
                    match store.shipment_by_tracking(&wanted).await {
                        Ok(Some(current)) => {
                            if last.as_ref() != Some(&current) {
                                last = Some(current.clone());
                                if tx.send(current).await.is_err() {
                                    break;
                                }
                            }
                        }
                        // Row gone or unreachable: deliver nothing, keep
                        // polling; the stream is best-effort.
                        Ok(None) => {}
                        Err(err) => {
                            warn!(%wanted, "shipment poll failed: {err}");
                        }
                    }
                }
            }
        });

        Ok(ShipmentWatch::new(wanted, rx, feeder))
    }
}

#[derive(Debug, Serialize)]
struct QuoteInsertDto<'a> {
    service_type: &'static str,
    origin: &'a str,
    destination: &'a str,
    pickup_date: Option<String>,
    delivery_date: Option<String>,
    weight: f64,
    length: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    special_requirements: Vec<&'static str>,
    contact_name: &'a str,
    company_name: Option<&'a str>,
    email: &'a str,
    phone: &'a str,
    estimated_cost: u32,
}

impl<'a> From<&'a QuoteRequest> for QuoteInsertDto<'a> {
    fn from(quote: &'a QuoteRequest) -> Self {
        Self {
            service_type: quote.service_type.slug(),
            origin: &quote.origin,
            destination: &quote.destination,
            pickup_date: quote.pickup_date.and_then(format_date),
            delivery_date: quote.delivery_date.and_then(format_date),
            weight: quote.weight,
            length: quote.length,
            width: quote.width,
            height: quote.height,
            special_requirements: quote
                .special_requirements
                .iter()
                .map(|requirement| requirement.slug())
                .collect(),
            contact_name: &quote.contact_name,
            company_name: quote.company_name.as_deref(),
            email: &quote.email,
            phone: &quote.phone,
            estimated_cost: quote.estimated_cost,
        }
    }
}

#[derive(Debug, Serialize)]
struct ContactInsertDto<'a> {
    name: &'a str,
    email: &'a str,
    phone: Option<&'a str>,
    company: Option<&'a str>,
    message: &'a str,
}

impl<'a> From<&'a ContactSubmission> for ContactInsertDto<'a> {
    fn from(submission: &'a ContactSubmission) -> Self {
        Self {
            name: &submission.name,
            email: &submission.email,
            phone: submission.phone.as_deref(),
            company: submission.company.as_deref(),
            message: &submission.message,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ShipmentDto {
    tracking_number: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    current_location: Option<String>,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    service_type: Option<String>,
    #[serde(default)]
    estimated_delivery: Option<String>,
    /// Arbitrary JSON in the row; anything that is not a list of events
    /// degrades to an empty timeline.
    #[serde(default)]
    timeline: serde_json::Value,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<ShipmentDto> for Shipment {
    fn from(dto: ShipmentDto) -> Self {
        Self {
            tracking_number: dto.tracking_number,
            status: ShipmentStatus::parse(dto.status.as_deref().unwrap_or("unknown")),
            origin: dto.origin.unwrap_or_default(),
            destination: dto.destination.unwrap_or_default(),
            current_location: dto.current_location,
            weight: dto.weight.unwrap_or_default(),
            service_type: dto.service_type.unwrap_or_default(),
            estimated_delivery: dto.estimated_delivery.as_deref().and_then(parse_date),
            timeline: parse_timeline(dto.timeline),
            customer_email: dto.customer_email,
            created_at: parse_timestamp(dto.created_at.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TimelineEventDto {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl TimelineEventDto {
    /// Entries without a title or a parseable timestamp are dropped rather
    /// than failing the whole shipment.
    fn into_event(self) -> Option<TimelineEvent> {
        let title = self.title.filter(|title| !title.trim().is_empty())?;
        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok())?;
        Some(TimelineEvent {
            status: ShipmentStatus::parse(self.status.as_deref().unwrap_or("unknown")),
            title,
            timestamp,
            description: self.description,
        })
    }
}

fn parse_timeline(value: serde_json::Value) -> Vec<TimelineEvent> {
    let Ok(entries) = serde_json::from_value::<Vec<TimelineEventDto>>(value) else {
        return Vec::new();
    };
    entries
        .into_iter()
        .filter_map(TimelineEventDto::into_event)
        .collect()
}

fn parse_timestamp(raw: Option<&str>) -> OffsetDateTime {
    raw.and_then(|value| OffsetDateTime::parse(value, &Rfc3339).ok())
        .unwrap_or_else(OffsetDateTime::now_utc)
}

fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw, DATE_FORMAT).ok()
}

fn format_date(date: Date) -> Option<String> {
    date.format(DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::StatusTone;

    fn dto_from(value: serde_json::Value) -> ShipmentDto {
        serde_json::from_value(value).expect("shipment row should deserialize")
    }

    #[test]
    fn full_row_converts_to_domain() {
        let dto = dto_from(json!({
            "tracking_number": "SZT12345",
            "status": "in_transit",
            "origin": "Madrid, Spain",
            "destination": "Berlin, Germany",
            "current_location": "Lyon, France",
            "weight": 480.5,
            "service_type": "european-road",
            "estimated_delivery": "2026-08-20",
            "customer_email": "ana@example.com",
            "created_at": "2026-08-01T09:30:00Z",
            "timeline": [
                {
                    "status": "processing",
                    "title": "Order Confirmed",
                    "timestamp": "2026-08-01T09:30:00Z"
                },
                {
                    "status": "picked_up",
                    "title": "Picked Up",
                    "timestamp": "2026-08-02T08:00:00Z",
                    "description": "Collected from warehouse"
                }
            ]
        }));

        let shipment = Shipment::from(dto);
        assert_eq!(shipment.status, ShipmentStatus::InTransit);
        assert_eq!(shipment.timeline.len(), 2);
        assert_eq!(shipment.timeline[1].description.as_deref(), Some("Collected from warehouse"));
        assert_eq!(
            shipment.estimated_delivery.map(|date| date.to_string()),
            Some("2026-08-20".to_string())
        );
    }

    #[test]
    fn malformed_timeline_degrades_to_empty() {
        for bad in [json!("not a list"), json!(42), json!({"oops": true}), json!(null)] {
            let dto = dto_from(json!({
                "tracking_number": "SZT12345",
                "timeline": bad
            }));
            assert!(Shipment::from(dto).timeline.is_empty());
        }
    }

    #[test]
    fn unparseable_entries_are_skipped_not_fatal() {
        let dto = dto_from(json!({
            "tracking_number": "SZT12345",
            "timeline": [
                {"title": "Order Confirmed", "timestamp": "2026-08-01T09:30:00Z"},
                {"title": "", "timestamp": "2026-08-02T09:30:00Z"},
                {"title": "No timestamp"},
                {"title": "Bad timestamp", "timestamp": "yesterday-ish"}
            ]
        }));

        let shipment = Shipment::from(dto);
        assert_eq!(shipment.timeline.len(), 1);
        assert_eq!(shipment.timeline[0].title, "Order Confirmed");
    }

    #[test]
    fn unknown_status_strings_stay_displayable() {
        let dto = dto_from(json!({
            "tracking_number": "SZT12345",
            "status": "customs_hold"
        }));

        let shipment = Shipment::from(dto);
        assert_eq!(shipment.status.tone(), StatusTone::Neutral);
        assert_eq!(shipment.status.label(), "customs_hold");
    }

    #[test]
    fn quote_insert_dto_serializes_wire_shapes() {
        use std::collections::BTreeSet;

        use crate::domain::{ServiceType, SpecialRequirement};

        let mut requirements = BTreeSet::new();
        requirements.insert(SpecialRequirement::FragileItems);
        requirements.insert(SpecialRequirement::ExpressDelivery);

        let quote = QuoteRequest {
            service_type: ServiceType::SpanishRoad,
            origin: "Madrid".to_string(),
            destination: "Valencia".to_string(),
            pickup_date: Date::parse("2026-08-10", DATE_FORMAT).ok(),
            delivery_date: None,
            weight: 12.0,
            length: None,
            width: None,
            height: None,
            special_requirements: requirements,
            contact_name: "Ana Torres".to_string(),
            company_name: None,
            email: "ana@example.com".to_string(),
            phone: "+34 600 000 000".to_string(),
            estimated_cost: 380,
        };

        let value = serde_json::to_value(QuoteInsertDto::from(&quote)).unwrap();
        assert_eq!(value["service_type"], "spanish-road");
        assert_eq!(value["pickup_date"], "2026-08-10");
        assert_eq!(value["delivery_date"], serde_json::Value::Null);
        assert_eq!(value["estimated_cost"], 380);
        assert_eq!(
            value["special_requirements"],
            json!(["fragile-items", "express-delivery"])
        );
    }
}
