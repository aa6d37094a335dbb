use std::collections::BTreeSet;

use time::{Date, OffsetDateTime};

/// Service offered by the logistics desk. Wire form is the kebab-case slug.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceType {
    SpanishRoad,
    EuropeanRoad,
    Relocation,
    Global,
    Warehousing,
    Consultancy,
}

impl ServiceType {
    pub const ALL: [ServiceType; 6] = [
        ServiceType::SpanishRoad,
        ServiceType::EuropeanRoad,
        ServiceType::Relocation,
        ServiceType::Global,
        ServiceType::Warehousing,
        ServiceType::Consultancy,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ServiceType::SpanishRoad => "spanish-road",
            ServiceType::EuropeanRoad => "european-road",
            ServiceType::Relocation => "relocation",
            ServiceType::Global => "global",
            ServiceType::Warehousing => "warehousing",
            ServiceType::Consultancy => "consultancy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::SpanishRoad => "Spanish Road Freight",
            ServiceType::EuropeanRoad => "European Road Freight",
            ServiceType::Relocation => "International Relocation",
            ServiceType::Global => "Global Freight",
            ServiceType::Warehousing => "Warehousing & Distribution",
            ServiceType::Consultancy => "Logistics Consultancy",
        }
    }

    /// Parse a wire slug. Unrecognized slugs are an explicit condition for
    /// the caller; there is no default service.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|service| service.slug() == raw.trim())
    }
}

/// Special-handling option offered in the cargo step. Fixed list, collected
/// as a set (toggle semantics, duplicates impossible).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpecialRequirement {
    TemperatureControlled,
    FragileItems,
    HazardousMaterials,
    OversizedLoad,
    ExpressDelivery,
    InsuranceRequired,
}

impl SpecialRequirement {
    pub const ALL: [SpecialRequirement; 6] = [
        SpecialRequirement::TemperatureControlled,
        SpecialRequirement::FragileItems,
        SpecialRequirement::HazardousMaterials,
        SpecialRequirement::OversizedLoad,
        SpecialRequirement::ExpressDelivery,
        SpecialRequirement::InsuranceRequired,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            SpecialRequirement::TemperatureControlled => "temperature-controlled",
            SpecialRequirement::FragileItems => "fragile-items",
            SpecialRequirement::HazardousMaterials => "hazardous-materials",
            SpecialRequirement::OversizedLoad => "oversized-load",
            SpecialRequirement::ExpressDelivery => "express-delivery",
            SpecialRequirement::InsuranceRequired => "insurance-required",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpecialRequirement::TemperatureControlled => "Temperature Controlled",
            SpecialRequirement::FragileItems => "Fragile Items",
            SpecialRequirement::HazardousMaterials => "Hazardous Materials",
            SpecialRequirement::OversizedLoad => "Oversized Load",
            SpecialRequirement::ExpressDelivery => "Express Delivery",
            SpecialRequirement::InsuranceRequired => "Insurance Required",
        }
    }
}

/// A quote request as persisted: the typed projection of a fully valid
/// wizard form. Written exactly once, never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct QuoteRequest {
    pub service_type: ServiceType,
    pub origin: String,
    pub destination: String,
    pub pickup_date: Option<Date>,
    pub delivery_date: Option<Date>,
    pub weight: f64,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub special_requirements: BTreeSet<SpecialRequirement>,
    pub contact_name: String,
    pub company_name: Option<String>,
    pub email: String,
    pub phone: String,
    /// Attached when the wizard enters the estimate step; whole euros.
    pub estimated_cost: u32,
}

/// A message from the contact page, persisted as-is.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: String,
}

/// Shipment lifecycle status as broadcast by the store. Statuses the client
/// does not know are carried verbatim rather than rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShipmentStatus {
    Processing,
    PickedUp,
    InTransit,
    Delivered,
    Other(String),
}

impl ShipmentStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "processing" => ShipmentStatus::Processing,
            "picked_up" => ShipmentStatus::PickedUp,
            "in_transit" => ShipmentStatus::InTransit,
            "delivered" => ShipmentStatus::Delivered,
            other => ShipmentStatus::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ShipmentStatus::Processing => "Processing",
            ShipmentStatus::PickedUp => "Picked Up",
            ShipmentStatus::InTransit => "In Transit",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Other(raw) => raw,
        }
    }

    /// Presentation tone for status badges and timeline markers. Total over
    /// every status, including ones the client has never seen.
    pub fn tone(&self) -> StatusTone {
        match self {
            ShipmentStatus::Delivered => StatusTone::Green,
            ShipmentStatus::InTransit => StatusTone::Blue,
            ShipmentStatus::PickedUp => StatusTone::Primary,
            _ => StatusTone::Neutral,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Green,
    Blue,
    Primary,
    Neutral,
}

/// One entry in a shipment's status history. Insertion order is
/// chronological order; the client never reorders.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineEvent {
    pub status: ShipmentStatus,
    pub title: String,
    pub timestamp: OffsetDateTime,
    pub description: Option<String>,
}

/// Read-only projection of a shipment owned by the record store. The client
/// only ever replaces whole snapshots; it never writes back.
#[derive(Clone, Debug, PartialEq)]
pub struct Shipment {
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub origin: String,
    pub destination: String,
    pub current_location: Option<String>,
    pub weight: f64,
    pub service_type: String,
    pub estimated_delivery: Option<Date>,
    pub timeline: Vec<TimelineEvent>,
    pub customer_email: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Shipment {
    /// Timeline for display. A found shipment never shows an empty history:
    /// when the store has recorded nothing yet, a single booking entry is
    /// synthesized from the creation timestamp.
    pub fn display_timeline(&self) -> Vec<TimelineEvent> {
        if !self.timeline.is_empty() {
            return self.timeline.clone();
        }
        vec![TimelineEvent {
            status: self.status.clone(),
            title: "Order Confirmed".to_string(),
            timestamp: self.created_at,
            description: Some("Your shipment has been booked and confirmed".to_string()),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_type_round_trips_through_slug() {
        for service in ServiceType::ALL {
            assert_eq!(ServiceType::parse(service.slug()), Some(service));
        }
    }

    #[test]
    fn unknown_service_slug_is_rejected() {
        assert_eq!(ServiceType::parse("express"), None);
        assert_eq!(ServiceType::parse(""), None);
    }

    #[test]
    fn status_parse_covers_known_and_unknown() {
        assert_eq!(ShipmentStatus::parse("delivered"), ShipmentStatus::Delivered);
        assert_eq!(ShipmentStatus::parse(" In_Transit "), ShipmentStatus::InTransit);
        assert_eq!(
            ShipmentStatus::parse("customs_hold"),
            ShipmentStatus::Other("customs_hold".to_string())
        );
    }

    #[test]
    fn status_tone_has_a_neutral_fallback() {
        assert_eq!(ShipmentStatus::Delivered.tone(), StatusTone::Green);
        assert_eq!(ShipmentStatus::InTransit.tone(), StatusTone::Blue);
        assert_eq!(ShipmentStatus::PickedUp.tone(), StatusTone::Primary);
        assert_eq!(ShipmentStatus::Processing.tone(), StatusTone::Neutral);
        assert_eq!(
            ShipmentStatus::Other("lost_in_warp".to_string()).tone(),
            StatusTone::Neutral
        );
    }

    #[test]
    fn empty_timeline_synthesizes_booking_entry() {
        let shipment = Shipment {
            tracking_number: "ABC123".to_string(),
            status: ShipmentStatus::Processing,
            origin: "Madrid".to_string(),
            destination: "Berlin".to_string(),
            current_location: None,
            weight: 120.0,
            service_type: "european-road".to_string(),
            estimated_delivery: None,
            timeline: Vec::new(),
            customer_email: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };

        let timeline = shipment.display_timeline();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].title, "Order Confirmed");
        assert_eq!(timeline[0].timestamp, shipment.created_at);
        assert_eq!(timeline[0].status, ShipmentStatus::Processing);
    }
}
