//! Client-side cost estimation. The figure is indicative only; the desk
//! quotes the binding price after review.

use super::entities::ServiceType;

/// Surcharge per kilogram, in euros.
pub const WEIGHT_FACTOR: f64 = 2.5;

/// Flat surcharge per selected special requirement, in euros.
pub const SPECIAL_REQUIREMENT_SURCHARGE: f64 = 50.0;

/// Fixed base rate per service, in euros.
pub fn base_rate(service: ServiceType) -> f64 {
    match service {
        ServiceType::SpanishRoad => 250.0,
        ServiceType::EuropeanRoad => 450.0,
        ServiceType::Relocation => 600.0,
        ServiceType::Global => 900.0,
        ServiceType::Warehousing => 200.0,
        ServiceType::Consultancy => 150.0,
    }
}

/// Estimate in whole euros, rounded to the nearest unit:
/// `base_rate + weight * WEIGHT_FACTOR + requirements * SPECIAL_REQUIREMENT_SURCHARGE`.
///
/// Pure function of its three inputs; the same inputs always produce the
/// same figure.
pub fn estimate(service: ServiceType, weight_kg: f64, special_requirement_count: usize) -> u32 {
    let total = base_rate(service)
        + weight_kg * WEIGHT_FACTOR
        + special_requirement_count as f64 * SPECIAL_REQUIREMENT_SURCHARGE;
    total.round() as u32
}
