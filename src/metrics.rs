//! Metric helpers for `wirechunk`.
//!
//! This module defines metric names and simple helper functions wrapping
//! the [`metrics`](https://docs.rs/metrics) crate. Without the `metrics`
//! feature the helpers compile to nothing.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking fields-chunk serializations.
pub const SERIALIZATIONS: &str = "wirechunk_serializations_total";
/// Name of the counter tracking fields-chunk deserializations.
pub const DESERIALIZATIONS: &str = "wirechunk_deserializations_total";
/// Name of the counter tracking typed peeks that had to re-serialize data.
pub const CONVERSIONS: &str = "wirechunk_conversions_total";

/// Whether a serialization was served from the chunk's cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Cached bytes were reused.
    Hit,
    /// The serializer ran.
    Miss,
}

impl CacheOutcome {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            CacheOutcome::Hit => "hit",
            CacheOutcome::Miss => "miss",
        }
    }
}

/// Record a fields-chunk serialization.
pub fn inc_serializations(outcome: CacheOutcome) {
    #[cfg(feature = "metrics")]
    counter!(SERIALIZATIONS, "cache" => outcome.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = outcome;
}

/// Record a fields-chunk deserialization and whether it was complete.
pub fn inc_deserializations(complete: bool) {
    #[cfg(feature = "metrics")]
    counter!(
        DESERIALIZATIONS,
        "outcome" => if complete { "complete" } else { "incomplete" }
    )
    .increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = complete;
}

/// Record a conversion through serialization.
pub fn inc_conversions() {
    #[cfg(feature = "metrics")]
    counter!(CONVERSIONS).increment(1);
}
