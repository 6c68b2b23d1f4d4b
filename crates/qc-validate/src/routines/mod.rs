//! Bundled QC routines.
//!
//! Each module exposes a `FACTORY` for the routine registry and the message
//! kinds the routine raises.

pub mod constant_value;
pub mod fixed_value;
pub mod high_delta;
pub mod monotonic;
pub mod outlier;
pub mod range_check;
pub mod ship_speed;
pub mod time_gap;

use crate::routine::RoutineFactory;

/// Every bundled routine, in registration order.
pub const BUILTIN_FACTORIES: &[RoutineFactory] = &[
    range_check::FACTORY,
    outlier::FACTORY,
    monotonic::FACTORY,
    ship_speed::FACTORY,
    constant_value::FACTORY,
    high_delta::FACTORY,
    time_gap::FACTORY,
    fixed_value::FACTORY,
];

/// Formats a computed value for a message.
pub(crate) fn format_value(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}
