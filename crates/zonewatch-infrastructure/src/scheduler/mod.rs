//! Zone scheduling
//!
//! | Module | Role |
//! |--------|------|
//! | [`schedule`] | Next trigger time from interval, listed times and offset |
//! | [`single_flight`] | At most one analysis per zone |
//! | [`runner`] | One capture/dispatch/publish cycle |
//! | [`service`] | Trigger tasks and reconciliation |

pub mod runner;
pub mod schedule;
pub mod service;
pub mod single_flight;

pub use service::ZoneScheduler;
pub use single_flight::{InFlightGuard, InFlightRegistry};
