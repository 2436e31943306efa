//! Reports a tenancy's service limits, their current usage, and the limits that are exhausted.
//!
//! For each configured region, every limit of each configured service is listed with its usage looked up. The
//! report is one header per region followed by one JSON object per limit; limits with nothing available are also
//! echoed to standard output as alerts.

mod app;
pub mod cli;
pub mod collector;
pub mod record;
pub mod report;

pub use crate::app::{report_regions, report_services, resolve_tenancy, run};
