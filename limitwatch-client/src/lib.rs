//! Client for the cloud provider's Limits API (version `20190729`).
//!
//! [LimitsApi] is the seam the collector is written against; [LimitsClient] implements it over signed, blocking HTTPS
//! with bounded retries.

mod api;
mod client;
mod error;
pub mod model;
mod pagination;
mod retry;

pub use crate::{
    api::{LimitsApi, UsageLookup},
    client::{limits_endpoint, LimitsClient, LimitsClientBuilder, LIMITS_API_VERSION, OPC_NEXT_PAGE, OPC_REQUEST_ID},
    error::ClientError,
    pagination::list_all,
    retry::{RetryPolicy, RetryPolicyBuilder},
};
