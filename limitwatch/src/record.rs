use {
    limitwatch_client::{
        model::{LimitValueSummary, ServiceSummary},
        UsageLookup,
    },
    serde::Serialize,
};

/// Written to `used` and `available` when the caller may not read a limit's usage.
pub const NOT_AUTHORIZED: &str = "NotAuth";

/// One reported limit. Field order is the serialized key order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct LimitRecord {
    pub service_name: String,
    pub service_description: String,
    pub limit_name: String,
    pub availability_domain: String,
    pub scope_type: String,
    pub limit_value: String,
    pub used: String,
    pub available: String,
    pub region: String,
}

impl LimitRecord {
    /// A record for `limit` of `service` with usage not yet looked up.
    pub fn new(region: &str, service: &ServiceSummary, limit: &LimitValueSummary) -> Self {
        Self {
            service_name: service.name.clone(),
            service_description: service.description.clone().unwrap_or_default(),
            limit_name: limit.name.clone(),
            availability_domain: limit.availability_domain.clone().unwrap_or_default(),
            scope_type: limit.scope_type.to_string(),
            limit_value: limit.value.map(|v| v.to_string()).unwrap_or_default(),
            used: String::new(),
            available: String::new(),
            region: region.to_string(),
        }
    }

    pub fn apply_usage(&mut self, lookup: &UsageLookup) {
        match lookup {
            UsageLookup::Found(availability) => {
                if let Some(used) = availability.used {
                    self.used = used.to_string();
                }
                if let Some(available) = availability.available {
                    self.available = available.to_string();
                }
            }
            UsageLookup::AuthDenied => {
                self.used = NOT_AUTHORIZED.to_string();
                self.available = NOT_AUTHORIZED.to_string();
            }
            UsageLookup::Unavailable(_) => (),
        }
    }

    /// Whether nothing of a non-zero limit remains.
    pub fn is_exhausted(&self) -> bool {
        let available = self.available.parse::<i64>().ok();
        let limit_value = self.limit_value.parse::<i64>().ok();
        matches!((available, limit_value), (Some(0), Some(value)) if value > 0)
    }
}
