use {
    crate::record::LimitRecord,
    limitwatch_client::{model::ServiceSummary, LimitsApi},
    log::{debug, error, info, warn},
};

/// Every service available to the tenancy, sorted by name.
///
/// A failure is reported on standard error and yields an empty list; there is then nothing to report for the
/// region.
pub fn list_services<A: LimitsApi>(api: &A, tenancy_id: &str) -> Vec<ServiceSummary> {
    match api.list_all_services(tenancy_id) {
        Ok(services) => {
            debug!("Tenancy {} has {} services", tenancy_id, services.len());
            services
        }
        Err(e) => {
            error!("Unable to list services for tenancy {}: {}", tenancy_id, e);
            eprintln!("Error in getting a list of services: {e}");
            Vec::new()
        }
    }
}

/// Collect a record, with usage, for every non-zero limit of each service named in `service_filter`.
///
/// Records come out ordered by service name, then limit name. A service whose limits cannot be listed is reported on
/// standard error and skipped; a limit whose usage cannot be read is still recorded.
pub fn collect<A: LimitsApi>(api: &A, tenancy_id: &str, service_filter: &[String], region: &str) -> Vec<LimitRecord> {
    let services = list_services(api, tenancy_id);

    if service_filter.is_empty() {
        warn!("Service filter is empty; nothing collected in region {}", region);
        return Vec::new();
    }

    let mut records = Vec::new();

    for service in services.iter().filter(|s| service_filter.contains(&s.name)) {
        eprintln!("Getting limits for service {} region {}", service.name, region);

        let limits = match api.list_all_limit_values(tenancy_id, &service.name) {
            Ok(limits) => limits,
            Err(e) => {
                error!("Unable to list limits of {} in {}: {}", service.name, region, e);
                eprintln!("Error in getting limits for service {}: {e}", service.name);
                continue;
            }
        };

        for limit in limits.iter().filter(|l| l.value != Some(0)) {
            let mut record = LimitRecord::new(region, service, limit);
            record.apply_usage(&api.lookup_usage(&service.name, limit, tenancy_id));
            records.push(record);
        }
    }

    info!("Collected {} limits in region {}", records.len(), region);
    records
}
