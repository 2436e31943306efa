use {
    crate::{
        model::{LimitValueSummary, Page, ResourceAvailability, ScopeType, ServiceSummary},
        pagination::list_all,
        ClientError,
    },
    log::debug,
};

/// Outcome of looking up the usage of one limit.
#[derive(Clone, Debug, PartialEq)]
pub enum UsageLookup {
    Found(ResourceAvailability),

    /// The caller may not read this limit's usage, or the limit does not exist for it.
    AuthDenied,

    /// Any other failure; the reason is kept for logging only.
    Unavailable(String),
}

/// The Limits API calls limitwatch makes.
///
/// Implementors provide the single-page calls; listing every page and classifying usage lookups come for free.
pub trait LimitsApi {
    /// One page of the services available to `compartment_id`, sorted by name.
    fn list_services(&self, compartment_id: &str, page: Option<&str>) -> Result<Page<ServiceSummary>, ClientError>;

    /// One page of the limits of `service_name` in `compartment_id`, sorted by name.
    fn list_limit_values(
        &self,
        compartment_id: &str,
        service_name: &str,
        page: Option<&str>,
    ) -> Result<Page<LimitValueSummary>, ClientError>;

    fn get_resource_availability(
        &self,
        service_name: &str,
        limit_name: &str,
        compartment_id: &str,
        availability_domain: Option<&str>,
    ) -> Result<ResourceAvailability, ClientError>;

    fn list_all_services(&self, compartment_id: &str) -> Result<Vec<ServiceSummary>, ClientError> {
        list_all(|page| self.list_services(compartment_id, page))
    }

    fn list_all_limit_values(
        &self,
        compartment_id: &str,
        service_name: &str,
    ) -> Result<Vec<LimitValueSummary>, ClientError> {
        list_all(|page| self.list_limit_values(compartment_id, service_name, page))
    }

    /// Look up the usage of `limit`. AD-scoped limits are looked up in their availability domain; all others without
    /// one.
    fn lookup_usage(&self, service_name: &str, limit: &LimitValueSummary, compartment_id: &str) -> UsageLookup {
        let availability_domain = match limit.scope_type {
            ScopeType::Ad => limit.availability_domain.as_deref(),
            _ => None,
        };

        match self.get_resource_availability(service_name, &limit.name, compartment_id, availability_domain) {
            Ok(availability) => UsageLookup::Found(availability),
            Err(e) if e.is_not_authorized_or_not_found() => UsageLookup::AuthDenied,
            Err(e) => {
                debug!("Usage of {}/{} unavailable: {}", service_name, limit.name, e);
                UsageLookup::Unavailable(e.to_string())
            }
        }
    }
}

impl<A: LimitsApi + ?Sized> LimitsApi for &A {
    fn list_services(&self, compartment_id: &str, page: Option<&str>) -> Result<Page<ServiceSummary>, ClientError> {
        (**self).list_services(compartment_id, page)
    }

    fn list_limit_values(
        &self,
        compartment_id: &str,
        service_name: &str,
        page: Option<&str>,
    ) -> Result<Page<LimitValueSummary>, ClientError> {
        (**self).list_limit_values(compartment_id, service_name, page)
    }

    fn get_resource_availability(
        &self,
        service_name: &str,
        limit_name: &str,
        compartment_id: &str,
        availability_domain: Option<&str>,
    ) -> Result<ResourceAvailability, ClientError> {
        (**self).get_resource_availability(service_name, limit_name, compartment_id, availability_domain)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{LimitsApi, UsageLookup},
        crate::{
            model::{LimitValueSummary, Page, ResourceAvailability, ScopeType, ServiceSummary},
            ClientError,
        },
        http::StatusCode,
        limitwatch_errors::ServiceError,
        pretty_assertions::assert_eq,
        std::cell::RefCell,
    };

    /// Records the availability domain of each usage lookup and answers according to the limit name.
    #[derive(Default)]
    struct Recorder {
        lookups: RefCell<Vec<(String, Option<String>)>>,
    }

    impl LimitsApi for Recorder {
        fn list_services(&self, _: &str, page: Option<&str>) -> Result<Page<ServiceSummary>, ClientError> {
            let name = page.unwrap_or("first").to_string();
            Ok(Page {
                items: vec![ServiceSummary {
                    name,
                    description: None,
                }],
                next_page: if page.is_none() { Some("second".to_string()) } else { None },
            })
        }

        fn list_limit_values(&self, _: &str, _: &str, _: Option<&str>) -> Result<Page<LimitValueSummary>, ClientError> {
            Ok(Page::last(vec![]))
        }

        fn get_resource_availability(
            &self,
            _: &str,
            limit_name: &str,
            _: &str,
            availability_domain: Option<&str>,
        ) -> Result<ResourceAvailability, ClientError> {
            self.lookups.borrow_mut().push((limit_name.to_string(), availability_domain.map(str::to_string)));
            match limit_name {
                "denied" => Err(ServiceError::new(StatusCode::NOT_FOUND, "NotAuthorizedOrNotFound", "no").into()),
                "broken" => Err(ServiceError::new(StatusCode::BAD_REQUEST, "InvalidParameter", "bad").into()),
                _ => Ok(ResourceAvailability {
                    used: Some(1),
                    available: Some(9),
                    ..Default::default()
                }),
            }
        }
    }

    fn limit(name: &str, scope_type: &str, availability_domain: Option<&str>) -> LimitValueSummary {
        LimitValueSummary {
            name: name.to_string(),
            scope_type: ScopeType::from(scope_type),
            availability_domain: availability_domain.map(str::to_string),
            value: Some(10),
        }
    }

    #[test_log::test]
    fn ad_scope_uses_availability_domain() {
        let api = Recorder::default();
        api.lookup_usage("compute", &limit("ad-limit", "AD", Some("Uocm:PHX-AD-1")), "t");
        api.lookup_usage("compute", &limit("region-limit", "REGION", Some("ignored")), "t");
        api.lookup_usage("compute", &limit("global-limit", "GLOBAL", None), "t");

        assert_eq!(
            *api.lookups.borrow(),
            vec![
                ("ad-limit".to_string(), Some("Uocm:PHX-AD-1".to_string())),
                ("region-limit".to_string(), None),
                ("global-limit".to_string(), None),
            ]
        );
    }

    #[test_log::test]
    fn lookup_classification() {
        let api = Recorder::default();
        assert!(matches!(api.lookup_usage("s", &limit("ok", "REGION", None), "t"), UsageLookup::Found(_)));
        assert_eq!(api.lookup_usage("s", &limit("denied", "REGION", None), "t"), UsageLookup::AuthDenied);
        assert!(matches!(api.lookup_usage("s", &limit("broken", "REGION", None), "t"), UsageLookup::Unavailable(_)));
    }

    #[test_log::test]
    fn list_all_through_reference() {
        fn names<A: LimitsApi>(api: A) -> Vec<String> {
            api.list_all_services("t").unwrap().into_iter().map(|s| s.name).collect()
        }

        let api = Recorder::default();
        assert_eq!(names(&api), vec!["first".to_string(), "second".to_string()]);
    }
}
