use {
    crate::{
        api::LimitsApi,
        model::{LimitValueSummary, Page, ResourceAvailability, ServiceSummary},
        ClientError, RetryPolicy,
    },
    derive_builder::Builder,
    http::{
        header::{ACCEPT, USER_AGENT},
        HeaderMap, HeaderValue, Method, StatusCode, Uri,
    },
    limitwatch_auth::AuthProvider,
    limitwatch_errors::ServiceError,
    log::{debug, trace},
    reqwest::{
        blocking::{Client, Response},
        Url,
    },
    serde::de::DeserializeOwned,
    std::{
        fmt::{Debug, Formatter, Result as FmtResult},
        sync::Arc,
        time::Duration,
    },
};

pub const LIMITS_API_VERSION: &str = "20190729";
pub const OPC_NEXT_PAGE: &str = "opc-next-page";
pub const OPC_REQUEST_ID: &str = "opc-request-id";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const AGENT: &str = concat!("limitwatch/", env!("CARGO_PKG_VERSION"));

/// The Limits API endpoint of a region.
pub fn limits_endpoint(region: &str) -> String {
    format!("https://limits.{region}.oci.oraclecloud.com")
}

/// Blocking Limits API client for one endpoint.
///
/// Every request is signed by the shared [AuthProvider] and sent under the client's [RetryPolicy]. A `401` response
/// makes the provider discard its cached credentials and the request is sent once more before the status is reported.
#[derive(Builder, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct LimitsClient {
    #[builder(setter(into))]
    endpoint: String,

    auth: Arc<dyn AuthProvider>,

    http: Client,

    #[builder(default)]
    retry_policy: RetryPolicy,
}

impl LimitsClientBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.endpoint {
            Some(endpoint) => match Url::parse(endpoint) {
                Ok(url) if url.cannot_be_a_base() => Err(format!("endpoint {endpoint} cannot have a path")),
                Ok(_) => Ok(()),
                Err(e) => Err(format!("invalid endpoint {endpoint}: {e}")),
            },
            None => Ok(()),
        }
    }
}

impl Debug for LimitsClient {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.debug_struct("LimitsClient")
            .field("endpoint", &self.endpoint)
            .field("tenancy_id", &self.auth.tenancy_id())
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

impl LimitsClient {
    #[inline]
    pub fn builder() -> LimitsClientBuilder {
        LimitsClientBuilder::default()
    }

    /// A client for the Limits API endpoint of `region` with the default retry policy.
    pub fn for_region(region: &str, auth: Arc<dyn AuthProvider>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Self::builder()
            .endpoint(limits_endpoint(region))
            .auth(auth)
            .http(http)
            .build()
            .map_err(|e| ClientError::Builder(e.to_string()))
    }

    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", self.endpoint)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.endpoint.clone()))?
            .pop_if_empty()
            .push(LIMITS_API_VERSION)
            .extend(segments);
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    fn send_signed(&self, url: &Url) -> Result<Response, ClientError> {
        let uri: Uri = url.as_str().parse().map_err(|_| ClientError::InvalidUrl(url.to_string()))?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(AGENT));
        self.auth.sign(&Method::GET, &uri, &mut headers, None)?;

        trace!("GET {}", url);
        Ok(self.http.get(url.clone()).headers(headers).send()?)
    }

    /// Send one signed GET and decode the body, returning it with the next-page token.
    fn get_once<T: DeserializeOwned>(&self, operation: &str, url: &Url) -> Result<(T, Option<String>), ClientError> {
        let mut response = self.send_signed(url)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("{operation} was not authenticated; refreshing credentials");
            self.auth.refresh()?;
            response = self.send_signed(url)?;
        }

        let status = response.status();
        let next_page = header_string(response.headers(), OPC_NEXT_PAGE);
        let request_id = header_string(response.headers(), OPC_REQUEST_ID);
        let body = response.bytes()?;

        if !status.is_success() {
            return Err(ServiceError::from_response(status, &body, request_id).into());
        }

        let value = serde_json::from_slice(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("{operation} returned an unexpected body: {e}")))?;
        Ok((value, next_page))
    }

    fn get<T: DeserializeOwned>(&self, operation: &str, url: Url) -> Result<(T, Option<String>), ClientError> {
        self.retry_policy.run(operation, || self.get_once(operation, &url))
    }
}

impl LimitsApi for LimitsClient {
    fn list_services(&self, compartment_id: &str, page: Option<&str>) -> Result<Page<ServiceSummary>, ClientError> {
        let mut query = vec![("compartmentId", compartment_id), ("sortBy", "name"), ("sortOrder", "ASC")];
        query.extend(page.map(|page| ("page", page)));

        let (items, next_page) = self.get("ListServices", self.url(&["services"], &query)?)?;
        Ok(Page {
            items,
            next_page,
        })
    }

    fn list_limit_values(
        &self,
        compartment_id: &str,
        service_name: &str,
        page: Option<&str>,
    ) -> Result<Page<LimitValueSummary>, ClientError> {
        let mut query = vec![
            ("compartmentId", compartment_id),
            ("serviceName", service_name),
            ("sortBy", "name"),
            ("sortOrder", "ASC"),
        ];
        query.extend(page.map(|page| ("page", page)));

        let (items, next_page) = self.get("ListLimitValues", self.url(&["limitValues"], &query)?)?;
        Ok(Page {
            items,
            next_page,
        })
    }

    fn get_resource_availability(
        &self,
        service_name: &str,
        limit_name: &str,
        compartment_id: &str,
        availability_domain: Option<&str>,
    ) -> Result<ResourceAvailability, ClientError> {
        let mut query = vec![("compartmentId", compartment_id)];
        query.extend(availability_domain.map(|ad| ("availabilityDomain", ad)));

        let url = self.url(&["services", service_name, "limits", limit_name, "resourceAvailability"], &query)?;
        let (availability, _) = self.get("GetResourceAvailability", url)?;
        Ok(availability)
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_string)
}
