use {
    limitwatch_auth::{AuthError, AuthProvider},
    limitwatch_client::{
        model::{LimitValueSummary, ScopeType},
        ClientError, LimitsApi, LimitsClient, RetryPolicy, UsageLookup, OPC_NEXT_PAGE,
    },
    limitwatch_signature::{load_private_key_pem, verify_request, SigningKey},
    mockito::{Matcher, Server, ServerGuard},
    pretty_assertions::assert_eq,
    reqwest::blocking::Client,
    std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    },
};

const TENANCY: &str = "ocid1.tenancy.oc1..aaaatest";
const KEY: &[u8] = include_bytes!("../../limitwatch-signature/tests/data/key_pkcs1.pem");

struct StaticAuth {
    key: SigningKey,
    refreshes: AtomicUsize,
}

impl StaticAuth {
    fn new() -> Arc<Self> {
        let key = SigningKey::new(format!("{TENANCY}/ocid1.user.oc1..u/aa:bb"), load_private_key_pem(KEY).unwrap());
        Arc::new(Self {
            key,
            refreshes: AtomicUsize::new(0),
        })
    }
}

impl AuthProvider for StaticAuth {
    fn tenancy_id(&self) -> &str {
        TENANCY
    }

    fn region(&self) -> &str {
        "us-phoenix-1"
    }

    fn signing_key(&self) -> Result<SigningKey, AuthError> {
        Ok(self.key.clone())
    }

    fn refresh(&self) -> Result<(), AuthError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn client(server: &ServerGuard, auth: Arc<StaticAuth>) -> LimitsClient {
    let retry_policy = RetryPolicy::builder().base_delay(Duration::ZERO).max_attempts(3).build().unwrap();
    LimitsClient::builder()
        .endpoint(server.url())
        .auth(auth)
        .http(Client::new())
        .retry_policy(retry_policy)
        .build()
        .unwrap()
}

fn services_query(page: Option<&str>) -> Matcher {
    let mut matchers = vec![
        Matcher::UrlEncoded("compartmentId".into(), TENANCY.into()),
        Matcher::UrlEncoded("sortBy".into(), "name".into()),
        Matcher::UrlEncoded("sortOrder".into(), "ASC".into()),
    ];
    if let Some(page) = page {
        matchers.push(Matcher::UrlEncoded("page".into(), page.into()));
    }
    Matcher::AllOf(matchers)
}

#[test_log::test]
fn list_all_services_follows_pages() {
    let mut server = Server::new();
    let second = server
        .mock("GET", "/20190729/services")
        .match_query(services_query(Some("page-2")))
        .with_body(r#"[{"name": "vcn", "description": "Virtual Cloud Network"}]"#)
        .expect(1)
        .create();
    let first = server
        .mock("GET", "/20190729/services")
        .match_query(Matcher::Exact(format!("compartmentId={TENANCY}&sortBy=name&sortOrder=ASC")))
        .match_header("authorization", Matcher::Regex(r#"^Signature version="1",headers="date \(request-target\) host""#.into()))
        .match_header("date", Matcher::Any)
        .with_header(OPC_NEXT_PAGE, "page-2")
        .with_body(r#"[{"name": "compute", "description": "Compute"}, {"name": "database"}]"#)
        .expect(1)
        .create();

    let services = client(&server, StaticAuth::new()).list_all_services(TENANCY).unwrap();
    let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["compute", "database", "vcn"]);
    assert_eq!(services[1].description, None);
    first.assert();
    second.assert();
}

#[test_log::test]
fn limit_values_query() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/20190729/limitValues")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("compartmentId".into(), TENANCY.into()),
            Matcher::UrlEncoded("serviceName".into(), "compute".into()),
            Matcher::UrlEncoded("sortBy".into(), "name".into()),
            Matcher::UrlEncoded("sortOrder".into(), "ASC".into()),
        ]))
        .with_body(
            r#"[
                {"name": "standard-a1-core-count", "scopeType": "AD", "availabilityDomain": "Uocm:PHX-AD-1", "value": 24},
                {"name": "vm-standard2-count", "scopeType": "REGION", "value": 0}
            ]"#,
        )
        .create();

    let limits = client(&server, StaticAuth::new()).list_all_limit_values(TENANCY, "compute").unwrap();
    assert_eq!(limits.len(), 2);
    assert_eq!(limits[0].scope_type, ScopeType::Ad);
    assert_eq!(limits[0].value, Some(24));
    assert_eq!(limits[1].value, Some(0));
    mock.assert();
}

#[test_log::test]
fn resource_availability_in_availability_domain() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/20190729/services/compute/limits/standard-a1-core-count/resourceAvailability")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("compartmentId".into(), TENANCY.into()),
            Matcher::UrlEncoded("availabilityDomain".into(), "Uocm:PHX-AD-1".into()),
        ]))
        .with_body(r#"{"used": 24, "available": 0, "fractionalUsage": 1.0}"#)
        .create();

    let api = client(&server, StaticAuth::new());
    let availability =
        api.get_resource_availability("compute", "standard-a1-core-count", TENANCY, Some("Uocm:PHX-AD-1")).unwrap();
    assert_eq!(availability.used, Some(24));
    assert_eq!(availability.available, Some(0));
    mock.assert();
}

#[test_log::test]
fn not_authorized_lookup_is_auth_denied() {
    let mut server = Server::new();
    server
        .mock("GET", "/20190729/services/compute/limits/vcn-count/resourceAvailability")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("opc-request-id", "abc/def")
        .with_body(r#"{"code": "NotAuthorizedOrNotFound", "message": "Authorization failed or resource not found."}"#)
        .expect(2)
        .create();

    let api = client(&server, StaticAuth::new());
    let error = api.get_resource_availability("compute", "vcn-count", TENANCY, None).unwrap_err();
    let service_error = error.service_error().unwrap();
    assert_eq!(service_error.code, "NotAuthorizedOrNotFound");
    assert_eq!(service_error.opc_request_id.as_deref(), Some("abc/def"));

    let limit: LimitValueSummary =
        serde_json::from_str(r#"{"name": "vcn-count", "scopeType": "REGION", "value": 50}"#).unwrap();
    assert_eq!(api.lookup_usage("compute", &limit, TENANCY), UsageLookup::AuthDenied);
}

#[test_log::test]
fn throttling_is_retried() {
    let mut server = Server::new();
    let throttled = server
        .mock("GET", "/20190729/services")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body(r#"{"code": "TooManyRequests", "message": "slow down"}"#)
        .expect(2)
        .create();
    let ok = server.mock("GET", "/20190729/services").match_query(Matcher::Any).with_body("[]").expect(1).create();

    let services = client(&server, StaticAuth::new()).list_all_services(TENANCY).unwrap();
    assert!(services.is_empty());
    throttled.assert();
    ok.assert();
}

#[test_log::test]
fn retries_are_bounded() {
    let mut server = Server::new();
    let unavailable = server
        .mock("GET", "/20190729/services")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("upstream unavailable")
        .expect(3)
        .create();

    let error = client(&server, StaticAuth::new()).list_all_services(TENANCY).unwrap_err();
    assert_eq!(error.service_error().unwrap().code, "ServiceUnavailable");
    unavailable.assert();
}

#[test_log::test]
fn client_errors_are_not_retried() {
    let mut server = Server::new();
    let bad = server
        .mock("GET", "/20190729/limitValues")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"code": "InvalidParameter", "message": "serviceName is invalid"}"#)
        .expect(1)
        .create();

    let error = client(&server, StaticAuth::new()).list_all_limit_values(TENANCY, "nope").unwrap_err();
    assert!(matches!(error, ClientError::Service(ref e) if e.code == "InvalidParameter"));
    bad.assert();
}

#[test_log::test]
fn unauthenticated_refreshes_once() {
    let mut server = Server::new();
    let rejected = server
        .mock("GET", "/20190729/services")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"code": "NotAuthenticated", "message": "token expired"}"#)
        .expect(1)
        .create();
    let accepted = server
        .mock("GET", "/20190729/services")
        .match_query(Matcher::Any)
        .with_body(r#"[{"name": "compute"}]"#)
        .expect(1)
        .create();

    let auth = StaticAuth::new();
    let services = client(&server, auth.clone()).list_all_services(TENANCY).unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(auth.refreshes.load(Ordering::SeqCst), 1);
    rejected.assert();
    accepted.assert();
}

#[test_log::test]
fn malformed_body() {
    let mut server = Server::new();
    server.mock("GET", "/20190729/services").match_query(Matcher::Any).with_body("<html>").create();

    let error = client(&server, StaticAuth::new()).list_all_services(TENANCY).unwrap_err();
    assert!(matches!(error, ClientError::InvalidResponse(_)));
}

#[test_log::test]
fn requests_are_signed() {
    let mut server = Server::new();
    let auth = StaticAuth::new();
    let public_key = auth.key.public_key();

    server
        .mock("GET", "/20190729/services")
        .match_query(Matcher::Any)
        .with_body_from_request(move |request| {
            let header = |name: &str| request.header(name).first().and_then(|v| v.to_str().ok()).unwrap_or("").to_string();
            let uri: http::Uri = format!("http://{}{}", header("host"), request.path_and_query()).parse().unwrap();
            let mut headers = http::HeaderMap::new();
            for name in ["authorization", "date", "host"] {
                headers.insert(name, http::HeaderValue::from_str(&header(name)).unwrap());
            }
            match verify_request(&public_key, &http::Method::GET, &uri, &headers) {
                Ok(_) => br#"[{"name": "verified"}]"#.to_vec(),
                Err(_) => b"[]".to_vec(),
            }
        })
        .create();

    let services = client(&server, auth).list_all_services(TENANCY).unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].name, "verified");
}

#[test_log::test]
fn invalid_endpoint_rejected() {
    let result = LimitsClient::builder().endpoint("not a url").auth(StaticAuth::new()).http(Client::new()).build();
    assert!(result.is_err());
}
