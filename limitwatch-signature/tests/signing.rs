use {
    chrono::{TimeZone, Utc},
    http::{HeaderMap, Method, Uri},
    limitwatch_signature::{
        http_date, load_private_key_pem, sign_request,
        signer::{parse_authorization, signing_string},
        verify_request, SignatureError, SigningKey,
    },
    pretty_assertions::assert_eq,
};

const KEY_PKCS1: &[u8] = include_bytes!("data/key_pkcs1.pem");
const KEY_ID: &str = "ocid1.tenancy.oc1..aaaatesttenancy/ocid1.user.oc1..aaaatestuser/20:3b:97:13";
const SERVICES_URI: &str = "https://limits.us-phoenix-1.oci.oraclecloud.com/20190729/services?compartmentId=ocid1.tenancy.oc1..aaaatesttenancy&sortBy=name&sortOrder=ASC";

// Produced with `openssl dgst -sha256 -sign key_pkcs1.pem` over the signing string in `get_request_signature`.
const EXPECTED_GET_SIGNATURE: &str = "PLrUfYk+ZDk1SuyPoh4Bjil94x3cnd4a9qVRzO+Q60LfDF3wa7T8zUPn4k6bmSVpIDywcoiVRqRHGzKracBKQUVGHpn8WnNTBcKW8XYAD7xzYVPEwzUtnmV6RtuhBLHTIODEnlnTpQlKi/TwqinhiBNPiGrKYOoLyr3QLE8DaQtpiHVRKShW/jS0iYO37hoSIUG4W2g5BD6AQGm1eI4T+7tGSOokxDfcSQfJGvdrvj5GEC8peHqLcbNcaWEC57SJlt82je5HbqmAWn+3HiXnVdfyZFoNmiJwb0Ayw8trGJuYDVSpkqgZhkr7Och/s0V3UPSdBq7h5J713zYUzkb21g==";

fn signing_key() -> SigningKey {
    SigningKey::new(KEY_ID, load_private_key_pem(KEY_PKCS1).unwrap())
}

#[test_log::test]
fn date_format() {
    let now = Utc.with_ymd_and_hms(2014, 1, 5, 21, 31, 40).unwrap();
    assert_eq!(http_date(now), "Sun, 05 Jan 2014 21:31:40 GMT");
}

#[test_log::test]
fn get_request_signature() {
    let key = signing_key();
    let uri: Uri = SERVICES_URI.parse().unwrap();
    let mut headers = HeaderMap::new();
    let now = Utc.with_ymd_and_hms(2014, 1, 5, 21, 31, 40).unwrap();

    sign_request(&key, &Method::GET, &uri, &mut headers, None, now).unwrap();

    assert_eq!(headers.get("date").unwrap(), "Sun, 05 Jan 2014 21:31:40 GMT");
    assert_eq!(headers.get("host").unwrap(), "limits.us-phoenix-1.oci.oraclecloud.com");
    assert!(headers.get("x-content-sha256").is_none());
    assert!(headers.get("content-length").is_none());

    let to_sign = signing_string(&Method::GET, &uri, &headers, &["date", "(request-target)", "host"]).unwrap();
    assert_eq!(
        to_sign,
        "date: Sun, 05 Jan 2014 21:31:40 GMT\n\
         (request-target): get /20190729/services?compartmentId=ocid1.tenancy.oc1..aaaatesttenancy&sortBy=name&sortOrder=ASC\n\
         host: limits.us-phoenix-1.oci.oraclecloud.com"
    );

    let authorization = headers.get("authorization").unwrap().to_str().unwrap();
    let parameters = parse_authorization(authorization).unwrap();
    assert_eq!(parameters["version"], "1");
    assert_eq!(parameters["keyId"], KEY_ID);
    assert_eq!(parameters["algorithm"], "rsa-sha256");
    assert_eq!(parameters["headers"], "date (request-target) host");
    assert_eq!(parameters["signature"], EXPECTED_GET_SIGNATURE);

    verify_request(&key.public_key(), &Method::GET, &uri, &headers).unwrap();
}

#[test_log::test]
fn post_request_signs_body_headers() {
    let key = signing_key();
    let uri: Uri = "https://auth.us-phoenix-1.oraclecloud.com/v1/x509".parse().unwrap();
    let mut headers = HeaderMap::new();
    let body = br#"{"purpose":"DEFAULT"}"#;

    sign_request(&key, &Method::POST, &uri, &mut headers, Some(body), Utc::now()).unwrap();

    assert_eq!(headers.get("content-length").unwrap(), "21");
    assert_eq!(headers.get("content-type").unwrap(), "application/json");
    assert!(headers.get("x-content-sha256").is_some());

    let parameters = verify_request(&key.public_key(), &Method::POST, &uri, &headers).unwrap();
    assert_eq!(parameters["headers"], "date (request-target) host content-length content-type x-content-sha256");
}

#[test_log::test]
fn tampered_request_fails_verification() {
    let key = signing_key();
    let uri: Uri = SERVICES_URI.parse().unwrap();
    let mut headers = HeaderMap::new();
    sign_request(&key, &Method::GET, &uri, &mut headers, None, Utc::now()).unwrap();

    let other: Uri = "https://limits.us-phoenix-1.oci.oraclecloud.com/20190729/limitValues".parse().unwrap();
    assert!(matches!(
        verify_request(&key.public_key(), &Method::GET, &other, &headers),
        Err(SignatureError::InvalidSignature(_))
    ));
}

#[test_log::test]
fn relative_uri_without_host_is_rejected() {
    let key = signing_key();
    let uri: Uri = "/20190729/services".parse().unwrap();
    let mut headers = HeaderMap::new();
    assert!(matches!(
        sign_request(&key, &Method::GET, &uri, &mut headers, None, Utc::now()),
        Err(SignatureError::InvalidUri(_))
    ));
}

#[test_log::test]
fn malformed_authorization_headers() {
    assert!(parse_authorization("Bearer abc").is_err());
    assert!(parse_authorization(r#"Signature keyId="a",keyId="b""#).is_err());
    assert!(parse_authorization(r#"Signature keyId"#).is_err());
}
