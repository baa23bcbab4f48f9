use super::*;

fn test_client(base_url: &str) -> GeofenceClient {
    GeofenceClient::with_base_url(base_url, 30, Some("secret-token"), 3, 0)
        .expect("client construction should not fail")
}

#[test]
fn endpoint_appends_to_base_path() {
    let client = test_client("https://api.example.com/v1");
    let url = client.endpoint("stores").unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/v1/stores");
}

#[test]
fn endpoint_strips_trailing_slashes() {
    let client = test_client("https://api.example.com/v1//");
    let url = client.endpoint("stores/42/geofence").unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/v1/stores/42/geofence");
}

#[test]
fn rejects_unparseable_base_url() {
    let err = GeofenceClient::with_base_url("not a url", 30, None, 0, 0).unwrap_err();
    assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
}

#[test]
fn rejects_non_http_scheme() {
    let err = GeofenceClient::with_base_url("ftp://files.example.com", 30, None, 0, 0).unwrap_err();
    assert!(
        matches!(&err, ClientError::InvalidBaseUrl { reason, .. } if reason.contains("ftp")),
        "unexpected error: {err}"
    );
}

#[test]
fn empty_token_is_treated_as_absent() {
    let client =
        GeofenceClient::with_base_url("https://api.example.com", 30, Some(""), 0, 0).unwrap();
    assert!(client.api_token.is_none());
}

#[test]
fn debug_redacts_token() {
    let client = test_client("https://api.example.com");
    let debug = format!("{client:?}");
    assert!(!debug.contains("secret-token"));
    assert!(debug.contains("[redacted]"));
}

#[test]
fn api_error_prefers_server_message() {
    let err = api_error(StatusCode::NOT_FOUND, r#"{"message": "store not found"}"#);
    assert!(matches!(
        err,
        ClientError::Api { status: 404, ref message } if message == "store not found"
    ));
}

#[test]
fn api_error_falls_back_to_plain_body() {
    let err = api_error(StatusCode::BAD_GATEWAY, "upstream down\n");
    assert!(matches!(
        err,
        ClientError::Api { status: 502, ref message } if message == "upstream down"
    ));
}

#[test]
fn api_error_falls_back_to_reason_phrase() {
    let err = api_error(StatusCode::SERVICE_UNAVAILABLE, "");
    assert!(matches!(
        err,
        ClientError::Api { status: 503, ref message } if message == "Service Unavailable"
    ));
}
