use forge_api::url::{DEBUG_PATH, RUN_PATH};
use forge_api::{endpoint_url, ForgeApiError};

#[test]
fn endpoint_url_appends_path_to_host_root() {
    let url = endpoint_url("http://localhost:8000", RUN_PATH).expect("valid url");
    assert_eq!(url.as_str(), "http://localhost:8000/run");
}

#[test]
fn endpoint_url_treats_base_path_as_directory() {
    let url = endpoint_url("https://forge.example.com/api/", DEBUG_PATH).expect("valid url");
    assert_eq!(url.as_str(), "https://forge.example.com/api/debug");

    let url = endpoint_url("https://forge.example.com/api", "/run").expect("valid url");
    assert_eq!(url.as_str(), "https://forge.example.com/api/run");
}

#[test]
fn endpoint_url_falls_back_to_default_for_blank_base() {
    let url = endpoint_url("   ", RUN_PATH).expect("valid url");
    assert_eq!(url.as_str(), "http://localhost:8000/run");
}

#[test]
fn endpoint_url_rejects_unsupported_scheme_and_garbage() {
    let error = endpoint_url("ftp://files.example.com", RUN_PATH).expect_err("ftp is rejected");
    assert!(matches!(error, ForgeApiError::InvalidBaseUrl(_)));
    assert!(error.to_string().contains("unsupported scheme 'ftp'"));

    let error = endpoint_url("not a url", RUN_PATH).expect_err("garbage is rejected");
    assert!(matches!(error, ForgeApiError::InvalidBaseUrl(_)));
}
