//! HTTP client wrapper for talking to OAI-PMH endpoints.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use url::Url;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{PackagerError, Result};

/// User agent string identifying this packager.
const USER_AGENT: &str = concat!("dc-ore-packager/", env!("CARGO_PKG_VERSION"));

/// Content type sent with every request.
const XML_CONTENT_TYPE: &str = "application/xml";

/// Create a configured HTTP client.
///
/// Every request carries `content-type: application/xml`. Certificate
/// verification can be switched off for repositories with broken TLS setups.
pub fn create_client(verify_tls: bool) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE));

    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .danger_accept_invalid_certs(!verify_tls)
        .build()?;
    Ok(client)
}

/// Build a request URL with query parameters.
pub fn build_url(endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
    Url::parse_with_params(endpoint, params).map_err(|e| PackagerError::InvalidBaseUrl {
        url: endpoint.to_string(),
        reason: e.to_string(),
    })
}

/// Issue a single GET for an OAI-PMH verb and return the body as text.
///
/// No retries: a transport failure or a non-2xx status is returned
/// immediately.
pub fn get_text(client: &Client, endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
    let verb = params
        .iter()
        .find(|(k, _)| *k == "verb")
        .map(|(_, v)| *v)
        .unwrap_or_default();
    let url = build_url(endpoint, params)?;

    tracing::debug!(%url, verb, "Sending OAI-PMH request");
    let response = client.get(url.clone()).send()?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%url, status = %status, "OAI-PMH request failed");
        return Err(PackagerError::HttpStatus {
            verb: verb.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes()?;
    bytes_to_string(&bytes, verb)
}

/// Decode a response body as UTF-8.
///
/// Bodies in any other encoding are rejected rather than repaired, so that
/// metadata text is never altered on its way into the archive.
pub fn bytes_to_string(bytes: &[u8], context: &str) -> Result<String> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            tracing::warn!(
                context,
                valid_up_to = e.valid_up_to(),
                "Response is not valid UTF-8"
            );
            Err(PackagerError::InvalidEncoding {
                context: context.to_string(),
                valid_up_to: e.valid_up_to(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        assert!(create_client(true).is_ok());
        assert!(create_client(false).is_ok());
    }

    #[test]
    fn test_build_url_encodes_identifier() {
        let url = build_url(
            "https://repo.example/oai/request",
            &[
                ("verb", "GetRecord"),
                ("metadataPrefix", "dim"),
                ("identifier", "oai:example.repo:10673/7"),
            ],
        )
        .unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("verb".to_string(), "GetRecord".to_string()),
                ("metadataPrefix".to_string(), "dim".to_string()),
                ("identifier".to_string(), "oai:example.repo:10673/7".to_string()),
            ]
        );
        assert_eq!(url.path(), "/oai/request");
    }

    #[test]
    fn test_bytes_to_string() {
        assert_eq!(bytes_to_string("Ação".as_bytes(), "test").unwrap(), "Ação");
    }

    #[test]
    fn test_bytes_to_string_rejects_latin1() {
        // "Ação" in ISO-8859-1
        let err = bytes_to_string(&[b'A', 0xe7, 0xe3, b'o'], "GetRecord").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
        assert!(matches!(
            err,
            PackagerError::InvalidEncoding { valid_up_to: 1, .. }
        ));
    }
}
