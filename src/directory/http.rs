//! HTTP implementation of [`LeadDirectory`].

use super::LeadDirectory;
use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, Error, Result};
use crate::types::{Ack, Page, extract_person_id};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

/// Lead directory reached over its sales HTTP API
///
/// Session headers come from [`DirectoryConfig::extra_headers`] and are sent
/// unchanged with every request.
#[derive(Debug, Clone)]
pub struct HttpLeadDirectory {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct ConnectBody<'a> {
    member: &'a str,
    message: &'a str,
}

impl HttpLeadDirectory {
    /// Build a client from configuration
    ///
    /// Fails when a configured header name or value is not valid HTTP.
    pub fn new(config: &DirectoryConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                Error::config(
                    format!("invalid header name '{}': {}", name, e),
                    "directory.extra_headers",
                )
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                Error::config(
                    format!("invalid value for header '{}': {}", name, e),
                    "directory.extra_headers",
                )
            })?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self, offset: u32, size: u32, lead_list_id: &str) -> String {
        let list = urlencoding::encode(lead_list_id);
        let query = format!(
            "(spotlightParam:(selectedType:ALL),doFetchSpotlights:true,doFetchHits:true,doFetchFilters:false,\
             pivotParam:(com.linkedin.sales.search.LeadListPivotRequest:(list:urn%3Ali%3Afs_salesList%3A{list},\
             sortCriteria:CREATED_TIME,sortOrder:DESCENDING)),\
             list:(scope:LEAD,includeAll:false,excludeAll:false,includedValues:List((id:{list}))))"
        );
        format!(
            "{}/salesApiPeopleSearch?q=peopleSearchQuery&query={}&start={}&count={}",
            self.base_url, query, offset, size
        )
    }

    fn remove_url(&self, lead_list_id: &str, candidate_ref: &str) -> String {
        format!(
            "{}/salesApiListEntities/(list:urn%3Ali%3Afs_salesList%3A{},entity:{})?unsaveEntity=false",
            self.base_url,
            urlencoding::encode(lead_list_id),
            urlencoding::encode(candidate_ref)
        )
    }

    /// Send a request and return the body of a successful response
    async fn execute(&self, request: reqwest::RequestBuilder) -> std::result::Result<String, DirectoryError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "lead directory request failed");
            DirectoryError::Transport(e.to_string())
        })?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                url = %url,
                body = %body,
                "lead directory returned error status"
            );
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body
            };
            return Err(DirectoryError::from_status(status.as_u16(), message));
        }

        Ok(body)
    }
}

fn ack_from_body(body: &str) -> Ack {
    Ack {
        body: serde_json::from_str(body).ok(),
    }
}

#[async_trait]
impl LeadDirectory for HttpLeadDirectory {
    async fn search(
        &self,
        offset: u32,
        size: u32,
        lead_list_id: &str,
    ) -> std::result::Result<Page, DirectoryError> {
        let url = self.search_url(offset, size, lead_list_id);
        tracing::debug!(offset, size, lead_list_id, "searching lead list");

        let body = self.execute(self.client.get(&url)).await?;
        let page: Page =
            serde_json::from_str(&body).map_err(|e| DirectoryError::Decode(e.to_string()))?;

        Ok(Page {
            elements: page
                .elements
                .into_iter()
                .map(|c| c.with_person_id_backfilled())
                .collect(),
            paging: page.paging,
        })
    }

    async fn contact(
        &self,
        candidate_ref: &str,
        message: &str,
    ) -> std::result::Result<Ack, DirectoryError> {
        let member = match extract_person_id(candidate_ref) {
            "" => candidate_ref,
            id => id,
        };
        let url = format!("{}/salesApiConnection?action=connectV2", self.base_url);
        tracing::debug!(member, "sending connection request");

        let body = self
            .execute(self.client.post(&url).json(&ConnectBody { member, message }))
            .await?;
        Ok(ack_from_body(&body))
    }

    async fn remove(
        &self,
        lead_list_id: &str,
        candidate_ref: &str,
    ) -> std::result::Result<Ack, DirectoryError> {
        let url = self.remove_url(lead_list_id, candidate_ref);
        tracing::debug!(lead_list_id, candidate_ref, "removing candidate from lead list");

        let body = self.execute(self.client.delete(&url)).await?;
        Ok(ack_from_body(&body))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const URN: &str = "urn:li:fs_salesProfile:(ACwAAAFRRiUB,NAME_SEARCH,pzxc)";

    fn directory_for(server: &MockServer) -> HttpLeadDirectory {
        let config = DirectoryConfig {
            base_url: server.uri(),
            extra_headers: HashMap::from([("csrf-token".to_string(), "ajax:123".to_string())]),
            ..Default::default()
        };
        HttpLeadDirectory::new(&config).unwrap()
    }

    #[tokio::test]
    async fn search_decodes_page_and_backfills_person_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/salesApiPeopleSearch"))
            .and(query_param("q", "peopleSearchQuery"))
            .and(query_param("start", "100"))
            .and(query_param("count", "25"))
            .and(header("csrf-token", "ajax:123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "elements": [
                    { "entityUrn": URN, "fullName": "Tony Ward", "pendingInvitation": false },
                    { "entityUrn": "urn:li:fs_salesProfile:(ACwBBB,NAME_SEARCH,x)", "fullName": "Joanna Chim", "pendingInvitation": true }
                ],
                "paging": { "total": 383, "count": 2, "start": 100 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = directory_for(&server).search(100, 25, "7371658687360155648").await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page.elements[0].person_id, "ACwAAAFRRiUB");
        assert_eq!(page.elements[1].person_id, "ACwBBB");
        assert!(page.elements[1].pending_invitation);
        assert_eq!(page.paging.unwrap().total, 383);
    }

    #[tokio::test]
    async fn search_keeps_out_of_network_leads() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/salesApiPeopleSearch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "elements": [
                    { "entityUrn": URN, "fullName": "Tony Ward", "degree": 2 },
                    { "entityUrn": "urn:li:fs_salesProfile:(ACwOut,NAME_SEARCH,x)", "fullName": "Out Of Network", "degree": -1 }
                ]
            })))
            .mount(&server)
            .await;

        let page = directory_for(&server).search(0, 25, "list").await.unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page.elements[1].person_id, "ACwOut");
        assert_eq!(page.elements[1].profile.get("degree"), Some(&serde_json::json!(-1)));
    }

    #[tokio::test]
    async fn search_without_elements_is_an_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/salesApiPeopleSearch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let page = directory_for(&server).search(0, 10, "list").await.unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn search_status_codes_map_to_directory_errors() {
        for (status, expected) in [
            (401, DirectoryError::Unauthorized),
            (403, DirectoryError::Forbidden),
            (429, DirectoryError::RateLimited),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;

            let err = directory_for(&server).search(0, 10, "list").await.unwrap_err();
            assert_eq!(err, expected, "status {}", status);
        }
    }

    #[tokio::test]
    async fn search_server_error_keeps_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = directory_for(&server).search(0, 10, "list").await.unwrap_err();
        assert_eq!(
            err,
            DirectoryError::Upstream {
                status: 502,
                message: "upstream down".into()
            }
        );
    }

    #[tokio::test]
    async fn search_with_garbage_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let err = directory_for(&server).search(0, 10, "list").await.unwrap_err();
        assert!(matches!(err, DirectoryError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_directory_is_a_transport_error() {
        let config = DirectoryConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let err = HttpLeadDirectory::new(&config)
            .unwrap()
            .search(0, 10, "list")
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Transport(_)));
    }

    #[tokio::test]
    async fn contact_posts_member_id_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/salesApiConnection"))
            .and(query_param("action", "connectV2"))
            .and(body_json(serde_json::json!({
                "member": "ACwAAAFRRiUB",
                "message": "Hi Tony"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let ack = directory_for(&server).contact(URN, "Hi Tony").await.unwrap();
        assert_eq!(ack.body.unwrap()["value"], "ok");
    }

    #[tokio::test]
    async fn contact_with_empty_body_still_acknowledges() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let ack = directory_for(&server).contact(URN, "Hi").await.unwrap();
        assert!(ack.body.is_none());
    }

    #[tokio::test]
    async fn contact_rate_limit_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = directory_for(&server).contact(URN, "Hi").await.unwrap_err();
        assert_eq!(err, DirectoryError::RateLimited);
    }

    #[tokio::test]
    async fn remove_issues_delete_against_list_entity() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path_regex(r"^/salesApiListEntities/"))
            .and(query_param("unsaveEntity", "false"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        directory_for(&server).remove("7366498152729710592", URN).await.unwrap();
    }

    #[test]
    fn invalid_header_is_a_config_error() {
        let config = DirectoryConfig {
            extra_headers: HashMap::from([("bad header".to_string(), "v".to_string())]),
            ..Default::default()
        };
        let err = HttpLeadDirectory::new(&config).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn search_url_embeds_list_and_window() {
        let directory = HttpLeadDirectory::new(&DirectoryConfig {
            base_url: "https://example.test/api/".to_string(),
            ..Default::default()
        })
        .unwrap();
        let url = directory.search_url(25, 50, "123");
        assert!(url.starts_with("https://example.test/api/salesApiPeopleSearch?"));
        assert!(url.contains("fs_salesList%3A123"));
        assert!(url.contains("includedValues:List((id:123))"));
        assert!(url.ends_with("&start=25&count=50"));
    }
}
