//! HTTP backend for the management API.
//!
//! Every request carries the account API key in the `X-Adzerk-ApiKey`
//! header. Status codes are inspected here rather than by the agent so a
//! failing response keeps its body for diagnostics.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{
    AdType, AdTypeList, Body, Channel, ChannelBody, ChannelSiteMap, ChannelSiteMapBody,
    CreativeTemplate, Site, SiteBody, TemplateBody, TemplateUpdate, User, UserBody,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use ureq::http::{Response, StatusCode};

/// Default management API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.kevel.co";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-Adzerk-ApiKey";

const TIMEOUT: Duration = Duration::from_secs(60);

/// Management API backend over blocking HTTP.
///
/// # Example
///
/// ```no_run
/// use kevelkit::backend::http::HttpBackend;
/// use kevelkit::backend::Backend;
///
/// let backend = HttpBackend::new("my-api-key");
/// let ad_types = backend.list_ad_types().unwrap();
/// println!("Found {} ad types", ad_types.len());
/// ```
pub struct HttpBackend {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// API base URL, without trailing slash.
    api_base: String,
    api_key: String,
}

impl HttpBackend {
    /// Create a backend against the default API base.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_api_base(DEFAULT_API_BASE, api_key)
    }

    /// Create a backend with a custom API base (for testing or proxies).
    #[must_use]
    pub fn with_api_base(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(TIMEOUT))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Get the current API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn ad_types_url(&self, page: u32) -> String {
        format!("{}/v1/adtypes?page={page}", self.api_base)
    }

    fn ad_type_url(&self, id: i32) -> String {
        format!("{}/v1/adtypes/{id}", self.api_base)
    }

    fn channel_url(&self, id: Option<i32>) -> String {
        match id {
            Some(id) => format!("{}/v1/channel/{id}", self.api_base),
            None => format!("{}/v1/channel", self.api_base),
        }
    }

    fn channel_site_url(&self) -> String {
        format!("{}/v1/channelSite", self.api_base)
    }

    fn channel_site_pair_url(&self, channel_id: i32, site_id: i32) -> String {
        format!("{}/v1/channel/{channel_id}/site/{site_id}", self.api_base)
    }

    fn site_url(&self, id: Option<i32>) -> String {
        match id {
            Some(id) => format!("{}/v1/site/{id}", self.api_base),
            None => format!("{}/v1/site", self.api_base),
        }
    }

    fn template_url(&self, id: Option<i32>) -> String {
        match id {
            Some(id) => format!("{}/v2/creative-templates/{id}", self.api_base),
            None => format!("{}/v2/creative-templates", self.api_base),
        }
    }

    fn login_url(&self, id: Option<i32>) -> String {
        match id {
            Some(id) => format!("{}/v1/login/{id}", self.api_base),
            None => format!("{}/v1/login", self.api_base),
        }
    }

    fn get<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<Option<T>> {
        log::debug!("GET {url}");
        let response = self
            .agent
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("Accept", "application/json")
            .call()?;
        decode(response, what)
    }

    fn post<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        what: &str,
    ) -> Result<Option<T>> {
        log::debug!("POST {url}");
        let response = self
            .agent
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("Accept", "application/json")
            .send_json(body)?;
        decode(response, what)
    }

    fn put<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        what: &str,
    ) -> Result<Option<T>> {
        log::debug!("PUT {url}");
        let response = self
            .agent
            .put(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("Accept", "application/json")
            .send_json(body)?;
        decode(response, what)
    }

    fn delete(&self, url: &str, what: &str) -> Result<()> {
        log::debug!("DELETE {url}");
        let response = self
            .agent
            .delete(url)
            .header(API_KEY_HEADER, &self.api_key)
            .call()?;
        check_status(response, what).map(|_| ())
    }
}

/// Turn a non-success response into an error, returning the body otherwise.
fn check_status(mut response: Response<ureq::Body>, what: &str) -> Result<String> {
    let status = response.status();
    let body = response.body_mut().read_to_string()?;
    log::debug!("{what}: HTTP {}", status.as_u16());

    if status == StatusCode::NOT_FOUND {
        return Err(Error::not_found(what));
    }
    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// Decode a response; an empty or `null` body yields `None`.
fn decode<T: DeserializeOwned>(response: Response<ureq::Body>, what: &str) -> Result<Option<T>> {
    let body = check_status(response, what)?;
    let body = body.trim();
    if body.is_empty() || body == "null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(body)?))
}

impl Backend for HttpBackend {
    fn create_ad_type(&self, body: &Body) -> Result<Option<AdType>> {
        self.post(&format!("{}/v1/adtypes", self.api_base), body, "ad type")
    }

    fn list_ad_types(&self) -> Result<Vec<AdType>> {
        let mut ad_types = Vec::new();
        let mut page = 1;
        loop {
            let list: Option<AdTypeList> = self.get(&self.ad_types_url(page), "ad type list")?;
            let Some(list) = list else {
                break;
            };
            ad_types.extend(list.items);
            if page >= list.total_pages {
                break;
            }
            page += 1;
        }
        ad_types.sort_by_key(|ad_type| ad_type.id);
        Ok(ad_types)
    }

    fn delete_ad_type(&self, id: i32) -> Result<()> {
        self.delete(&self.ad_type_url(id), &format!("ad type {id}"))
    }

    fn create_channel(&self, body: &ChannelBody) -> Result<Option<Channel>> {
        self.post(&self.channel_url(None), body, "channel")
    }

    fn get_channel(&self, id: i32) -> Result<Option<Channel>> {
        self.get(&self.channel_url(Some(id)), &format!("channel {id}"))
    }

    fn update_channel(&self, id: i32, body: &ChannelBody) -> Result<Option<Channel>> {
        self.put(&self.channel_url(Some(id)), body, &format!("channel {id}"))
    }

    fn delete_channel(&self, id: i32) -> Result<()> {
        self.delete(&self.channel_url(Some(id)), &format!("channel {id}"))
    }

    fn create_channel_site_map(
        &self,
        body: &ChannelSiteMapBody,
    ) -> Result<Option<ChannelSiteMap>> {
        self.post(&self.channel_site_url(), body, "channel site map")
    }

    fn get_channel_site_map(
        &self,
        channel_id: i32,
        site_id: i32,
    ) -> Result<Option<ChannelSiteMap>> {
        self.get(
            &self.channel_site_pair_url(channel_id, site_id),
            &format!("channel {channel_id} site {site_id}"),
        )
    }

    fn update_channel_site_map(
        &self,
        body: &ChannelSiteMapBody,
    ) -> Result<Option<ChannelSiteMap>> {
        self.put(
            &self.channel_site_url(),
            body,
            &format!("channel {} site {}", body.channel_id, body.site_id),
        )
    }

    fn delete_channel_site_map(&self, channel_id: i32, site_id: i32) -> Result<()> {
        self.delete(
            &self.channel_site_pair_url(channel_id, site_id),
            &format!("channel {channel_id} site {site_id}"),
        )
    }

    fn create_site(&self, body: &SiteBody) -> Result<Option<Site>> {
        self.post(&self.site_url(None), body, "site")
    }

    fn get_site(&self, id: i32) -> Result<Option<Site>> {
        self.get(&self.site_url(Some(id)), &format!("site {id}"))
    }

    fn update_site(&self, id: i32, body: &SiteBody) -> Result<Option<Site>> {
        self.put(&self.site_url(Some(id)), body, &format!("site {id}"))
    }

    fn create_creative_template(&self, body: &TemplateBody) -> Result<Option<CreativeTemplate>> {
        self.post(&self.template_url(None), body, "creative template")
    }

    fn get_creative_template(&self, id: i32) -> Result<Option<CreativeTemplate>> {
        self.get(&self.template_url(Some(id)), &format!("creative template {id}"))
    }

    fn update_creative_template(
        &self,
        id: i32,
        update: &TemplateUpdate,
    ) -> Result<Option<CreativeTemplate>> {
        self.put(
            &self.template_url(Some(id)),
            update,
            &format!("creative template {id}"),
        )
    }

    fn create_user(&self, body: &UserBody) -> Result<Option<User>> {
        self.post(&self.login_url(None), body, "user")
    }

    fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.get(&self.login_url(Some(id)), &format!("user {id}"))
    }

    fn update_user(&self, id: i32, body: &UserBody) -> Result<Option<User>> {
        self.put(&self.login_url(Some(id)), body, &format!("user {id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UpdateOperation;
    use mockito::Matcher;
    use serde_json::json;

    fn backend(server: &mockito::Server) -> HttpBackend {
        HttpBackend::with_api_base(server.url(), "secret")
    }

    #[test]
    fn test_urls() {
        let backend = HttpBackend::new("key");
        assert_eq!(backend.api_base(), "https://api.kevel.co");
        assert_eq!(backend.ad_types_url(2), "https://api.kevel.co/v1/adtypes?page=2");
        assert_eq!(backend.ad_type_url(7), "https://api.kevel.co/v1/adtypes/7");
        assert_eq!(
            backend.channel_site_pair_url(1, 2),
            "https://api.kevel.co/v1/channel/1/site/2"
        );
        assert_eq!(
            backend.template_url(Some(3)),
            "https://api.kevel.co/v2/creative-templates/3"
        );
        assert_eq!(backend.login_url(None), "https://api.kevel.co/v1/login");
    }

    #[test]
    fn test_custom_api_base_strips_trailing_slash() {
        let backend = HttpBackend::with_api_base("http://localhost:9000/", "key");
        assert_eq!(backend.api_base(), "http://localhost:9000");
        assert_eq!(backend.site_url(None), "http://localhost:9000/v1/site");
    }

    #[test]
    fn test_get_site_sends_api_key() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v1/site/4")
            .match_header(API_KEY_HEADER, "secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"Id":4,"Title":"Main","URL":"https://example.com","IsDeleted":false}"#)
            .create();

        let site = backend(&server).get_site(4).unwrap().unwrap();
        assert_eq!(site.title.as_deref(), Some("Main"));
        assert_eq!(site.url.as_deref(), Some("https://example.com"));
        mock.assert();
    }

    #[test]
    fn test_not_found_status() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/v1/channel/9").with_status(404).create();

        let err = backend(&server).get_channel(9).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("channel 9"));
    }

    #[test]
    fn test_error_status_keeps_body() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1/site")
            .with_status(400)
            .with_body("Title is required")
            .create();

        let err = backend(&server)
            .create_site(&SiteBody::default())
            .unwrap_err();
        match err {
            Error::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "Title is required");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_body_is_none() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/v1/login/3").with_status(200).with_body("null").create();

        assert!(backend(&server).get_user(3).unwrap().is_none());
    }

    #[test]
    fn test_channel_body_sends_explicit_empty_list() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/channel")
            .match_body(Matcher::Json(json!({"Title": "News", "AdTypes": [], "Engine": 0})))
            .with_status(200)
            .with_body(r#"{"Id":11,"Title":"News","AdTypes":[],"Engine":0}"#)
            .create();

        let channel = backend(&server)
            .create_channel(&ChannelBody {
                id: None,
                title: "News".into(),
                ad_types: Some(Some(vec![])),
                engine: 0,
            })
            .unwrap()
            .unwrap();
        assert_eq!(channel.id, 11);
        assert_eq!(channel.ad_types, Some(vec![]));
        mock.assert();
    }

    #[test]
    fn test_list_ad_types_walks_pages_and_sorts() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/v1/adtypes")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body(
                r#"{"page":1,"pageSize":2,"totalPages":2,"totalItems":3,
                    "items":[{"Id":9,"Width":1,"Height":1},{"Id":4,"Width":2,"Height":2}]}"#,
            )
            .create();
        server
            .mock("GET", "/v1/adtypes")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body(
                r#"{"page":2,"pageSize":2,"totalPages":2,"totalItems":3,
                    "items":[{"Id":6,"Width":3,"Height":3}]}"#,
            )
            .create();

        let backend = backend(&server);
        let ids: Vec<i32> = backend.list_ad_types().unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![4, 6, 9]);
        assert_eq!(backend.find_ad_type(6).unwrap().and_then(|a| a.width), Some(3));
    }

    #[test]
    fn test_delete_requires_success() {
        let mut server = mockito::Server::new();
        server.mock("DELETE", "/v1/adtypes/5").with_status(500).create();
        server.mock("DELETE", "/v1/adtypes/6").with_status(200).create();

        let backend = backend(&server);
        assert!(backend.delete_ad_type(5).unwrap_err().is_retryable());
        backend.delete_ad_type(6).unwrap();
    }

    #[test]
    fn test_channel_site_map_paths() {
        let mut server = mockito::Server::new();
        let put = server
            .mock("PUT", "/v1/channelSite")
            .match_body(Matcher::Json(json!({"ChannelId": 1, "SiteId": 2, "Priority": 10})))
            .with_status(200)
            .with_body(r#"{"ChannelId":1,"SiteId":2,"Priority":10}"#)
            .create();
        let delete = server
            .mock("DELETE", "/v1/channel/1/site/2")
            .with_status(200)
            .create();

        let backend = backend(&server);
        let map = backend
            .update_channel_site_map(&ChannelSiteMapBody {
                channel_id: 1,
                site_id: 2,
                priority: 10,
            })
            .unwrap()
            .unwrap();
        assert_eq!(map.priority, Some(10));
        backend.delete_channel_site_map(1, 2).unwrap();
        put.assert();
        delete.assert();
    }

    #[test]
    fn test_template_archive_is_a_put() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PUT", "/v2/creative-templates/3")
            .match_body(Matcher::Json(
                json!({"Updates": [{"Path": ["IsArchived"], "Value": true}]}),
            ))
            .with_status(200)
            .with_body(r#"{"Id":3,"Name":"Banner","IsArchived":true}"#)
            .create();

        let template = backend(&server)
            .update_creative_template(
                3,
                &TemplateUpdate {
                    updates: vec![UpdateOperation::set("IsArchived", true)],
                },
            )
            .unwrap()
            .unwrap();
        assert!(template.is_archived);
        mock.assert();
    }
}
