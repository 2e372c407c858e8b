//! Backend trait and implementations for the management API.
//!
//! [`http::HttpBackend`] talks to the real API. [`MockBackend`] keeps every
//! object in memory and echoes request bodies back, which is enough to
//! exercise the reconciliation logic without network access.
//!
//! # Testing
//!
//! ```
//! use kevelkit::backend::{Backend, MockBackend};
//! use kevelkit::SiteBody;
//!
//! let mock = MockBackend::new();
//! let site = mock
//!     .create_site(&SiteBody {
//!         title: "Main".to_string(),
//!         url: "https://example.com".to_string(),
//!         ..SiteBody::default()
//!     })
//!     .unwrap()
//!     .unwrap();
//!
//! let fetched = mock.get_site(site.id).unwrap().unwrap();
//! assert_eq!(fetched.title.as_deref(), Some("Main"));
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::types::{
    AccessLevel, AdType, Body, Channel, ChannelBody, ChannelSiteMap, ChannelSiteMapBody,
    CreativeTemplate, Site, SiteBody, TemplateBody, TemplateUpdate, User, UserBody,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One method per management API endpoint.
///
/// Calls that return a record yield `Ok(None)` when the API answered with
/// an empty body; callers decide whether that is an error.
pub trait Backend: Send + Sync {
    /// `POST /v1/adtypes`. Also used to update, by including `Id`.
    fn create_ad_type(&self, body: &Body) -> Result<Option<AdType>>;

    /// All ad types, sorted by id.
    fn list_ad_types(&self) -> Result<Vec<AdType>>;

    /// Find one ad type.
    ///
    /// The API has no get-by-id endpoint, so the default implementation
    /// lists every ad type and binary-searches the id-sorted list.
    fn find_ad_type(&self, id: i32) -> Result<Option<AdType>> {
        let ad_types = self.list_ad_types()?;
        Ok(ad_types
            .binary_search_by_key(&id, |ad_type| ad_type.id)
            .ok()
            .and_then(|index| ad_types.into_iter().nth(index)))
    }

    /// `DELETE /v1/adtypes/{id}`.
    fn delete_ad_type(&self, id: i32) -> Result<()>;

    /// `POST /v1/channel`.
    fn create_channel(&self, body: &ChannelBody) -> Result<Option<Channel>>;

    /// `GET /v1/channel/{id}`.
    fn get_channel(&self, id: i32) -> Result<Option<Channel>>;

    /// `PUT /v1/channel/{id}`.
    fn update_channel(&self, id: i32, body: &ChannelBody) -> Result<Option<Channel>>;

    /// `DELETE /v1/channel/{id}`.
    fn delete_channel(&self, id: i32) -> Result<()>;

    /// `POST /v1/channelSite`.
    fn create_channel_site_map(&self, body: &ChannelSiteMapBody)
    -> Result<Option<ChannelSiteMap>>;

    /// `GET /v1/channel/{channel_id}/site/{site_id}`.
    fn get_channel_site_map(&self, channel_id: i32, site_id: i32)
    -> Result<Option<ChannelSiteMap>>;

    /// `PUT /v1/channelSite`.
    fn update_channel_site_map(&self, body: &ChannelSiteMapBody)
    -> Result<Option<ChannelSiteMap>>;

    /// `DELETE /v1/channel/{channel_id}/site/{site_id}`.
    fn delete_channel_site_map(&self, channel_id: i32, site_id: i32) -> Result<()>;

    /// `POST /v1/site`.
    fn create_site(&self, body: &SiteBody) -> Result<Option<Site>>;

    /// `GET /v1/site/{id}`.
    fn get_site(&self, id: i32) -> Result<Option<Site>>;

    /// `PUT /v1/site/{id}`. Also used to soft-delete.
    fn update_site(&self, id: i32, body: &SiteBody) -> Result<Option<Site>>;

    /// `POST /v2/creative-templates`.
    fn create_creative_template(&self, body: &TemplateBody) -> Result<Option<CreativeTemplate>>;

    /// `GET /v2/creative-templates/{id}`.
    fn get_creative_template(&self, id: i32) -> Result<Option<CreativeTemplate>>;

    /// `PUT /v2/creative-templates/{id}`. Also used to archive.
    fn update_creative_template(
        &self,
        id: i32,
        update: &TemplateUpdate,
    ) -> Result<Option<CreativeTemplate>>;

    /// `POST /v1/login`.
    fn create_user(&self, body: &UserBody) -> Result<Option<User>>;

    /// `GET /v1/login/{id}`.
    fn get_user(&self, id: i32) -> Result<Option<User>>;

    /// `PUT /v1/login/{id}`.
    fn update_user(&self, id: i32, body: &UserBody) -> Result<Option<User>>;
}

// =============================================================================
// Mock backend
// =============================================================================

#[derive(Debug, Default)]
struct Inner {
    last_id: i32,
    ad_types: BTreeMap<i32, AdType>,
    channels: BTreeMap<i32, Channel>,
    channel_site_maps: BTreeMap<(i32, i32), ChannelSiteMap>,
    sites: BTreeMap<i32, Site>,
    templates: BTreeMap<i32, CreativeTemplate>,
    users: BTreeMap<i32, User>,
    calls: Vec<String>,
    failures: HashMap<String, u16>,
    empty: HashSet<String>,
}

impl Inner {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn respond<T>(&mut self, operation: &str, value: T) -> Option<T> {
        if self.empty.remove(operation) {
            None
        } else {
            Some(value)
        }
    }
}

/// Mock backend for testing without network access.
///
/// Objects live in memory, ids are assigned sequentially and every
/// response echoes the request. Failures and empty responses can be
/// injected per operation name (the trait method name, e.g. `"get_site"`);
/// each injection applies to the next call only.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MockBackend {
    /// Create a new empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, operation: &str) -> Result<MutexGuard<'_, Inner>> {
        let mut inner = self.lock();
        inner.calls.push(operation.to_string());
        if let Some(status) = inner.failures.remove(operation) {
            return Err(Error::Status {
                status,
                body: format!("injected failure for {operation}"),
            });
        }
        Ok(inner)
    }

    /// Make the next call to `operation` fail with `status`.
    pub fn fail_next(&self, operation: &str, status: u16) {
        self.lock().failures.insert(operation.to_string(), status);
    }

    /// Make the next call to `operation` answer with an empty body.
    pub fn respond_empty_next(&self, operation: &str) {
        self.lock().empty.insert(operation.to_string());
    }

    /// Operation names in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Seed an ad type, e.g. one created outside this tool.
    pub fn insert_ad_type(&self, ad_type: AdType) {
        let mut inner = self.lock();
        inner.last_id = inner.last_id.max(ad_type.id);
        inner.ad_types.insert(ad_type.id, ad_type);
    }

    /// Seed a site.
    pub fn insert_site(&self, site: Site) {
        let mut inner = self.lock();
        inner.last_id = inner.last_id.max(site.id);
        inner.sites.insert(site.id, site);
    }

    /// Seed a user.
    pub fn insert_user(&self, user: User) {
        let mut inner = self.lock();
        inner.last_id = inner.last_id.max(user.id);
        inner.users.insert(user.id, user);
    }

    /// Current remote ad type, if any.
    #[must_use]
    pub fn ad_type(&self, id: i32) -> Option<AdType> {
        self.lock().ad_types.get(&id).cloned()
    }

    /// Current remote channel, if any.
    #[must_use]
    pub fn channel(&self, id: i32) -> Option<Channel> {
        self.lock().channels.get(&id).cloned()
    }

    /// Current remote channel/site mapping, if any.
    #[must_use]
    pub fn channel_site_map(&self, channel_id: i32, site_id: i32) -> Option<ChannelSiteMap> {
        self.lock()
            .channel_site_maps
            .get(&(channel_id, site_id))
            .cloned()
    }

    /// Current remote site, if any (including soft-deleted ones).
    #[must_use]
    pub fn site(&self, id: i32) -> Option<Site> {
        self.lock().sites.get(&id).cloned()
    }

    /// Current remote creative template, if any (including archived ones).
    #[must_use]
    pub fn creative_template(&self, id: i32) -> Option<CreativeTemplate> {
        self.lock().templates.get(&id).cloned()
    }
}

fn rejected(message: impl Into<String>) -> Error {
    Error::Status {
        status: 400,
        body: message.into(),
    }
}

impl Backend for MockBackend {
    fn create_ad_type(&self, body: &Body) -> Result<Option<AdType>> {
        let mut inner = self.enter("create_ad_type")?;
        let mut ad_type: AdType = serde_json::from_value(serde_json::Value::Object(body.clone()))?;
        let (Some(width), Some(height)) = (ad_type.width, ad_type.height) else {
            return Err(rejected("Width and Height are required"));
        };
        if width <= 0 || height <= 0 {
            return Err(rejected("Width and Height must be positive"));
        }
        if ad_type.id == 0 {
            ad_type.id = inner.next_id();
        } else if !inner.ad_types.contains_key(&ad_type.id) {
            return Err(Error::not_found(format!("ad type {}", ad_type.id)));
        }
        if ad_type.name.is_none() {
            ad_type.name = Some(format!("{width}x{height}"));
        }
        inner.ad_types.insert(ad_type.id, ad_type.clone());
        Ok(inner.respond("create_ad_type", ad_type))
    }

    fn list_ad_types(&self) -> Result<Vec<AdType>> {
        let inner = self.enter("list_ad_types")?;
        Ok(inner.ad_types.values().cloned().collect())
    }

    fn find_ad_type(&self, id: i32) -> Result<Option<AdType>> {
        let inner = self.enter("find_ad_type")?;
        Ok(inner.ad_types.get(&id).cloned())
    }

    fn delete_ad_type(&self, id: i32) -> Result<()> {
        let mut inner = self.enter("delete_ad_type")?;
        inner
            .ad_types
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("ad type {id}")))
    }

    fn create_channel(&self, body: &ChannelBody) -> Result<Option<Channel>> {
        let mut inner = self.enter("create_channel")?;
        let channel = Channel {
            id: inner.next_id(),
            title: Some(body.title.clone()),
            ad_types: body.ad_types.clone().flatten(),
            engine: body.engine,
        };
        inner.channels.insert(channel.id, channel.clone());
        Ok(inner.respond("create_channel", channel))
    }

    fn get_channel(&self, id: i32) -> Result<Option<Channel>> {
        let mut inner = self.enter("get_channel")?;
        let channel = inner
            .channels
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("channel {id}")))?;
        Ok(inner.respond("get_channel", channel))
    }

    fn update_channel(&self, id: i32, body: &ChannelBody) -> Result<Option<Channel>> {
        let mut inner = self.enter("update_channel")?;
        let channel = inner
            .channels
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(format!("channel {id}")))?;
        channel.title = Some(body.title.clone());
        if let Some(ad_types) = &body.ad_types {
            channel.ad_types.clone_from(ad_types);
        }
        channel.engine = body.engine;
        let channel = channel.clone();
        Ok(inner.respond("update_channel", channel))
    }

    fn delete_channel(&self, id: i32) -> Result<()> {
        let mut inner = self.enter("delete_channel")?;
        inner
            .channels
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("channel {id}")))
    }

    fn create_channel_site_map(
        &self,
        body: &ChannelSiteMapBody,
    ) -> Result<Option<ChannelSiteMap>> {
        let mut inner = self.enter("create_channel_site_map")?;
        let key = (body.channel_id, body.site_id);
        if inner.channel_site_maps.contains_key(&key) {
            return Err(rejected(format!(
                "site {} is already mapped to channel {}",
                body.site_id, body.channel_id
            )));
        }
        let map = ChannelSiteMap {
            channel_id: body.channel_id,
            site_id: body.site_id,
            priority: Some(body.priority),
        };
        inner.channel_site_maps.insert(key, map.clone());
        Ok(inner.respond("create_channel_site_map", map))
    }

    fn get_channel_site_map(
        &self,
        channel_id: i32,
        site_id: i32,
    ) -> Result<Option<ChannelSiteMap>> {
        let mut inner = self.enter("get_channel_site_map")?;
        let map = inner
            .channel_site_maps
            .get(&(channel_id, site_id))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("channel {channel_id} site {site_id}")))?;
        Ok(inner.respond("get_channel_site_map", map))
    }

    fn update_channel_site_map(
        &self,
        body: &ChannelSiteMapBody,
    ) -> Result<Option<ChannelSiteMap>> {
        let mut inner = self.enter("update_channel_site_map")?;
        let map = inner
            .channel_site_maps
            .get_mut(&(body.channel_id, body.site_id))
            .ok_or_else(|| {
                Error::not_found(format!("channel {} site {}", body.channel_id, body.site_id))
            })?;
        map.priority = Some(body.priority);
        let map = map.clone();
        Ok(inner.respond("update_channel_site_map", map))
    }

    fn delete_channel_site_map(&self, channel_id: i32, site_id: i32) -> Result<()> {
        let mut inner = self.enter("delete_channel_site_map")?;
        inner
            .channel_site_maps
            .remove(&(channel_id, site_id))
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("channel {channel_id} site {site_id}")))
    }

    fn create_site(&self, body: &SiteBody) -> Result<Option<Site>> {
        let mut inner = self.enter("create_site")?;
        let site = Site {
            id: inner.next_id(),
            title: Some(body.title.clone()),
            url: Some(body.url.clone()),
            is_deleted: body.is_deleted.unwrap_or(false),
        };
        inner.sites.insert(site.id, site.clone());
        Ok(inner.respond("create_site", site))
    }

    fn get_site(&self, id: i32) -> Result<Option<Site>> {
        let mut inner = self.enter("get_site")?;
        let site = inner
            .sites
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("site {id}")))?;
        Ok(inner.respond("get_site", site))
    }

    fn update_site(&self, id: i32, body: &SiteBody) -> Result<Option<Site>> {
        let mut inner = self.enter("update_site")?;
        let site = inner
            .sites
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(format!("site {id}")))?;
        site.title = Some(body.title.clone());
        site.url = Some(body.url.clone());
        if let Some(is_deleted) = body.is_deleted {
            site.is_deleted = is_deleted;
        }
        let site = site.clone();
        Ok(inner.respond("update_site", site))
    }

    fn create_creative_template(&self, body: &TemplateBody) -> Result<Option<CreativeTemplate>> {
        let mut inner = self.enter("create_creative_template")?;
        let template = CreativeTemplate {
            id: inner.next_id(),
            name: body.name.clone(),
            description: body.description.clone().flatten(),
            fields: body.fields.clone().flatten().unwrap_or_default(),
            contents: body.contents.clone().flatten().unwrap_or_default(),
            is_archived: false,
        };
        inner.templates.insert(template.id, template.clone());
        Ok(inner.respond("create_creative_template", template))
    }

    fn get_creative_template(&self, id: i32) -> Result<Option<CreativeTemplate>> {
        let mut inner = self.enter("get_creative_template")?;
        let template = inner
            .templates
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("creative template {id}")))?;
        Ok(inner.respond("get_creative_template", template))
    }

    fn update_creative_template(
        &self,
        id: i32,
        update: &TemplateUpdate,
    ) -> Result<Option<CreativeTemplate>> {
        let mut inner = self.enter("update_creative_template")?;
        let template = inner
            .templates
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(format!("creative template {id}")))?;
        for operation in &update.updates {
            let path: Vec<&str> = operation.path.iter().map(String::as_str).collect();
            match path.as_slice() {
                ["Name"] => template.name = serde_json::from_value(operation.value.clone())?,
                ["Description"] => {
                    template.description = serde_json::from_value(operation.value.clone())?;
                }
                ["IsArchived"] => {
                    template.is_archived = serde_json::from_value(operation.value.clone())?;
                }
                other => return Err(rejected(format!("cannot update path {other:?}"))),
            }
        }
        let template = template.clone();
        Ok(inner.respond("update_creative_template", template))
    }

    fn create_user(&self, body: &UserBody) -> Result<Option<User>> {
        let mut inner = self.enter("create_user")?;
        let user = User {
            id: inner.next_id(),
            email: body.email.clone(),
            name: body.name.clone().flatten(),
            access_level: Some(body.access_level.flatten().unwrap_or(AccessLevel::Reader)),
            can_access_studio: Some(body.can_access_studio.flatten().unwrap_or(false)),
        };
        inner.users.insert(user.id, user.clone());
        Ok(inner.respond("create_user", user))
    }

    fn get_user(&self, id: i32) -> Result<Option<User>> {
        let mut inner = self.enter("get_user")?;
        let user = inner
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("user {id}")))?;
        Ok(inner.respond("get_user", user))
    }

    fn update_user(&self, id: i32, body: &UserBody) -> Result<Option<User>> {
        let mut inner = self.enter("update_user")?;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(format!("user {id}")))?;
        user.email.clone_from(&body.email);
        if let Some(name) = &body.name {
            user.name.clone_from(name);
        }
        if let Some(access_level) = body.access_level {
            user.access_level = access_level;
        }
        if let Some(can_access_studio) = body.can_access_studio {
            user.can_access_studio = can_access_studio;
        }
        let user = user.clone();
        Ok(inner.respond("update_user", user))
    }
}
