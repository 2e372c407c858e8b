//! Wire types for the management API.
//!
//! Records returned by the API use PascalCase keys and tolerate missing
//! fields (`#[serde(default)]`). Request bodies distinguish an omitted key
//! from an explicit `null` through [`Nullable`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A request field that can be omitted (`None`), sent as `null`
/// (`Some(None)`) or sent with a value (`Some(Some(v))`).
///
/// Pair with `#[serde(skip_serializing_if = "Option::is_none")]`.
pub type Nullable<T> = Option<Option<T>>;

/// Untyped request body for endpoints that take a free-form JSON object.
///
/// Keys keep their insertion order.
pub type Body = serde_json::Map<String, serde_json::Value>;

/// Channel engine used for every channel created through this crate (CPM).
pub const ENGINE_CPM: i32 = 0;

// =============================================================================
// Ad types
// =============================================================================

/// An ad format: a named width × height slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AdType {
    /// Remote identifier.
    pub id: i32,
    /// Display name; the API derives one when it is not supplied.
    pub name: Option<String>,
    /// Width in pixels.
    pub width: Option<i32>,
    /// Height in pixels.
    pub height: Option<i32>,
}

/// One page of the ad type listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdTypeList {
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
    /// Number of pages in the listing.
    pub total_pages: u32,
    /// Number of items across all pages.
    pub total_items: u32,
    /// Ad types on this page.
    pub items: Vec<AdType>,
}

// =============================================================================
// Channels
// =============================================================================

/// A channel groups sites and ad types for serving.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Channel {
    /// Remote identifier.
    pub id: i32,
    /// Display title.
    pub title: Option<String>,
    /// Ad types served in this channel.
    pub ad_types: Option<Vec<i32>>,
    /// Serving engine.
    pub engine: i32,
}

/// Create and update payload for channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelBody {
    /// Set on update only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    /// Display title.
    pub title: String,
    /// Omitted, `null`, or the (possibly empty) list of ad type ids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_types: Nullable<Vec<i32>>,
    /// Serving engine.
    pub engine: i32,
}

// =============================================================================
// Channel/site mappings
// =============================================================================

/// The priority of a site within a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ChannelSiteMap {
    /// Channel side of the mapping.
    pub channel_id: i32,
    /// Site side of the mapping.
    pub site_id: i32,
    /// Priority of the site in the channel.
    pub priority: Option<i32>,
}

/// Create and update payload for channel/site mappings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelSiteMapBody {
    /// Channel side of the mapping.
    pub channel_id: i32,
    /// Site side of the mapping.
    pub site_id: i32,
    /// Always sent; there is no server-side default.
    pub priority: i32,
}

// =============================================================================
// Sites
// =============================================================================

/// A site (publisher property).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Site {
    /// Remote identifier.
    pub id: i32,
    /// Display title.
    pub title: Option<String>,
    /// Site URL.
    #[serde(rename = "URL")]
    pub url: Option<String>,
    /// Sites are never removed, only flagged.
    pub is_deleted: bool,
}

/// Create, update and soft-delete payload for sites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SiteBody {
    /// Set on update only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    /// Display title.
    pub title: String,
    /// Site URL.
    #[serde(rename = "URL")]
    pub url: String,
    /// Set to `true` to soft-delete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

// =============================================================================
// Creative templates
// =============================================================================

/// A creative template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreativeTemplate {
    /// Remote identifier.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Input fields, in order.
    pub fields: Vec<TemplateField>,
    /// Rendered contents, in order.
    pub contents: Vec<TemplateContent>,
    /// Templates are never removed, only archived.
    pub is_archived: bool,
}

/// One input field of a creative template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TemplateField {
    /// Field type, e.g. "String" or "Array".
    #[serde(rename = "Type")]
    pub field_type: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Template variable the field binds to.
    pub variable: String,
    /// Whether a value is mandatory.
    pub required: bool,
    /// Whether the field is hidden in the UI.
    pub hidden: bool,
    /// Whether the field participates in ad queries.
    pub ad_query: bool,
    /// A string or an array of strings; left as raw JSON on the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// One content block of a creative template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TemplateContent {
    /// Content type, e.g. "HTML".
    #[serde(rename = "Type")]
    pub content_type: String,
    /// Content body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Create payload for creative templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateBody {
    /// Display name.
    pub name: String,
    /// Omitted, `null`, or a description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Nullable<String>,
    /// Omitted, `null`, or the input fields in order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Nullable<Vec<TemplateField>>,
    /// Omitted, `null`, or the rendered contents in order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Nullable<Vec<TemplateContent>>,
}

/// Patch payload for creative templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateUpdate {
    /// Operations applied in order.
    pub updates: Vec<UpdateOperation>,
}

/// Set the value at `path` of a creative template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateOperation {
    /// Property path, e.g. `["Name"]`.
    pub path: Vec<String>,
    /// New value.
    pub value: serde_json::Value,
}

impl UpdateOperation {
    /// Build an operation on a top-level property.
    pub fn set(property: &str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            path: vec![property.to_string()],
            value: value.into(),
        }
    }
}

// =============================================================================
// Users
// =============================================================================

/// Access level of a user, with its wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessLevel {
    /// Full access.
    #[serde(rename = "admn")]
    Admin,
    /// Account manager.
    #[serde(rename = "amgr")]
    Manager,
    /// May edit inventory.
    #[serde(rename = "edit")]
    Editor,
    /// Read only.
    #[serde(rename = "read")]
    Reader,
}

impl AccessLevel {
    /// The wire code, e.g. "admn".
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Admin => "admn",
            Self::Manager => "amgr",
            Self::Editor => "edit",
            Self::Reader => "read",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A login on the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct User {
    /// Remote identifier.
    pub id: i32,
    /// Login email.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
    /// Access level.
    pub access_level: Option<AccessLevel>,
    /// Whether the user may open the studio.
    pub can_access_studio: Option<bool>,
}

/// Create and update payload for users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserBody {
    /// Set on update only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    /// Login email.
    pub email: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Nullable<String>,
    /// Access level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Nullable<AccessLevel>,
    /// Whether the user may open the studio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_access_studio: Nullable<bool>,
}
