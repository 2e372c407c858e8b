//! # kevelkit
//!
//! Blocking client for the Kevel management API.
//!
//! This crate provides:
//! - Wire types for ad types, channels, channel/site mappings, sites,
//!   creative templates and users
//! - A [`Backend`] trait with one method per endpoint
//! - [`HttpBackend`], talking to the real API with an account API key
//! - [`MockBackend`], an in-memory double for tests
//!
//! Retrying is left to callers; [`Error::is_retryable`] tells which errors
//! are worth it.
//!
//! ## Example
//!
//! ```no_run
//! use kevelkit::{Backend, HttpBackend, SiteBody};
//!
//! let backend = HttpBackend::new("my-api-key");
//! let site = backend
//!     .create_site(&SiteBody {
//!         title: "Main".to_string(),
//!         url: "https://example.com".to_string(),
//!         ..SiteBody::default()
//!     })
//!     .expect("request failed");
//!
//! if let Some(site) = site {
//!     println!("Created site {}", site.id);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod types;

pub use backend::http::{DEFAULT_API_BASE, HttpBackend};
pub use backend::{Backend, MockBackend};
pub use error::{Error, ErrorCategory, Result};
pub use types::{
    AccessLevel, AdType, AdTypeList, Body, Channel, ChannelBody, ChannelSiteMap,
    ChannelSiteMapBody, CreativeTemplate, ENGINE_CPM, Nullable, Site, SiteBody, TemplateBody,
    TemplateContent, TemplateField, TemplateUpdate, UpdateOperation, User, UserBody,
};
