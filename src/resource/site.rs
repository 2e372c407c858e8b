//! Sites
//!
//! Sites cannot be removed through the API. Deleting one re-sends its
//! update payload with `IsDeleted` set, and a flagged site reads as gone.

use super::{Controller, EntityKind, remote};
use crate::codec::{self, CodecError};
use crate::error::{Identity, ResourceError};
use crate::identity::parse_id;
use declarative::{Attribute, Schema, Value};
use kevelkit::{Backend, SiteBody};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

static SCHEMA: Schema = Schema::new(
    "site",
    &[
        Attribute::computed("id"),
        Attribute::required("title"),
        Attribute::required("url"),
    ],
);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Site {
    pub id: Value<i64>,
    pub title: Value<String>,
    pub url: Value<String>,
}

impl_model!(Site, SCHEMA, [id, title, url]);

impl Site {
    pub fn create_body(&self) -> Result<SiteBody, CodecError> {
        Ok(SiteBody {
            id: None,
            title: codec::required("title", &self.title)?,
            url: codec::required("url", &self.url)?,
            is_deleted: None,
        })
    }

    pub fn update_body(&self) -> Result<SiteBody, CodecError> {
        Ok(SiteBody {
            id: Some(codec::required_int("id", &self.id)?),
            ..self.create_body()?
        })
    }

    pub fn delete_body(&self) -> Result<SiteBody, CodecError> {
        Ok(SiteBody {
            is_deleted: Some(true),
            ..self.update_body()?
        })
    }

    pub fn project(remote: &kevelkit::Site) -> Self {
        Self {
            id: Value::Known(i64::from(remote.id)),
            title: codec::from_wire(remote.title.clone()),
            url: codec::from_wire(remote.url.clone()),
        }
    }
}

#[derive(Clone)]
pub struct SiteController {
    backend: Arc<dyn Backend>,
}

impl SiteController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    fn put(&self, record: &Site, body: &SiteBody) -> Result<kevelkit::Site, ResourceError> {
        let id = Self::identity(record);
        let wire_id = body
            .id
            .ok_or(CodecError::Unresolved("id"))
            .map_err(|e| ResourceError::encoding(Self::KIND, id.clone(), e))?;
        remote(Self::KIND, &id, self.backend.update_site(wire_id, body))
    }
}

impl Controller for SiteController {
    type Model = Site;

    const KIND: EntityKind = EntityKind::Site;

    fn identity(record: &Site) -> Identity {
        Identity::from_id(record.id.known())
    }

    fn create(&self, plan: &Site) -> Result<Site, ResourceError> {
        let id = Self::identity(plan);
        let body = plan
            .create_body()
            .map_err(|e| ResourceError::encoding(Self::KIND, id.clone(), e))?;
        let created = remote(Self::KIND, &id, self.backend.create_site(&body))?;
        log::info!("Created site {}", created.id);
        Ok(Site::project(&created))
    }

    fn read(&self, state: &Site) -> Result<Site, ResourceError> {
        let id = Self::identity(state);
        let wire_id = codec::required_int("id", &state.id)
            .map_err(|e| ResourceError::encoding(Self::KIND, id.clone(), e))?;
        let found = remote(Self::KIND, &id, self.backend.get_site(wire_id))?;
        if found.is_deleted {
            log::debug!("Site {} is flagged as deleted", found.id);
            return Err(ResourceError::NotFound { kind: Self::KIND, id });
        }
        Ok(Site::project(&found))
    }

    fn update(&self, plan: &Site) -> Result<Site, ResourceError> {
        let body = plan
            .update_body()
            .map_err(|e| ResourceError::encoding(Self::KIND, Self::identity(plan), e))?;
        Ok(Site::project(&self.put(plan, &body)?))
    }

    fn delete(&self, state: &Site) -> Result<(), ResourceError> {
        let body = state
            .delete_body()
            .map_err(|e| ResourceError::encoding(Self::KIND, Self::identity(state), e))?;
        self.put(state, &body)?;
        Ok(())
    }

    fn import(&self, id: &str) -> Result<Site, ResourceError> {
        Ok(Site {
            id: Value::Known(parse_id(Self::KIND, id)?),
            ..Site::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{Action, plan_action, plan_record};
    use kevelkit::MockBackend;
    use serde_json::json;

    fn config(title: &str, url: &str) -> Site {
        Site {
            title: Value::Known(title.to_string()),
            url: Value::Known(url.to_string()),
            ..Site::default()
        }
    }

    fn setup() -> (MockBackend, SiteController) {
        let mock = MockBackend::new();
        let controller = SiteController::new(Arc::new(mock.clone()));
        (mock, controller)
    }

    #[test]
    fn test_bodies() {
        let mut site = config("Blog", "https://blog.example.com");
        assert_eq!(
            serde_json::to_value(site.create_body().unwrap()).unwrap(),
            json!({"Title": "Blog", "URL": "https://blog.example.com"})
        );

        site.id = Value::Known(3);
        assert_eq!(
            serde_json::to_value(site.delete_body().unwrap()).unwrap(),
            json!({"Id": 3, "Title": "Blog", "URL": "https://blog.example.com", "IsDeleted": true})
        );
    }

    #[test]
    fn test_title_and_url_update_in_place() {
        let (mock, controller) = setup();
        let prior = controller
            .create(&plan_record(&config("Blog", "https://a.example"), None).unwrap())
            .unwrap();

        let planned =
            plan_record(&config("News", "https://b.example"), Some(&prior)).unwrap();
        assert_eq!(
            plan_action(Some(&prior), Some(&planned)),
            Action::Update {
                attributes: vec!["title", "url"]
            }
        );

        let updated = controller.update(&planned).unwrap();
        assert_eq!(updated, planned);
        let site = mock.site(1).unwrap();
        assert_eq!(site.url.as_deref(), Some("https://b.example"));
    }

    #[test]
    fn test_delete_is_a_soft_delete() {
        let (mock, controller) = setup();
        let state = controller
            .create(&plan_record(&config("Blog", "https://a.example"), None).unwrap())
            .unwrap();
        controller.delete(&state).unwrap();

        assert_eq!(mock.calls().last().map(String::as_str), Some("update_site"));
        assert!(mock.site(1).unwrap().is_deleted);
        assert!(controller.read(&state).unwrap_err().is_not_found());
    }

    #[test]
    fn test_import_then_read() {
        let (mock, controller) = setup();
        mock.insert_site(kevelkit::Site {
            id: 20,
            title: Some("Shop".into()),
            url: Some("https://shop.example".into()),
            is_deleted: false,
        });

        let state = controller.read(&controller.import("20").unwrap()).unwrap();
        assert_eq!(state.title, Value::Known("Shop".to_string()));
        assert_eq!(state.url, Value::Known("https://shop.example".to_string()));
    }

    #[test]
    fn test_update_without_id_is_an_encoding_error() {
        let (mock, controller) = setup();
        let err = controller.update(&config("Blog", "https://a.example")).unwrap_err();
        assert!(matches!(err, ResourceError::Encoding { .. }));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_missing_wire_fields_project_to_null() {
        let projected = Site::project(&kevelkit::Site {
            id: 7,
            ..kevelkit::Site::default()
        });
        assert_eq!(projected.id, Value::Known(7));
        assert!(projected.title.is_null());
        assert!(projected.url.is_null());
    }
}
