//! REST paths and payloads for the three commands the processor issues:
//! read site metadata, list document libraries, update a library's
//! versioning settings.

use serde::Serialize;

use crate::config::{DOCUMENT_LIBRARY_TEMPLATE, WEB_METADATA_PATH};
use crate::models::{LibraryRef, VersionPolicy};

/// Site metadata probe.
pub fn web_metadata_path() -> &'static str {
    WEB_METADATA_PATH
}

/// Visible document libraries of a site.
pub fn document_libraries_path() -> String {
    format!(
        "_api/web/lists?$filter=BaseTemplate eq {DOCUMENT_LIBRARY_TEMPLATE} and Hidden eq false&$select=Id,Title"
    )
}

/// One library, addressed by id.
pub fn library_path(library_id: &str) -> String {
    format!("_api/web/lists(guid'{library_id}')")
}

/// Body of the per-library update call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersioningUpdate {
    pub enable_versioning: bool,
    pub major_version_limit: u32,
    pub major_with_minor_versions_limit: u32,
}

impl From<&VersionPolicy> for VersioningUpdate {
    fn from(policy: &VersionPolicy) -> Self {
        Self {
            enable_versioning: true,
            major_version_limit: policy.major_version_limit,
            major_with_minor_versions_limit: policy.minor_version_limit,
        }
    }
}

impl VersioningUpdate {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Reads the libraries out of a list-collection response.
///
/// Accepts both the `nometadata` shape (`{"value": [...]}`) and the verbose
/// shape (`{"d": {"results": [...]}}`). Entries without an id are skipped; a
/// missing title falls back to the id.
pub fn parse_libraries(body: &serde_json::Value) -> Result<Vec<LibraryRef>, String> {
    let items = body
        .get("value")
        .or_else(|| body.pointer("/d/results"))
        .and_then(|v| v.as_array())
        .ok_or_else(|| "library listing has no `value` array".to_string())?;

    Ok(items
        .iter()
        .filter_map(|item| {
            let id = item
                .get("Id")
                .or_else(|| item.get("id"))
                .and_then(|v| v.as_str())?
                .to_string();
            let display_name = item
                .get("Title")
                .or_else(|| item.get("title"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| id.clone());
            Some(LibraryRef { id, display_name })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_body_field_names() {
        let body = VersioningUpdate::from(&VersionPolicy::new(50, 5)).to_json();
        assert_eq!(
            body,
            json!({
                "enableVersioning": true,
                "majorVersionLimit": 50,
                "majorWithMinorVersionsLimit": 5
            })
        );
        assert_eq!(
            serde_json::to_value(VersioningUpdate::from(&VersionPolicy::new(50, 5))).unwrap(),
            body
        );
    }

    #[test]
    fn test_paths() {
        assert_eq!(library_path("1f2e"), "_api/web/lists(guid'1f2e')");
        assert!(document_libraries_path().contains("BaseTemplate eq 101"));
        assert!(web_metadata_path().starts_with("_api/web"));
    }

    #[test]
    fn test_parse_libraries_nometadata() {
        let body = json!({"value": [
            {"Id": "a1", "Title": "Documents"},
            {"Id": "b2"},
            {"Title": "no id"}
        ]});
        let libraries = parse_libraries(&body).unwrap();
        assert_eq!(
            libraries,
            vec![
                LibraryRef {
                    id: "a1".into(),
                    display_name: "Documents".into()
                },
                LibraryRef {
                    id: "b2".into(),
                    display_name: "b2".into()
                },
            ]
        );
    }

    #[test]
    fn test_parse_libraries_verbose_and_malformed() {
        let verbose = json!({"d": {"results": [{"Id": "c3", "Title": "Shared"}]}});
        assert_eq!(parse_libraries(&verbose).unwrap().len(), 1);

        assert!(parse_libraries(&json!({"unexpected": true})).is_err());
        assert_eq!(parse_libraries(&json!({"value": []})).unwrap(), vec![]);
    }
}
