//! Query parameters shared by the listing endpoints.

use serde::Deserialize;

use tutorhub_core::error::AppError;
use tutorhub_core::types::{ExtensionFilter, MaterialId, MaterialOrder};
use tutorhub_service::material::ListingQuery;

use super::path::parse_id;

/// `?ParentId=&order=&FileExtension=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingParams {
    /// Folder to list; empty or `null` lists roots.
    #[serde(rename = "ParentId")]
    pub parent_id: Option<String>,
    /// `newest`, `oldest`, `alphabetical`; anything else keeps insertion order.
    pub order: Option<String>,
    /// Comma-separated extensions.
    #[serde(rename = "FileExtension")]
    pub file_extension: Option<String>,
}

impl ListingParams {
    /// Converts raw parameters into a listing query.
    pub fn into_query(self) -> Result<ListingQuery, AppError> {
        let parent_id = match self.parent_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) if raw.eq_ignore_ascii_case("null") => None,
            Some(raw) => Some(parse_id::<MaterialId>(raw, "parent")?),
        };

        Ok(ListingQuery {
            parent_id,
            order: MaterialOrder::from_query(self.order.as_deref()),
            extensions: ExtensionFilter::from_query(self.file_extension.as_deref()),
            owner: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_null_parent_mean_roots() {
        for raw in [None, Some(""), Some("null"), Some("NULL")] {
            let params = ListingParams {
                parent_id: raw.map(String::from),
                ..Default::default()
            };
            assert_eq!(params.into_query().unwrap().parent_id, None);
        }
    }

    #[test]
    fn test_full_query() {
        let query = ListingParams {
            parent_id: Some("7".into()),
            order: Some("alphabetical".into()),
            file_extension: Some("pdf,.DOCX".into()),
        }
        .into_query()
        .unwrap();

        assert_eq!(query.parent_id, Some(MaterialId::new(7)));
        assert_eq!(query.order, MaterialOrder::Alphabetical);
        assert!(query.extensions.allows("notes.docx"));
        assert!(!query.extensions.allows("clip.mp4"));
    }

    #[test]
    fn test_bad_parent_is_validation_error() {
        let params = ListingParams {
            parent_id: Some("seven".into()),
            ..Default::default()
        };
        assert!(params.into_query().is_err());
    }
}
