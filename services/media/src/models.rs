use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Photo record as persisted in the photos document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub user_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalized photo creation payload
#[derive(Debug, Clone, Default)]
pub struct NewPhoto {
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub user_id: Option<u64>,
}

/// Photo update payload. Only the fields that are `Some` are written.
#[derive(Debug, Clone, Default)]
pub struct PhotoPatch {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Tags as submitted: either a list or a comma-separated string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

impl TagsInput {
    /// Trim every tag and drop the empty ones, keeping order and duplicates
    pub fn normalize(self) -> Vec<String> {
        let tags: Vec<String> = match self {
            TagsInput::List(tags) => tags,
            TagsInput::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        };

        tags.into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

/// Listing filters. Every filter that is set must match.
#[derive(Debug, Clone, Default)]
pub struct PhotoFilters {
    pub tags: Vec<String>,
    pub user_id: Option<u64>,
    pub search: Option<String>,
}

impl PhotoFilters {
    pub fn new(tags: Option<TagsInput>, user_id: Option<u64>, search: Option<String>) -> Self {
        Self {
            tags: tags.map(TagsInput::normalize).unwrap_or_default(),
            user_id,
            search: search.filter(|term| !term.is_empty()),
        }
    }

    /// Case-insensitive substring matching on tags and text
    pub fn matches(&self, photo: &Photo) -> bool {
        if !self.tags.is_empty() {
            let wanted: Vec<String> = self.tags.iter().map(|tag| tag.to_lowercase()).collect();
            let hit = photo.tags.iter().any(|tag| {
                let tag = tag.to_lowercase();
                wanted.iter().any(|want| tag.contains(want.as_str()))
            });
            if !hit {
                return false;
            }
        }

        if let Some(user_id) = self.user_id {
            if photo.user_id != Some(user_id) {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let term = search.to_lowercase();
            let hit = photo.title.to_lowercase().contains(&term)
                || photo.description.to_lowercase().contains(&term)
                || photo
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        true
    }
}

/// Photo creation request, also the metadata of an upload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoInput {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<TagsInput>,
}

/// Photo update request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoUpdate {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<TagsInput>,
}

/// A file received from a client, not yet stored
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Aggregate photo statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoStats {
    pub total: usize,
    pub total_tags: usize,
    pub popular_tags: Vec<TagCount>,
    pub recent_photos: Vec<Photo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchDeleteFailure {
    pub id: u64,
    pub error: String,
}

/// Per-id outcome of a batch delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchDeleteResult {
    pub success: Vec<u64>,
    pub failed: Vec<BatchDeleteFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn photo(title: &str, description: &str, tags: &[&str], user_id: Option<u64>) -> Photo {
        Photo {
            id: 1,
            url: "https://example.com/a.jpg".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            user_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_tags_input_accepts_list_or_csv() {
        let list: TagsInput = serde_json::from_value(json!([" a ", "", "b", "a"])).unwrap();
        assert_eq!(list.normalize(), ["a", "b", "a"]);

        let csv: TagsInput = serde_json::from_value(json!("sunset, beach,,  ")).unwrap();
        assert_eq!(csv.normalize(), ["sunset", "beach"]);
    }

    #[test]
    fn test_tag_filter_is_case_insensitive_substring() {
        let filters = PhotoFilters::new(Some(TagsInput::Csv("SUN".to_string())), None, None);

        assert!(filters.matches(&photo("", "", &["Sunset"], None)));
        assert!(!filters.matches(&photo("", "", &["beach"], None)));
        assert!(!filters.matches(&photo("sun", "", &[], None)));
    }

    #[test]
    fn test_search_covers_title_description_and_tags() {
        let filters = PhotoFilters::new(None, None, Some("Cat".to_string()));

        assert!(filters.matches(&photo("My cat", "", &[], None)));
        assert!(filters.matches(&photo("", "a CATalog", &[], None)));
        assert!(filters.matches(&photo("", "", &["wildcats"], None)));
        assert!(!filters.matches(&photo("dog", "puppy", &["pets"], None)));
    }

    #[test]
    fn test_filters_combine_with_and() {
        let filters = PhotoFilters::new(
            Some(TagsInput::List(vec!["beach".to_string()])),
            Some(7),
            Some("sunset".to_string()),
        );

        assert!(filters.matches(&photo("Sunset", "", &["beach"], Some(7))));
        assert!(!filters.matches(&photo("Sunset", "", &["beach"], Some(8))));
        assert!(!filters.matches(&photo("Noon", "", &["beach"], Some(7))));
        assert!(!filters.matches(&photo("Sunset", "", &["city"], Some(7))));
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let filters = PhotoFilters::new(
            Some(TagsInput::Csv(" , ".to_string())),
            None,
            Some(String::new()),
        );
        assert!(filters.matches(&photo("", "", &[], None)));
    }

    #[test]
    fn test_reads_stored_record_with_defaults() {
        let photo: Photo = serde_json::from_value(json!({
            "id": 4,
            "url": "/uploads/x.png",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(photo.title, "");
        assert!(photo.tags.is_empty());
        assert_eq!(photo.user_id, None);
    }
}
