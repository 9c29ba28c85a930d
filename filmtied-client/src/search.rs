//! Search query parameters
//!
//! ```rust
//! use filmtied_client::{MediaType, SearchQuery};
//!
//! let query = SearchQuery::new("Godfather")
//!     .limit(3)
//!     .with_media_type(MediaType::TvSeries);
//!
//! assert_eq!(
//!     serde_json::Value::Object(query.to_params()).to_string(),
//!     r#"{"query":"Godfather","page":1,"limit":3,"imageSize":2,"type":"tv-series"}"#
//! );
//! ```

use serde_json::{Map, Value};

/// Image size requested when the caller does not choose one
pub const DEFAULT_IMAGE_SIZE: u32 = 2;

pub const DEFAULT_PAGE: u32 = 1;

pub const DEFAULT_LIMIT: u32 = 15;

/// Media type filter accepted by `search`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Movies,
    TvSeries,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movies => "movies",
            MediaType::TvSeries => "tv-series",
        }
    }

    /// Parse a wire name, `None` for anything the service does not support
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "movies" => Some(MediaType::Movies),
            "tv-series" => Some(MediaType::TvSeries),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments of a `search` call
///
/// Zero for `page`, `limit` or `image_size` leaves the field out of the
/// request, and the service applies its own default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    query: String,
    page: u32,
    limit: u32,
    media_type: Option<MediaType>,
    image_size: u32,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            media_type: None,
            image_size: DEFAULT_IMAGE_SIZE,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Filter by media type name
    ///
    /// Names other than `movies` and `tv-series` are ignored and the search
    /// runs unfiltered.
    pub fn media_type(mut self, name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        self.media_type = MediaType::parse(name);
        if self.media_type.is_none() {
            tracing::debug!(media_type = %name, "Ignoring unsupported media type");
        }
        self
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    pub fn image_size(mut self, size: u32) -> Self {
        self.image_size = size;
        self
    }

    /// The query text as the caller gave it
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }

    /// Request params in wire order: query, page, limit, imageSize, type
    pub fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("query".into(), Value::from(self.query.trim()));
        for (key, value) in [
            ("page", self.page),
            ("limit", self.limit),
            ("imageSize", self.image_size),
        ] {
            if value > 0 {
                params.insert(key.into(), Value::from(value));
            }
        }
        if let Some(media_type) = self.media_type {
            params.insert("type".into(), Value::from(media_type.as_str()));
        }
        params
    }
}

impl From<&str> for SearchQuery {
    fn from(query: &str) -> Self {
        SearchQuery::new(query)
    }
}

impl From<String> for SearchQuery {
    fn from(query: String) -> Self {
        SearchQuery::new(query)
    }
}
