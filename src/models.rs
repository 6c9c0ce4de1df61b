use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

// Wire types for the search API.

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
    #[serde(rename = "nbPages", default)]
    pub nb_pages: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "objectID", deserialize_with = "id_string")]
    pub object_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub story_title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub story_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemResponse {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<ItemResponse>,
}

// Item ids come back as numbers, hit ids as strings.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// One row of the search result list.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub url: String,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<SearchHit> for PostSummary {
    fn from(hit: SearchHit) -> Self {
        // Comment hits carry the parent story's title and url instead of their own.
        let title = hit.title.filter(|t| !t.is_empty()).or(hit.story_title);
        let url = hit.url.filter(|u| !u.is_empty()).or(hit.story_url);

        Self {
            id: hit.object_id,
            title: title.unwrap_or_default(),
            url: url.unwrap_or_default(),
            author: hit.author.unwrap_or_default(),
            created_at: parse_timestamp(hit.created_at.as_deref()),
        }
    }
}

/// A decoded page of search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub posts: Vec<PostSummary>,
    pub total_pages: u32,
}

impl From<SearchResponse> for SearchPage {
    fn from(response: SearchResponse) -> Self {
        Self {
            posts: response.hits.into_iter().map(PostSummary::from).collect(),
            total_pages: response.nb_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Raw HTML as served by the API.
    pub text: String,
    pub children: Vec<Comment>,
}

impl From<ItemResponse> for Comment {
    fn from(item: ItemResponse) -> Self {
        Self {
            created_at: parse_timestamp(item.created_at.as_deref()),
            id: item.id,
            author: item.author.unwrap_or_default(),
            text: item.text.unwrap_or_default(),
            children: item.children.into_iter().map(Comment::from).collect(),
        }
    }
}

impl Comment {
    /// Number of replies below this comment, at any depth.
    pub fn reply_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.reply_count())
            .sum()
    }
}

/// A story (or comment) opened in the detail view, with its reply tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub url: String,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
    pub text: String,
    pub comments: Vec<Comment>,
}

impl From<ItemResponse> for Post {
    fn from(item: ItemResponse) -> Self {
        Self {
            created_at: parse_timestamp(item.created_at.as_deref()),
            id: item.id,
            title: item.title.unwrap_or_default(),
            url: item.url.unwrap_or_default(),
            author: item.author.unwrap_or_default(),
            text: item.text.unwrap_or_default(),
            comments: item.children.into_iter().map(Comment::from).collect(),
        }
    }
}

/// Result of looking up a single item. An unknown id is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemLookup {
    Found(Post),
    NotFound,
}

/// Renders a timestamp the way the list and detail views show it, e.g. `Tue Jan 02 2024 09:05`.
pub fn format_timestamp(created_at: Option<DateTime<Utc>>) -> String {
    format_timestamp_in(created_at, &Local)
}

pub fn format_timestamp_in<Tz>(created_at: Option<DateTime<Utc>>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match created_at {
        Some(ts) => ts.with_timezone(tz).format("%a %b %d %Y %H:%M").to_string(),
        None => "unknown date".to_string(),
    }
}
