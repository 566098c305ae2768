use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// A post as returned by the store. The secret key never appears here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub community: String,
    pub location: Option<String>,
    pub upvotes: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Post {
    /// Merges the populated fields of `patch` into this copy.
    pub fn apply(&mut self, patch: PostPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
        if let Some(community) = patch.community {
            self.community = community;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(upvotes) = patch.upvotes {
            self.upvotes = upvotes;
        }
    }

    pub fn has_location(&self) -> bool {
        self.location
            .as_deref()
            .map_or(false, |location| !location.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Community {
    Running,
    Matcha,
    Gaming,
}

impl Community {
    pub const ALL: [Community; 3] = [Self::Running, Self::Matcha, Self::Gaming];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Matcha => "Matcha",
            Self::Gaming => "Gaming",
        }
    }
}

impl fmt::Display for Community {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Community {
    type Err = UnknownCommunity;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|community| community.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownCommunity(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown community: {0}")]
pub struct UnknownCommunity(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Newest,
    Popular,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Popular => "popular",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPostInput {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub community: Community,
    #[serde(default)]
    pub location: Option<String>,
    pub secret_key: String,
}

/// Field replacement for an existing post. `None` leaves a field alone;
/// for nullable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PostUpdateInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub content: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
    #[serde(default)]
    pub community: Option<Community>,
    #[serde(default, deserialize_with = "present")]
    pub location: Option<Option<String>>,
}

// Distinguishes an explicit `null` from a missing key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Local-only field merge used by view state after an external mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub community: Option<String>,
    pub location: Option<Option<String>>,
    pub upvotes: Option<i64>,
}

impl From<Post> for PostPatch {
    fn from(post: Post) -> Self {
        Self {
            title: Some(post.title),
            content: Some(post.content),
            image_url: Some(post.image_url),
            community: Some(post.community),
            location: Some(post.location),
            upvotes: Some(post.upvotes),
        }
    }
}

impl From<PostUpdateInput> for PostPatch {
    fn from(update: PostUpdateInput) -> Self {
        Self {
            title: update.title,
            content: update.content,
            image_url: update.image_url,
            community: update.community.map(|community| community.to_string()),
            location: update.location,
            upvotes: None,
        }
    }
}

/// Client-side narrowing of an already fetched post list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PostFilter {
    #[serde(default)]
    pub community: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub local_only: bool,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(community) = &self.community {
            if !post.community.eq_ignore_ascii_case(community) {
                return false;
            }
        }

        if let Some(search) = self.search.as_deref().filter(|term| !term.trim().is_empty()) {
            if !post.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }

        if self.local_only && !post.has_location() {
            return false;
        }

        true
    }

    pub fn apply<'a>(&self, posts: &'a [Post]) -> Vec<&'a Post> {
        posts.iter().filter(|post| self.matches(post)).collect()
    }
}
