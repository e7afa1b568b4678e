//! Summary statistics over a list of blogs.
//!
//! Every function here is pure: it reads an ordered slice of [`BlogRecord`]s
//! and returns a derived value. Whenever several candidates share the winning
//! value, the one seen first in input order wins.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// A single blog entry as seen by the aggregation functions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BlogRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub url: String,
    /// Absent, null, negative or non-integer values are read as 0
    #[serde(default, deserialize_with = "deserialize_likes")]
    pub likes: u64,
}

impl BlogRecord {
    pub fn new(title: impl Into<String>, author: impl Into<String>, likes: u64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            url: String::new(),
            likes,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

fn deserialize_likes<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_u64().unwrap_or(0))
}

/// Projection of the most liked blog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FavoriteSummary {
    pub title: String,
    pub author: String,
    pub likes: u64,
}

impl From<&BlogRecord> for FavoriteSummary {
    fn from(blog: &BlogRecord) -> Self {
        Self {
            title: blog.title.clone(),
            author: blog.author.clone(),
            likes: blog.likes,
        }
    }
}

/// Author with the largest number of blogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthorBlogCount {
    pub author: String,
    pub blogs: u64,
}

/// Author with the largest sum of likes over their blogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthorLikesTotal {
    pub author: String,
    pub likes: u64,
}

/// All four statistics computed over the same list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BlogListSummary {
    pub total_likes: u64,
    pub favorite_blog: Option<FavoriteSummary>,
    pub most_blogs: Option<AuthorBlogCount>,
    pub most_likes: Option<AuthorLikesTotal>,
}

/// Sum of likes over all blogs, 0 for an empty list. Saturates instead of overflowing.
pub fn total_likes(blogs: &[BlogRecord]) -> u64 {
    blogs
        .iter()
        .fold(0u64, |total, blog| total.saturating_add(blog.likes))
}

/// The blog with the most likes, or `None` for an empty list
pub fn favorite_blog(blogs: &[BlogRecord]) -> Option<FavoriteSummary> {
    blogs
        .iter()
        .reduce(|favorite, blog| {
            if blog.likes > favorite.likes {
                blog
            } else {
                favorite
            }
        })
        .map(FavoriteSummary::from)
}

/// The author who wrote the most blogs, or `None` for an empty list
pub fn most_blogs(blogs: &[BlogRecord]) -> Option<AuthorBlogCount> {
    let counts = tally_by_author(blogs, |_| 1);
    leader(&counts).map(|(author, blogs)| AuthorBlogCount {
        author: author.to_string(),
        blogs,
    })
}

/// The author whose blogs have the most likes combined, or `None` for an empty list
pub fn most_likes(blogs: &[BlogRecord]) -> Option<AuthorLikesTotal> {
    let sums = tally_by_author(blogs, |blog| blog.likes);
    leader(&sums).map(|(author, likes)| AuthorLikesTotal {
        author: author.to_string(),
        likes,
    })
}

/// Compute every statistic over `blogs`
pub fn summarize(blogs: &[BlogRecord]) -> BlogListSummary {
    BlogListSummary {
        total_likes: total_likes(blogs),
        favorite_blog: favorite_blog(blogs),
        most_blogs: most_blogs(blogs),
        most_likes: most_likes(blogs),
    }
}

/// Accumulate `weight` per author in a single pass.
///
/// The result lists each distinct author once, in the order the author first
/// appears in `blogs`.
fn tally_by_author<'a, F>(blogs: &'a [BlogRecord], weight: F) -> Vec<(&'a str, u64)>
where
    F: Fn(&BlogRecord) -> u64,
{
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut totals: Vec<(&'a str, u64)> = Vec::new();

    for blog in blogs {
        let author = blog.author.as_str();
        let position = *positions.entry(author).or_insert_with(|| {
            totals.push((author, 0));
            totals.len() - 1
        });
        let total = &mut totals[position].1;
        *total = total.saturating_add(weight(blog));
    }

    totals
}

/// First entry holding the maximum value. Later equal values never replace it.
fn leader<'a>(totals: &[(&'a str, u64)]) -> Option<(&'a str, u64)> {
    totals.iter().copied().reduce(|best, candidate| {
        if candidate.1 > best.1 {
            candidate
        } else {
            best
        }
    })
}
