//! Blog feed polling.

use serde::Deserialize;

/// One entry of the blog feed. Only the id is needed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlogPost {
    pub id: u64,
    #[serde(default)]
    pub link: Option<String>,
}

/// Number of posts newer than `last_viewed` in a newest-first feed.
///
/// With no record of a viewed post, or one that has fallen out of the
/// fetched page, every fetched post counts as new.
pub fn count_new_posts(last_viewed: Option<u64>, posts: &[BlogPost]) -> usize {
    last_viewed
        .and_then(|id| posts.iter().position(|p| p.id == id))
        .unwrap_or(posts.len())
}

/// Notification text for `count` unread posts, or `None` when there are none.
pub fn new_posts_message(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("There is 1 new blog post.".to_string()),
        n => Some(format!("There are {n} new blog posts.")),
    }
}

/// Id of the newest post in a newest-first feed.
pub fn newest_post_id(posts: &[BlogPost]) -> Option<u64> {
    posts.first().map(|p| p.id)
}
