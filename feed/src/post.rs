use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A post as fetched, before engagement data is folded in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub author: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

/// One user's like on one post. The store keeps likes unique per
/// (user, post), but a snapshot fetched mid-write may still carry
/// duplicates, so assembly counts distinct likers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user: String,
    pub post_id: i32,
}

/// The post shape handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub id: i32,
    pub author: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub like_count: i64,
    pub liked_by_viewer: bool,
}

/// Decorates posts with their like counts and the viewer's own like
/// state, newest first.
///
/// `viewer` is the signed-in user's handle; `None` (anonymous) never sees
/// `liked_by_viewer`. Likes pointing at posts outside `posts` belong to
/// other pages of the feed and are ignored.
pub fn assemble_feed(posts: Vec<Post>, likes: &[Like], viewer: Option<&str>) -> Vec<PostView> {
    let mut likers: HashMap<i32, HashSet<&str>> = HashMap::new();
    for like in likes {
        likers
            .entry(like.post_id)
            .or_default()
            .insert(like.user.as_str());
    }

    let mut views: Vec<PostView> = posts
        .into_iter()
        .map(|post| {
            let post_likers = likers.get(&post.id);
            PostView {
                like_count: post_likers.map_or(0, |l| l.len() as i64),
                liked_by_viewer: match (post_likers, viewer) {
                    (Some(post_likers), Some(viewer)) => post_likers.contains(viewer),
                    _ => false,
                },
                id: post.id,
                author: post.author,
                content: post.content,
                created_at: post.created_at,
            }
        })
        .collect();

    // Newest first, the order the feed lists posts in; id breaks
    // created_at ties so the order is stable across rebuilds.
    views.sort_unstable_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    views
}
