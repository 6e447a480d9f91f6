pub mod tree;
pub mod walk;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// The flat record shape the controller fetches. `parent_id` is a weak
// back-reference to another comment; a comment never owns its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub author: String,
    pub content: String,
    pub parent_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

// The nested view handed to the presentation layer, rebuilt in full on
// every fetch and never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    pub id: i32,
    pub author: String,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub replies: Vec<CommentNode>,
}
