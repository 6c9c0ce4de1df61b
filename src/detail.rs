use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::GatewayResult;
use crate::models::{Comment, ItemLookup, Post};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailStatus {
    Loading,
    Loaded(Post),
    NotFound,
    Failed(String),
}

/// State behind the post page: the requested id, what came back, and which
/// comments the reader has folded away.
#[derive(Debug, Clone)]
pub struct DetailState {
    post_id: String,
    status: DetailStatus,
    collapsed: HashSet<String>,
}

impl DetailState {
    pub fn loading(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            status: DetailStatus::Loading,
            collapsed: HashSet::new(),
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn status(&self) -> &DetailStatus {
        &self.status
    }

    /// Stores the lookup for `post_id`. Results for another post are ignored.
    pub fn apply(&mut self, post_id: &str, result: GatewayResult<ItemLookup>) {
        if post_id != self.post_id {
            return;
        }

        self.status = match result {
            Ok(ItemLookup::Found(post)) => {
                info!(id = %post_id, comments = post.comments.len(), "post loaded");
                DetailStatus::Loaded(post)
            }
            Ok(ItemLookup::NotFound) => {
                info!(id = %post_id, "post not found");
                DetailStatus::NotFound
            }
            Err(error) => {
                warn!(id = %post_id, kind = error.kind(), %error, "loading post failed");
                DetailStatus::Failed(error.to_string())
            }
        };
    }

    pub fn is_collapsed(&self, comment_id: &str) -> bool {
        self.collapsed.contains(comment_id)
    }

    pub fn toggle_collapsed(&mut self, comment_id: &str) {
        if !self.collapsed.remove(comment_id) {
            self.collapsed.insert(comment_id.to_string());
        }
    }

    /// Folds every top-level comment.
    pub fn collapse_all(&mut self) {
        if let DetailStatus::Loaded(post) = &self.status {
            self.collapsed
                .extend(post.comments.iter().map(|comment| comment.id.clone()));
        }
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    pub fn comment_count(&self) -> usize {
        match &self.status {
            DetailStatus::Loaded(post) => post
                .comments
                .iter()
                .map(|comment| 1 + comment.reply_count())
                .sum(),
            _ => 0,
        }
    }
}

/// Comments that should be drawn, skipping deleted ones whose whole subtree is empty.
pub fn visible_children(comments: &[Comment]) -> impl Iterator<Item = &Comment> {
    comments
        .iter()
        .filter(|comment| !comment.text.is_empty() || !comment.children.is_empty())
}
