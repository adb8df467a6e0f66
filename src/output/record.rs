use crate::api::{Comment, CommentThread};
use crate::resources::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of a comment log
///
/// Top-level comments carry an empty `parent_comment_id`; replies carry the id
/// of the top-level comment they answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(rename = "CommentID")]
    pub comment_id: String,

    #[serde(rename = "ThreadID")]
    pub thread_id: String,

    #[serde(rename = "VideoID")]
    pub video_id: String,

    #[serde(rename = "ParentCommentID")]
    pub parent_comment_id: String,

    #[serde(rename = "CommentText")]
    pub text: String,

    #[serde(rename = "AuthorName")]
    pub author: String,

    #[serde(rename = "NumberOfLikes")]
    pub likes: u64,

    #[serde(rename = "IsReply")]
    pub is_reply: bool,

    #[serde(rename = "Timestamp")]
    pub published_at: DateTime<Utc>,

    #[serde(rename = "Period")]
    pub period: String,

    #[serde(rename = "ChannelLeaning")]
    pub channel_leaning: String,

    #[serde(rename = "Source")]
    pub source: String,
}

impl CommentRecord {
    /// Record for the top-level comment of a thread
    pub fn top_level(thread: &CommentThread, resource: &Resource) -> Self {
        Self::build(
            &thread.snippet.top_level_comment,
            &thread.id,
            "",
            resource,
        )
    }

    /// Record for a reply under `parent_id` in thread `thread_id`
    pub fn reply(comment: &Comment, parent_id: &str, thread_id: &str, resource: &Resource) -> Self {
        Self::build(comment, thread_id, parent_id, resource)
    }

    fn build(comment: &Comment, thread_id: &str, parent_id: &str, resource: &Resource) -> Self {
        let snippet = &comment.snippet;
        let metadata = &resource.metadata;

        Self {
            comment_id: comment.id.clone(),
            thread_id: thread_id.to_string(),
            video_id: resource.id.clone(),
            parent_comment_id: parent_id.to_string(),
            text: snippet.text_display.clone(),
            author: snippet.author_display_name.clone(),
            likes: snippet.like_count,
            is_reply: !parent_id.is_empty(),
            published_at: snippet.published_at,
            period: metadata.period.clone(),
            channel_leaning: metadata.channel_leaning.clone(),
            source: metadata.source.clone(),
        }
    }
}
