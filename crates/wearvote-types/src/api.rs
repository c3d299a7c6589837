use serde::{Deserialize, Serialize};

use crate::models::{
    Comment, Message, Notification, Post, PostId, User, UserId, VoteType,
};

// -- Errors --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// -- Feed --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedType {
    #[default]
    ForYou,
    Following,
}

impl FeedType {
    /// Unknown values fall back to the "for you" feed.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("following") => Self::Following,
            _ => Self::ForYou,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub category: Option<String>,
    pub user_id: Option<UserId>,
    pub feed_type: Option<String>,
}

/// Active post as shown in the feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    #[serde(flatten)]
    pub post: Post,
    pub user: User,
    pub comment_count: usize,
    pub user_vote: Option<VoteType>,
}

/// Hall of Fame entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPost {
    #[serde(flatten)]
    pub post: Post,
    pub user: User,
    pub is_active: bool,
}

// -- Users --

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileQuery {
    pub requester_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePost {
    #[serde(flatten)]
    pub post: Post,
    pub is_active: bool,
    pub comment_count: usize,
    pub user_vote: Option<VoteType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfileStats {
    pub followers: u64,
    pub following: u64,
    pub posts: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user: User,
    pub posts: Vec<ProfilePost>,
    pub is_following: bool,
    pub stats: ProfileStats,
}

// -- Votes --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VoteRequest {
    pub post_id: PostId,
    pub user_id: UserId,
    /// Kept as a string so an unknown kind surfaces as a 400 with a message.
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    #[serde(flatten)]
    pub post: Post,
    pub user_vote: Option<VoteType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasVotedRequest {
    pub post_id: PostId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HasVotedResponse {
    pub has_voted: bool,
    #[serde(rename = "type")]
    pub kind: Option<VoteType>,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddCommentRequest {
    pub user_id: UserId,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: User,
}

// -- Follows --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FollowRequest {
    pub follower_id: UserId,
    pub following_id: UserId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub is_following: bool,
    pub followers: u64,
}

// -- Messages --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub user: User,
    pub last_message: Message,
    pub unread_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkMessagesReadRequest {
    /// The reader (receiver of the messages).
    pub user_id: UserId,
    /// The counterpart whose messages are being acknowledged.
    pub other_id: UserId,
}

// -- Notifications --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub sender: User,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkNotificationsReadRequest {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MarkReadResponse {
    pub success: bool,
    pub updated: usize,
}
