//! # Domain Models
//!
//! These structs represent the core entities of the proposal board.
//! Ids are assigned by the store; members are owned by an external identity system.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::ratio::VoteRatio;

pub type PostId = i64;
pub type MemberId = i64;
pub type VoteId = i64;

/// A product or idea put up for a permit/reject vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: MemberId,
    pub title: String,
    pub content: String,
    /// Reference handed out by the external file store
    pub image_url: Option<String>,
    pub permit_count: u32,
    pub reject_count: u32,
    /// Engagement counter, bumped on every detail view
    pub rank_count: u64,
    /// Voting has ended (set once the vote deadline has been observed as passed)
    pub vote_closed: bool,
    /// Listing has ended (set once the listing deadline has been observed as passed)
    pub listing_closed: bool,
    pub vote_deadline: DateTime<Utc>,
    pub listing_deadline: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Everything the store needs to persist a fresh post. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub author_id: MemberId,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub vote_deadline: DateTime<Utc>,
    pub listing_deadline: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Author-supplied fields of a new post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFields {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

/// An edit request.
///
/// `title` and `content` are only replaced when present. The image reference is
/// always replaced, so an edit without an image clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEdit {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
}

/// A member's verdict on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteType {
    Permit,
    Reject,
    /// Also used to report "this viewer has not voted"
    NoResult,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Permit => "PERMIT",
            VoteType::Reject => "REJECT",
            VoteType::NoResult => "NO_RESULT",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERMIT" => Ok(VoteType::Permit),
            "REJECT" => Ok(VoteType::Reject),
            "NO_RESULT" => Ok(VoteType::NoResult),
            other => Err(AppError::InvalidArgument(format!("unknown vote result '{other}'"))),
        }
    }
}

/// One member's vote on one post. At most one exists per (member, post).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub member_id: MemberId,
    pub post_id: PostId,
    pub result: VoteType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVote {
    pub member_id: MemberId,
    pub post_id: PostId,
    pub result: VoteType,
    pub created_at: DateTime<Utc>,
}

/// What the vote store did with a cast vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastOutcome {
    /// The vote is stored and the matching counter moved; `post` is the post afterwards.
    Counted { vote: Vote, post: Post },
    AlreadyVoted,
    /// The post disappeared before the vote landed. Nothing was stored.
    PostMissing,
}

/// A post paired with its derived vote ratio, as shown in lists and on the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub post: Post,
    pub ratio: VoteRatio,
}

impl From<Post> for PostSummary {
    fn from(post: Post) -> Self {
        let ratio = VoteRatio::of(&post);
        PostSummary { post, ratio }
    }
}

/// The detail view of a single post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub ratio: VoteRatio,
    /// The viewer's own vote, `NoResult` when anonymous or not yet voted
    pub viewer_vote: VoteType,
}
