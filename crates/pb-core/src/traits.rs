//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be wired into the catalog.
//! Store methods report infrastructure failures through `anyhow`; "not there"
//! is an `Ok(None)`, never an error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{CastOutcome, MemberId, NewPost, NewVote, Post, PostEdit, PostId, Vote};

/// Data persistence contract for posts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Returns the post unless it does not exist or was deleted.
    async fn get_by_id(&self, id: PostId) -> anyhow::Result<Option<Post>>;

    async fn insert(&self, post: NewPost) -> anyhow::Result<Post>;

    /// Applies an edit to title, content and image. Returns `None` if the post is gone.
    async fn update_content(&self, id: PostId, edit: PostEdit) -> anyhow::Result<Option<Post>>;

    /// Removes the post from circulation. Returns `false` if it was already gone.
    async fn delete(&self, id: PostId) -> anyhow::Result<bool>;

    /// Every live post in storage order.
    async fn list_all(&self) -> anyhow::Result<Vec<Post>>;

    /// The `k` live posts with the highest engagement counter.
    async fn list_top_by_engagement(&self, k: usize) -> anyhow::Result<Vec<Post>>;

    /// Atomically bumps the engagement counter by one and ORs in the given
    /// closed flags. Returns the post as stored afterwards.
    async fn record_view(
        &self,
        id: PostId,
        vote_closed: bool,
        listing_closed: bool,
    ) -> anyhow::Result<Option<Post>>;

    /// ORs in closed flags observed on a read path. Never reopens a post.
    async fn close(&self, id: PostId, vote_closed: bool, listing_closed: bool) -> anyhow::Result<()>;
}

/// Vote persistence. Owns the one-vote-per-member rule.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VoteStore: Send + Sync {
    async fn find_by_member_and_post(&self, member: MemberId, post: PostId) -> anyhow::Result<Option<Vote>>;

    /// Stores the vote and adds one to the post's counter matching its result,
    /// as a single unit: either both happen or neither does. `NoResult` votes
    /// are stored without moving a counter.
    async fn cast(&self, vote: NewVote) -> anyhow::Result<CastOutcome>;
}

/// Comment bookkeeping lives elsewhere; the landing page only needs the counts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentCounter: Send + Sync {
    async fn count_for(&self, post: PostId) -> anyhow::Result<u64>;
}

/// Decides whether a member may edit or delete a post.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Authorizer: Send + Sync {
    fn is_owner(&self, post: &Post, requester: MemberId) -> bool;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of the landing page's random draws.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait RandomSource: Send + Sync {
    /// Returns an index in `0..n`. Never called with `n == 0`.
    fn pick(&self, n: usize) -> usize;
}
