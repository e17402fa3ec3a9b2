//! # pb-store-memory
//!
//! Process-local implementation of the board stores on top of `DashMap`.
//! Each mutation happens under the entry's shard lock, which gives the same
//! atomic counter semantics as the SQL adapter. Nothing survives a restart.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use pb_core::models::{CastOutcome, MemberId, NewPost, NewVote, Post, PostEdit, PostId, Vote, VoteType};
use pb_core::traits::{CommentCounter, PostStore, VoteStore};

#[derive(Default)]
pub struct MemoryBoardStore {
    posts: DashMap<PostId, Post>,
    votes: DashMap<(MemberId, PostId), Vote>,
    comments: DashMap<PostId, u64>,
    last_post_id: AtomicI64,
    last_vote_id: AtomicI64,
}

impl MemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one comment on `post`.
    pub fn add_comment(&self, post: PostId) {
        *self.comments.entry(post).or_insert(0) += 1;
    }

    /// Puts a fully formed post in place, keeping its id. Handy for fixtures
    /// that need counters or flags a fresh post can't have.
    pub fn put(&self, post: Post) {
        self.last_post_id.fetch_max(post.id, Ordering::SeqCst);
        self.posts.insert(post.id, post);
    }

    fn update<F>(&self, id: PostId, apply: F) -> Option<Post>
    where
        F: FnOnce(&mut Post),
    {
        self.posts.get_mut(&id).map(|mut post| {
            apply(post.value_mut());
            post.clone()
        })
    }

    fn snapshot(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self.posts.iter().map(|p| p.value().clone()).collect();
        posts.sort_by_key(|p| p.id);
        posts
    }
}

#[async_trait]
impl PostStore for MemoryBoardStore {
    async fn get_by_id(&self, id: PostId) -> anyhow::Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|p| p.value().clone()))
    }

    async fn insert(&self, post: NewPost) -> anyhow::Result<Post> {
        let id = self.last_post_id.fetch_add(1, Ordering::SeqCst) + 1;
        let post = Post {
            id,
            author_id: post.author_id,
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            permit_count: 0,
            reject_count: 0,
            rank_count: 0,
            vote_closed: false,
            listing_closed: false,
            vote_deadline: post.vote_deadline,
            listing_deadline: post.listing_deadline,
            created_at: post.created_at,
        };
        self.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn update_content(&self, id: PostId, edit: PostEdit) -> anyhow::Result<Option<Post>> {
        Ok(self.update(id, |post| {
            if let Some(title) = edit.title {
                post.title = title;
            }
            if let Some(content) = edit.content {
                post.content = content;
            }
            post.image_url = edit.image_url;
        }))
    }

    /// Deletion is hard here: the post's votes and comment count go with it.
    async fn delete(&self, id: PostId) -> anyhow::Result<bool> {
        if self.posts.remove(&id).is_none() {
            return Ok(false);
        }
        self.votes.retain(|(_, post), _| *post != id);
        self.comments.remove(&id);
        Ok(true)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Post>> {
        Ok(self.snapshot())
    }

    async fn list_top_by_engagement(&self, k: usize) -> anyhow::Result<Vec<Post>> {
        let mut posts = self.snapshot();
        posts.sort_by(|a, b| b.rank_count.cmp(&a.rank_count).then(a.id.cmp(&b.id)));
        posts.truncate(k);
        Ok(posts)
    }

    async fn record_view(
        &self,
        id: PostId,
        vote_closed: bool,
        listing_closed: bool,
    ) -> anyhow::Result<Option<Post>> {
        Ok(self.update(id, |post| {
            post.rank_count += 1;
            post.vote_closed |= vote_closed;
            post.listing_closed |= listing_closed;
        }))
    }

    async fn close(&self, id: PostId, vote_closed: bool, listing_closed: bool) -> anyhow::Result<()> {
        self.update(id, |post| {
            post.vote_closed |= vote_closed;
            post.listing_closed |= listing_closed;
        });
        Ok(())
    }
}

#[async_trait]
impl VoteStore for MemoryBoardStore {
    async fn find_by_member_and_post(&self, member: MemberId, post: PostId) -> anyhow::Result<Option<Vote>> {
        Ok(self.votes.get(&(member, post)).map(|v| v.value().clone()))
    }

    /// The vote entry stays locked until the counter has moved, so a racing
    /// second vote by the same member waits and then sees `AlreadyVoted`.
    async fn cast(&self, vote: NewVote) -> anyhow::Result<CastOutcome> {
        let slot = match self.votes.entry((vote.member_id, vote.post_id)) {
            Entry::Occupied(_) => return Ok(CastOutcome::AlreadyVoted),
            Entry::Vacant(slot) => slot,
        };
        let counted = self.update(vote.post_id, |post| match vote.result {
            VoteType::Permit => post.permit_count += 1,
            VoteType::Reject => post.reject_count += 1,
            VoteType::NoResult => {}
        });
        let Some(post) = counted else {
            return Ok(CastOutcome::PostMissing);
        };

        let stored = Vote {
            id: self.last_vote_id.fetch_add(1, Ordering::SeqCst) + 1,
            member_id: vote.member_id,
            post_id: vote.post_id,
            result: vote.result,
            created_at: vote.created_at,
        };
        slot.insert(stored.clone());
        tracing::trace!(vote_id = stored.id, "vote stored in memory");
        Ok(CastOutcome::Counted { vote: stored, post })
    }
}

#[async_trait]
impl CommentCounter for MemoryBoardStore {
    async fn count_for(&self, post: PostId) -> anyhow::Result<u64> {
        Ok(self.comments.get(&post).map_or(0, |c| *c))
    }
}
