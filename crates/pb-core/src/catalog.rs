//! # PostCatalog
//!
//! The orchestrator behind every post endpoint. It pulls posts from the store,
//! brings their lifecycle flags up to date, applies counters and hands back
//! view-ready aggregates. It holds no state of its own beyond its collaborators.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::curation::{self, Candidate, LandingLabel};
use crate::error::{AppError, Result};
use crate::lifecycle::{self, Transition};
use crate::models::{CastOutcome, MemberId, NewPost, NewVote, Post, PostDetail, PostEdit, PostFields, PostId, PostSummary, Vote, VoteType};
use crate::policy::CatalogPolicy;
use crate::ratio::VoteRatio;
use crate::sorting::{self, SortCriterion};
use crate::traits::{Authorizer, Clock, CommentCounter, PostStore, RandomSource, VoteStore};

/// The collaborators a catalog is wired with.
#[derive(Clone)]
pub struct CatalogPorts {
    pub posts: Arc<dyn PostStore>,
    pub votes: Arc<dyn VoteStore>,
    pub comments: Arc<dyn CommentCounter>,
    pub authorizer: Arc<dyn Authorizer>,
    pub clock: Arc<dyn Clock>,
    pub rng: Arc<dyn RandomSource>,
}

pub type Landing = BTreeMap<LandingLabel, PostSummary>;

#[derive(Clone)]
pub struct PostCatalog {
    ports: CatalogPorts,
    policy: CatalogPolicy,
}

impl PostCatalog {
    pub fn new(ports: CatalogPorts, policy: CatalogPolicy) -> Self {
        Self { ports, policy }
    }

    /// Detail view. Counts as a view: the engagement counter goes up by one in
    /// the same store update that persists any lifecycle flip.
    pub async fn get_detail(&self, id: PostId, viewer: Option<MemberId>) -> Result<PostDetail> {
        let stored = self.fetch(id).await?;
        let evaluated = lifecycle::evaluate(stored.clone(), self.ports.clock.now());
        closed_any(&stored, &evaluated);

        let post = self
            .ports
            .posts
            .record_view(id, evaluated.vote_closed, evaluated.listing_closed)
            .await?
            .ok_or_else(|| AppError::post_not_found(id))?;

        let viewer_vote = match viewer {
            Some(member) => self
                .ports
                .votes
                .find_by_member_and_post(member, id)
                .await?
                .map_or(VoteType::NoResult, |v| v.result),
            None => VoteType::NoResult,
        };

        Ok(PostDetail {
            ratio: VoteRatio::of(&post),
            post,
            viewer_vote,
        })
    }

    pub async fn create(&self, author: MemberId, fields: PostFields) -> Result<Post> {
        let now = self.ports.clock.now();
        let windows = &self.policy.lifecycle;
        let post = self
            .ports
            .posts
            .insert(NewPost {
                author_id: author,
                title: fields.title,
                content: fields.content,
                image_url: fields.image_url,
                vote_deadline: now + windows.vote_window,
                listing_deadline: now + windows.listing_window,
                created_at: now,
            })
            .await?;
        tracing::info!(post_id = post.id, author, "post created");
        Ok(post)
    }

    pub async fn update(&self, id: PostId, edit: PostEdit, requester: MemberId) -> Result<Post> {
        let post = self.fetch(id).await?;
        self.authorize(&post, requester, "edit")?;
        self.ports
            .posts
            .update_content(id, edit)
            .await?
            .ok_or_else(|| AppError::post_not_found(id))
    }

    pub async fn delete(&self, id: PostId, requester: MemberId) -> Result<PostId> {
        let post = self.fetch(id).await?;
        self.authorize(&post, requester, "delete")?;
        if !self.ports.posts.delete(id).await? {
            return Err(AppError::post_not_found(id));
        }
        tracing::info!(post_id = id, requester, "post deleted");
        Ok(id)
    }

    /// All live posts, lifecycle-evaluated, in the requested order.
    pub async fn list(&self, criterion: SortCriterion) -> Result<Vec<PostSummary>> {
        let posts = self.ports.posts.list_all().await?;
        let posts = self.refresh(posts).await?;
        tracing::debug!(sort = criterion.as_str(), count = posts.len(), "listing posts");
        Ok(sorting::sorted(posts, criterion).into_iter().map(PostSummary::from).collect())
    }

    /// The landing page slots. Empty when there is nothing to curate.
    pub async fn landing(&self) -> Result<Landing> {
        let policy = &self.policy.curation;
        let pool = self
            .ports
            .posts
            .list_top_by_engagement(policy.candidate_pool_size)
            .await?;
        if pool.is_empty() {
            tracing::debug!("no posts to curate");
            return Ok(Landing::new());
        }

        let pool = self.refresh(pool).await?;
        let mut candidates = Vec::with_capacity(pool.len());
        for post in pool {
            let comment_count = self.ports.comments.count_for(post.id).await?;
            candidates.push(Candidate { post, comment_count });
        }

        let slots = curation::select(&candidates, policy, self.ports.rng.as_ref());
        Ok(slots.into_iter().map(|(label, post)| (label, PostSummary::from(post))).collect())
    }

    /// Records `voter`'s vote. A member gets one vote per post; the vote store
    /// has the final say on that and moves the counter in the same write.
    pub async fn vote(&self, id: PostId, voter: MemberId, result: VoteType) -> Result<Vote> {
        self.fetch(id).await?;

        let duplicate = || {
            tracing::warn!(post_id = id, voter, "duplicate vote rejected");
            AppError::Conflict(format!("member {voter} already voted on post {id}"))
        };
        if self.ports.votes.find_by_member_and_post(voter, id).await?.is_some() {
            return Err(duplicate());
        }
        let cast = NewVote {
            member_id: voter,
            post_id: id,
            result,
            created_at: self.ports.clock.now(),
        };
        match self.ports.votes.cast(cast).await? {
            CastOutcome::Counted { vote, post } => {
                tracing::debug!(
                    post_id = id,
                    voter,
                    %result,
                    permit = post.permit_count,
                    reject = post.reject_count,
                    "vote recorded"
                );
                Ok(vote)
            }
            CastOutcome::AlreadyVoted => Err(duplicate()),
            CastOutcome::PostMissing => Err(AppError::post_not_found(id)),
        }
    }

    async fn fetch(&self, id: PostId) -> Result<Post> {
        self.ports
            .posts
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::post_not_found(id))
    }

    fn authorize(&self, post: &Post, requester: MemberId, action: &str) -> Result<()> {
        if self.ports.authorizer.is_owner(post, requester) {
            return Ok(());
        }
        tracing::warn!(post_id = post.id, requester, action, "rejected non-owner");
        Err(AppError::Forbidden(format!("member {requester} may not {action} post {}", post.id)))
    }

    /// Evaluates every post against the clock and writes back the flips.
    async fn refresh(&self, posts: Vec<Post>) -> Result<Vec<Post>> {
        let now = self.ports.clock.now();
        let mut refreshed = Vec::with_capacity(posts.len());
        for stored in posts {
            let evaluated = lifecycle::evaluate(stored.clone(), now);
            if closed_any(&stored, &evaluated) {
                self.ports
                    .posts
                    .close(evaluated.id, evaluated.vote_closed, evaluated.listing_closed)
                    .await?;
            }
            refreshed.push(evaluated);
        }
        Ok(refreshed)
    }
}

fn closed_any(before: &Post, after: &Post) -> bool {
    let t = Transition::between(before, after);
    if !t.is_empty() {
        tracing::debug!(
            post_id = after.id,
            vote_closed = t.vote_closed,
            listing_closed = t.listing_closed,
            "deadline passed"
        );
    }
    !t.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{post_at, ScriptedRandom};
    use crate::traits::{MockAuthorizer, MockClock, MockCommentCounter, MockPostStore, MockVoteStore};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use mockall::predicate::eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 2, 7, 12, 0, 0).unwrap()
    }

    struct Mocks {
        posts: MockPostStore,
        votes: MockVoteStore,
        comments: MockCommentCounter,
        authorizer: MockAuthorizer,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                posts: MockPostStore::new(),
                votes: MockVoteStore::new(),
                comments: MockCommentCounter::new(),
                authorizer: MockAuthorizer::new(),
            }
        }

        fn catalog(self) -> PostCatalog {
            let mut clock = MockClock::new();
            clock.expect_now().returning(now);
            PostCatalog::new(
                CatalogPorts {
                    posts: Arc::new(self.posts),
                    votes: Arc::new(self.votes),
                    comments: Arc::new(self.comments),
                    authorizer: Arc::new(self.authorizer),
                    clock: Arc::new(clock),
                    rng: Arc::new(ScriptedRandom::new([0])),
                },
                CatalogPolicy::default(),
            )
        }
    }

    #[tokio::test]
    async fn create_sets_deadlines_from_policy() {
        let mut m = Mocks::new();
        m.posts
            .expect_insert()
            .withf(|p| {
                p.created_at == now()
                    && p.vote_deadline == now() + Duration::days(1)
                    && p.listing_deadline == now() + Duration::days(7)
                    && p.author_id == 9
            })
            .times(1)
            .returning(|p| {
                let mut post = post_at(1, p.created_at);
                post.author_id = p.author_id;
                post.title = p.title;
                Ok(post)
            });

        let fields = PostFields {
            title: "new idea".into(),
            content: "body".into(),
            image_url: None,
        };
        let post = m.catalog().create(9, fields).await.unwrap();
        assert_eq!(post.title, "new idea");
        assert!(!post.vote_closed && !post.listing_closed);
        assert_eq!((post.permit_count, post.reject_count, post.rank_count), (0, 0, 0));
    }

    #[tokio::test]
    async fn detail_persists_flip_with_view() {
        let mut m = Mocks::new();
        let stale = post_at(3, now() - Duration::days(2));
        let returned = stale.clone();
        m.posts.expect_get_by_id().with(eq(3)).returning(move |_| Ok(Some(stale.clone())));
        m.posts
            .expect_record_view()
            .with(eq(3), eq(true), eq(false))
            .times(1)
            .returning(move |_, v, l| {
                let mut p = returned.clone();
                p.rank_count += 1;
                p.vote_closed = v;
                p.listing_closed = l;
                Ok(Some(p))
            });

        let detail = m.catalog().get_detail(3, None).await.unwrap();
        assert!(detail.post.vote_closed);
        assert_eq!(detail.post.rank_count, 1);
        assert_eq!(detail.viewer_vote, VoteType::NoResult);
    }

    #[tokio::test]
    async fn detail_reports_viewer_vote() {
        let mut m = Mocks::new();
        let post = post_at(4, now());
        let viewed = post.clone();
        m.posts.expect_get_by_id().returning(move |_| Ok(Some(post.clone())));
        m.posts.expect_record_view().returning(move |_, _, _| Ok(Some(viewed.clone())));
        m.votes
            .expect_find_by_member_and_post()
            .with(eq(7), eq(4))
            .returning(|member, post| {
                Ok(Some(Vote {
                    id: 1,
                    member_id: member,
                    post_id: post,
                    result: VoteType::Reject,
                    created_at: now(),
                }))
            });

        let detail = m.catalog().get_detail(4, Some(7)).await.unwrap();
        assert_eq!(detail.viewer_vote, VoteType::Reject);
    }

    #[tokio::test]
    async fn detail_of_missing_post_is_not_found() {
        let mut m = Mocks::new();
        m.posts.expect_get_by_id().returning(|_| Ok(None));
        m.posts.expect_record_view().never();
        let err = m.catalog().get_detail(99, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn update_by_non_owner_is_forbidden() {
        let mut m = Mocks::new();
        let post = post_at(5, now());
        m.posts.expect_get_by_id().returning(move |_| Ok(Some(post.clone())));
        m.authorizer.expect_is_owner().returning(|_, _| false);
        m.posts.expect_update_content().never();

        let edit = PostEdit {
            title: Some("hijacked".into()),
            ..Default::default()
        };
        let err = m.catalog().update(5, edit, 42).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn delete_by_owner_removes_post() {
        let mut m = Mocks::new();
        let post = post_at(6, now());
        m.posts.expect_get_by_id().returning(move |_| Ok(Some(post.clone())));
        m.authorizer.expect_is_owner().returning(|p, who| p.author_id == who);
        m.posts.expect_delete().with(eq(6)).times(1).returning(|_| Ok(true));

        assert_eq!(m.catalog().delete(6, 1).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn vote_on_missing_post_is_not_found() {
        let mut m = Mocks::new();
        m.posts.expect_get_by_id().returning(|_| Ok(None));
        m.votes.expect_cast().never();
        let err = m.catalog().vote(1, 2, VoteType::Permit).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn second_vote_is_a_conflict() {
        let mut m = Mocks::new();
        let post = post_at(8, now());
        m.posts.expect_get_by_id().returning(move |_| Ok(Some(post.clone())));
        m.votes.expect_find_by_member_and_post().returning(|_, _| Ok(None));
        // Lost the race to a concurrent vote by the same member.
        m.votes.expect_cast().returning(|_| Ok(CastOutcome::AlreadyVoted));

        let err = m.catalog().vote(8, 2, VoteType::Permit).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn post_deleted_mid_vote_is_not_found() {
        let mut m = Mocks::new();
        let post = post_at(8, now());
        m.posts.expect_get_by_id().returning(move |_| Ok(Some(post.clone())));
        m.votes.expect_find_by_member_and_post().returning(|_, _| Ok(None));
        m.votes.expect_cast().returning(|_| Ok(CastOutcome::PostMissing));

        let err = m.catalog().vote(8, 2, VoteType::Permit).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn accepted_vote_is_cast_once() {
        let mut m = Mocks::new();
        let post = post_at(8, now());
        let mut voted = post.clone();
        voted.reject_count = 1;
        m.posts.expect_get_by_id().returning(move |_| Ok(Some(post.clone())));
        m.votes.expect_find_by_member_and_post().returning(|_, _| Ok(None));
        m.votes
            .expect_cast()
            .withf(|v| v.post_id == 8 && v.member_id == 2 && v.result == VoteType::Reject && v.created_at == now())
            .times(1)
            .returning(move |v| {
                Ok(CastOutcome::Counted {
                    vote: Vote {
                        id: 11,
                        member_id: v.member_id,
                        post_id: v.post_id,
                        result: v.result,
                        created_at: v.created_at,
                    },
                    post: voted.clone(),
                })
            });

        let vote = m.catalog().vote(8, 2, VoteType::Reject).await.unwrap();
        assert_eq!(vote.id, 11);
    }

    #[tokio::test]
    async fn failed_cast_surfaces_as_internal() {
        let mut m = Mocks::new();
        let post = post_at(8, now());
        m.posts.expect_get_by_id().returning(move |_| Ok(Some(post.clone())));
        m.votes.expect_find_by_member_and_post().returning(|_, _| Ok(None));
        m.votes
            .expect_cast()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("database is locked")));

        let err = m.catalog().vote(8, 2, VoteType::Permit).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn empty_pool_has_no_landing() {
        let mut m = Mocks::new();
        m.posts
            .expect_list_top_by_engagement()
            .with(eq(50))
            .returning(|_| Ok(Vec::new()));
        m.comments.expect_count_for().never();
        assert!(m.catalog().landing().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_writes_back_closed_listings() {
        let mut m = Mocks::new();
        let old = post_at(1, now() - Duration::days(8));
        let fresh = post_at(2, now());
        m.posts
            .expect_list_all()
            .returning(move || Ok(vec![fresh.clone(), old.clone()]));
        m.posts
            .expect_close()
            .with(eq(1), eq(true), eq(true))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let listed = m.catalog().list(SortCriterion::AlreadyDone).await.unwrap();
        assert_eq!(listed.iter().map(|s| s.post.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(listed[0].post.listing_closed);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_internal() {
        let mut m = Mocks::new();
        m.posts
            .expect_list_all()
            .returning(|| Err(anyhow::anyhow!("disk on fire")));
        let err = m.catalog().list(SortCriterion::Natural).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(msg) if msg.contains("disk on fire")));
    }
}
