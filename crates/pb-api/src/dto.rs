//! Request and response bodies of the JSON API.

use chrono::{DateTime, Utc};
use pb_core::{LandingLabel, MemberId, Post, PostDetail, PostEdit, PostFields, PostId, PostSummary, VoteRatio, VoteType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub product_image_url: Option<String>,
}

impl From<CreatePostRequest> for PostFields {
    fn from(req: CreatePostRequest) -> Self {
        PostFields {
            title: req.title,
            content: req.content,
            image_url: req.product_image_url,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub product_image_url: Option<String>,
}

impl From<UpdatePostRequest> for PostEdit {
    fn from(req: UpdatePostRequest) -> Self {
        PostEdit {
            title: req.title,
            content: req.content,
            image_url: req.product_image_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub result: VoteType,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub sorted: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: PostId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    pub id: PostId,
    pub author_id: MemberId,
    pub title: String,
    pub content: String,
    pub product_image_url: String,
    pub vote_closed: bool,
    pub listing_closed: bool,
    pub permit_count: u32,
    pub reject_count: u32,
    pub permit_ratio: u8,
    pub reject_ratio: u8,
    pub rank_count: u64,
    pub created_date: DateTime<Utc>,
    pub vote_deadline: DateTime<Utc>,
    pub listing_deadline: DateTime<Utc>,
    pub current_member_vote_result: VoteType,
}

impl From<PostDetail> for PostDetailResponse {
    fn from(detail: PostDetail) -> Self {
        let PostDetail { post, ratio, viewer_vote } = detail;
        PostDetailResponse {
            id: post.id,
            author_id: post.author_id,
            title: post.title,
            content: post.content,
            product_image_url: post.image_url.unwrap_or_default(),
            vote_closed: post.vote_closed,
            listing_closed: post.listing_closed,
            permit_count: post.permit_count,
            reject_count: post.reject_count,
            permit_ratio: ratio.permit,
            reject_ratio: ratio.reject,
            rank_count: post.rank_count,
            created_date: post.created_at,
            vote_deadline: post.vote_deadline,
            listing_deadline: post.listing_deadline,
            current_member_vote_result: viewer_vote,
        }
    }
}

/// A post as shown in lists and landing slots.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListItem {
    pub id: PostId,
    pub author_id: MemberId,
    pub title: String,
    pub product_image_url: String,
    pub vote_closed: bool,
    pub listing_closed: bool,
    pub permit_ratio: u8,
    pub reject_ratio: u8,
    pub created_date: DateTime<Utc>,
    pub vote_deadline: DateTime<Utc>,
    pub listing_deadline: DateTime<Utc>,
}

impl PostListItem {
    fn new(post: Post, ratio: VoteRatio) -> Self {
        PostListItem {
            id: post.id,
            author_id: post.author_id,
            title: post.title,
            product_image_url: post.image_url.unwrap_or_default(),
            vote_closed: post.vote_closed,
            listing_closed: post.listing_closed,
            permit_ratio: ratio.permit,
            reject_ratio: ratio.reject,
            created_date: post.created_at,
            vote_deadline: post.vote_deadline,
            listing_deadline: post.listing_deadline,
        }
    }
}

impl From<PostSummary> for PostListItem {
    fn from(summary: PostSummary) -> Self {
        PostListItem::new(summary.post, summary.ratio)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostListItem>,
}

/// One landing slot. `post` is `null` when the slot had nothing to show.
#[derive(Debug, Serialize, Deserialize)]
pub struct LandingSlot {
    pub label: String,
    pub post: Option<PostListItem>,
}

impl LandingSlot {
    pub fn new(label: LandingLabel, post: Option<PostSummary>) -> Self {
        LandingSlot {
            label: label.as_str().to_string(),
            post: post.map(PostListItem::from),
        }
    }
}
