//! # pb-auth-simple
//!
//! Ownership-based implementation of `Authorizer`.
//! Members are authenticated upstream; all that is left to decide here is
//! whether the requester wrote the post.

use pb_core::models::{MemberId, Post};
use pb_core::traits::Authorizer;

#[derive(Debug, Clone, Default)]
pub struct OwnerAuthorizer;

impl OwnerAuthorizer {
    pub fn new() -> Self {
        Self
    }
}

impl Authorizer for OwnerAuthorizer {
    fn is_owner(&self, post: &Post, requester: MemberId) -> bool {
        let owner = post.author_id == requester;
        if !owner {
            tracing::debug!(post_id = post.id, author = post.author_id, requester, "not the author");
        }
        owner
    }
}
