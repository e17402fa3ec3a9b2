//! # Landing page curation
//!
//! Fills five labeled highlight slots from the candidate pool (the most viewed
//! posts). Each label is decided on its own against the whole pool, so one post
//! may show up under several labels. `hotPost`, `belovedPost` and
//! `recommendPost` are independent uniform draws and are deliberately not
//! deduplicated against each other.
//!
//! The conditional labels are left out when nothing qualifies; filling the gap
//! with a placeholder is the presentation layer's job.

use std::collections::BTreeMap;

use crate::models::Post;
use crate::policy::CurationPolicy;
use crate::ratio::VoteRatio;
use crate::traits::RandomSource;

/// Slot names, in the order the landing page lays them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LandingLabel {
    HotPost,
    BelovedPost,
    RecommendPost,
    BestResponsePost,
    NeckAndNeckPost,
}

impl LandingLabel {
    pub const ALL: [LandingLabel; 5] = [
        LandingLabel::HotPost,
        LandingLabel::BelovedPost,
        LandingLabel::RecommendPost,
        LandingLabel::BestResponsePost,
        LandingLabel::NeckAndNeckPost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LandingLabel::HotPost => "hotPost",
            LandingLabel::BelovedPost => "belovedPost",
            LandingLabel::RecommendPost => "recommendPost",
            LandingLabel::BestResponsePost => "bestResponsePost",
            LandingLabel::NeckAndNeckPost => "neckAndNeckPost",
        }
    }
}

/// A member of the candidate pool together with its comment count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub post: Post,
    pub comment_count: u64,
}

pub type CuratedSlots = BTreeMap<LandingLabel, Post>;

/// Picks the landing slots. Draws happen in [`LandingLabel::ALL`] order.
///
/// An empty pool yields an empty selection.
pub fn select(candidates: &[Candidate], policy: &CurationPolicy, rng: &dyn RandomSource) -> CuratedSlots {
    let mut slots = CuratedSlots::new();
    if candidates.is_empty() {
        return slots;
    }

    for label in [LandingLabel::HotPost, LandingLabel::BelovedPost, LandingLabel::RecommendPost] {
        if let Some(c) = draw(candidates, rng) {
            slots.insert(label, c.post.clone());
        }
    }

    if let Some(post) = best_response(candidates, policy.best_response_pool, rng) {
        slots.insert(LandingLabel::BestResponsePost, post.clone());
    }

    let close_calls: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| VoteRatio::of(&c.post).is_neck_and_neck(policy.neck_and_neck_margin))
        .collect();
    if let Some(c) = draw(&close_calls, rng) {
        slots.insert(LandingLabel::NeckAndNeckPost, c.post.clone());
    }

    tracing::debug!(
        pool = candidates.len(),
        close_calls = close_calls.len(),
        filled = slots.len(),
        "curated landing slots"
    );
    slots
}

/// Among commented candidates, a random one of the `top` most commented.
fn best_response<'a>(candidates: &'a [Candidate], top: usize, rng: &dyn RandomSource) -> Option<&'a Post> {
    let mut commented: Vec<&Candidate> = candidates.iter().filter(|c| c.comment_count > 0).collect();
    match commented.len() {
        0 => None,
        1 => Some(&commented[0].post),
        n => {
            commented.sort_by(|a, b| b.comment_count.cmp(&a.comment_count));
            let pool = &commented[..n.min(top.max(1))];
            draw(pool, rng).map(|c| &c.post)
        }
    }
}

fn draw<'a, T>(items: &'a [T], rng: &dyn RandomSource) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.pick(items.len()))
}
