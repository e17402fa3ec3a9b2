//! # Listing order
//!
//! Maps the `sorted` selector of the list view onto an ordering of posts.
//! Posts must already have been through [`crate::lifecycle::evaluate`], since
//! two of the orderings key off the listing flag.

use std::cmp::{Ordering, Reverse};

use crate::models::Post;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortCriterion {
    /// Most viewed first, ties by ascending id
    RankCount,
    /// Newest first
    CreatedDate,
    /// Closed listings first, then open ones, newest first within each group
    AlreadyDone,
    /// Open listings closing soonest first, closed listings last
    AlmostDone,
    /// Storage order. Chosen for any selector we don't recognize.
    #[default]
    Natural,
}

impl SortCriterion {
    /// Lenient parse: an unknown selector falls back to [`SortCriterion::Natural`].
    pub fn parse(selector: &str) -> Self {
        match selector {
            "rank-count" => SortCriterion::RankCount,
            "created-date" => SortCriterion::CreatedDate,
            "already-done" => SortCriterion::AlreadyDone,
            "almost-done" => SortCriterion::AlmostDone,
            other => {
                tracing::debug!(selector = other, "unrecognized sort selector, using storage order");
                SortCriterion::Natural
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriterion::RankCount => "rank-count",
            SortCriterion::CreatedDate => "created-date",
            SortCriterion::AlreadyDone => "already-done",
            SortCriterion::AlmostDone => "almost-done",
            SortCriterion::Natural => "natural",
        }
    }
}

/// Orders `posts` by `criterion`. The sort is stable, so equal keys keep storage order.
pub fn sorted(mut posts: Vec<Post>, criterion: SortCriterion) -> Vec<Post> {
    match criterion {
        SortCriterion::RankCount => posts.sort_by(|a, b| b.rank_count.cmp(&a.rank_count).then(a.id.cmp(&b.id))),
        SortCriterion::CreatedDate => posts.sort_by_key(|p| Reverse(p.created_at)),
        SortCriterion::AlreadyDone => posts.sort_by(|a, b| {
            b.listing_closed
                .cmp(&a.listing_closed)
                .then(b.created_at.cmp(&a.created_at))
        }),
        SortCriterion::AlmostDone => posts.sort_by(almost_done),
        SortCriterion::Natural => {}
    }
    posts
}

fn almost_done(a: &Post, b: &Post) -> Ordering {
    match (a.listing_closed, b.listing_closed) {
        // An open listing's time remaining grows with its deadline.
        (false, false) => a.listing_deadline.cmp(&b.listing_deadline),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::post_at;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 2, 7, 12, 0, 0).unwrap()
    }

    fn ids(posts: &[Post]) -> Vec<i64> {
        posts.iter().map(|p| p.id).collect()
    }

    #[test]
    fn rank_count_breaks_ties_by_id() {
        let mut posts = vec![post_at(2, base()), post_at(1, base()), post_at(3, base())];
        posts[0].rank_count = 5;
        posts[1].rank_count = 1;
        posts[2].rank_count = 5;
        assert_eq!(ids(&sorted(posts, SortCriterion::RankCount)), vec![2, 3, 1]);
    }

    #[test]
    fn created_date_is_newest_first() {
        let posts = vec![
            post_at(1, base()),
            post_at(2, base() + Duration::hours(2)),
            post_at(3, base() + Duration::hours(1)),
        ];
        assert_eq!(ids(&sorted(posts, SortCriterion::CreatedDate)), vec![2, 3, 1]);
    }

    #[test]
    fn already_done_puts_closed_listings_first() {
        let mut posts = vec![
            post_at(1, base()),
            post_at(2, base() + Duration::hours(1)),
            post_at(3, base() + Duration::hours(2)),
            post_at(4, base() + Duration::hours(3)),
        ];
        posts[0].listing_closed = true;
        posts[2].listing_closed = true;
        assert_eq!(ids(&sorted(posts, SortCriterion::AlreadyDone)), vec![3, 1, 4, 2]);
    }

    #[test]
    fn almost_done_orders_open_listings_by_deadline() {
        let mut posts = vec![
            post_at(1, base()),
            post_at(2, base()),
            post_at(3, base()),
            post_at(4, base()),
        ];
        posts[0].listing_deadline = base() + Duration::days(3);
        posts[1].listing_closed = true;
        posts[2].listing_deadline = base() + Duration::hours(5);
        posts[3].listing_deadline = base() + Duration::days(6);
        assert_eq!(ids(&sorted(posts, SortCriterion::AlmostDone)), vec![3, 1, 4, 2]);
    }

    #[test]
    fn unknown_selector_keeps_storage_order() {
        let mut posts = vec![post_at(3, base()), post_at(1, base()), post_at(2, base())];
        posts[1].rank_count = 100;
        let criterion = SortCriterion::parse("hottest");
        assert_eq!(criterion, SortCriterion::Natural);
        assert_eq!(ids(&sorted(posts, criterion)), vec![3, 1, 2]);
    }

    #[test]
    fn selectors_round_trip_through_display() {
        for c in [
            SortCriterion::RankCount,
            SortCriterion::CreatedDate,
            SortCriterion::AlreadyDone,
            SortCriterion::AlmostDone,
        ] {
            assert_eq!(SortCriterion::parse(c.as_str()), c);
        }
    }
}
