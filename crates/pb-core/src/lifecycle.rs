//! Deadline-driven post status.
//!
//! Nothing schedules the close of a vote or a listing. Every read path runs the
//! post through [`evaluate`] with the current time and persists whatever flipped.

use chrono::{DateTime, Utc};

use crate::models::Post;

/// Returns the post with its closed flags brought up to date for `now`.
///
/// Flags only ever go from open to closed. A deadline that is exactly `now`
/// has not passed yet.
pub fn evaluate(mut post: Post, now: DateTime<Utc>) -> Post {
    post.vote_closed = post.vote_closed || now > post.vote_deadline;
    post.listing_closed = post.listing_closed || now > post.listing_deadline;
    post
}

/// Which flags an evaluation closed, compared to the stored post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    pub vote_closed: bool,
    pub listing_closed: bool,
}

impl Transition {
    pub fn between(before: &Post, after: &Post) -> Self {
        Transition {
            vote_closed: !before.vote_closed && after.vote_closed,
            listing_closed: !before.listing_closed && after.listing_closed,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.vote_closed && !self.listing_closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::post_at;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 2, 7, 12, 0, 0).unwrap()
    }

    #[test]
    fn passed_vote_deadline_closes_voting() {
        let mut post = post_at(1, now() - Duration::days(2));
        post.vote_deadline = now() - Duration::hours(1);
        post.listing_deadline = now() + Duration::days(5);

        let evaluated = evaluate(post.clone(), now());
        assert!(evaluated.vote_closed);
        assert!(!evaluated.listing_closed);

        let again = evaluate(evaluated.clone(), now());
        assert_eq!(again, evaluated);
    }

    #[test]
    fn future_deadlines_leave_post_untouched() {
        let post = post_at(1, now());
        assert_eq!(evaluate(post.clone(), now()), post);
    }

    #[test]
    fn deadline_equal_to_now_is_still_open() {
        let mut post = post_at(1, now());
        post.vote_deadline = now();
        assert!(!evaluate(post, now()).vote_closed);
    }

    #[test]
    fn closed_flags_never_reopen() {
        let mut post = post_at(1, now());
        post.vote_closed = true;
        post.listing_closed = true;
        let evaluated = evaluate(post, now() - Duration::days(30));
        assert!(evaluated.vote_closed && evaluated.listing_closed);
    }

    #[test]
    fn listing_deadline_is_independent_of_vote_deadline() {
        // Deadlines in the "wrong" order are trusted as given.
        let mut post = post_at(1, now() - Duration::days(3));
        post.vote_deadline = now() + Duration::days(1);
        post.listing_deadline = now() - Duration::days(1);
        let evaluated = evaluate(post, now());
        assert!(!evaluated.vote_closed);
        assert!(evaluated.listing_closed);
    }

    #[test]
    fn transition_reports_only_new_flips() {
        let mut before = post_at(1, now() - Duration::days(10));
        before.vote_closed = true;
        let after = evaluate(before.clone(), now());
        let t = Transition::between(&before, &after);
        assert!(!t.vote_closed);
        assert!(t.listing_closed);
        assert!(!t.is_empty());
        assert!(Transition::between(&after, &after).is_empty());
    }
}
