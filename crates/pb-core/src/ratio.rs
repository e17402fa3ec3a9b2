//! Permit/reject percentages.
//!
//! Each side is rounded independently with round-half-to-even, so the pair
//! does not always add up to 100 (e.g. 1 permit, 2 rejects gives 33/67,
//! 1 permit, 5 rejects gives 17/83, 1 permit, 7 rejects gives 12/88).

use serde::Serialize;

use crate::models::Post;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct VoteRatio {
    pub permit: u8,
    pub reject: u8,
}

impl VoteRatio {
    pub fn of(post: &Post) -> Self {
        ratio(post.permit_count, post.reject_count)
    }

    /// Both sides have votes and sit within `margin` points of each other.
    pub fn is_neck_and_neck(&self, margin: u8) -> bool {
        self.permit != 0 && self.reject != 0 && self.permit.abs_diff(self.reject) <= margin
    }
}

/// Computes the percentage pair. With no votes at all both sides are 0.
pub fn ratio(permit: u32, reject: u32) -> VoteRatio {
    let total = u64::from(permit) + u64::from(reject);
    if total == 0 {
        return VoteRatio::default();
    }
    VoteRatio {
        permit: percent(u64::from(permit), total),
        reject: percent(u64::from(reject), total),
    }
}

fn percent(part: u64, total: u64) -> u8 {
    let scaled = part * 100;
    let mut pct = scaled / total;
    let twice_rem = (scaled % total) * 2;
    if twice_rem > total || (twice_rem == total && pct % 2 == 1) {
        pct += 1;
    }
    // part <= total, so pct <= 100
    pct as u8
}
