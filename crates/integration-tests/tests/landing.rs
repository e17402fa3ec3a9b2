mod common;

use common::{board, board_with_rng, fields};
use pb_core::testing::ScriptedRandom;
use pb_core::{LandingLabel, VoteType};

#[tokio::test]
async fn no_posts_means_no_landing() {
    let b = board();
    assert!(b.catalog.landing().await.unwrap().is_empty());
}

#[tokio::test]
async fn unconditional_slots_always_filled() {
    let b = board();
    b.catalog.create(1, fields("only")).await.unwrap();

    let landing = b.catalog.landing().await.unwrap();
    assert_eq!(landing.len(), 3);
    for label in [LandingLabel::HotPost, LandingLabel::BelovedPost, LandingLabel::RecommendPost] {
        assert_eq!(landing[&label].post.title, "only");
    }
    assert!(!landing.contains_key(&LandingLabel::BestResponsePost));
    assert!(!landing.contains_key(&LandingLabel::NeckAndNeckPost));
}

#[tokio::test]
async fn single_commented_post_wins_best_response() {
    let b = board();
    b.catalog.create(1, fields("quiet")).await.unwrap();
    let talked = b.catalog.create(1, fields("talked")).await.unwrap();
    b.store.add_comment(talked.id);

    let landing = b.catalog.landing().await.unwrap();
    assert_eq!(landing[&LandingLabel::BestResponsePost].post.id, talked.id);
}

#[tokio::test]
async fn best_response_draws_from_most_commented() {
    // three unconditional draws, then the best-response draw picks index 1
    let b = board_with_rng(ScriptedRandom::new([0, 0, 0, 1]));
    let mut ids = Vec::new();
    for (title, comments) in [("a", 1), ("b", 3), ("c", 2)] {
        let post = b.catalog.create(1, fields(title)).await.unwrap();
        for _ in 0..comments {
            b.store.add_comment(post.id);
        }
        ids.push(post.id);
    }

    let landing = b.catalog.landing().await.unwrap();
    // ranked by comments: b, c, a
    assert_eq!(landing[&LandingLabel::BestResponsePost].post.id, ids[2]);
}

#[tokio::test]
async fn close_race_fills_neck_and_neck() {
    let b = board();
    let tight = b.catalog.create(1, fields("tight")).await.unwrap();
    let lopsided = b.catalog.create(1, fields("lopsided")).await.unwrap();
    for voter in 10..20 {
        let result = if voter % 2 == 0 { VoteType::Permit } else { VoteType::Reject };
        b.catalog.vote(tight.id, voter, result).await.unwrap();
    }
    for voter in 10..14 {
        b.catalog.vote(lopsided.id, voter, VoteType::Permit).await.unwrap();
    }

    let landing = b.catalog.landing().await.unwrap();
    let slot = &landing[&LandingLabel::NeckAndNeckPost];
    assert_eq!(slot.post.id, tight.id);
    assert_eq!((slot.ratio.permit, slot.ratio.reject), (50, 50));
}

#[tokio::test]
async fn unvoted_posts_are_never_neck_and_neck() {
    let b = board();
    b.catalog.create(1, fields("fresh")).await.unwrap();

    let landing = b.catalog.landing().await.unwrap();
    assert!(!landing.contains_key(&LandingLabel::NeckAndNeckPost));
}
