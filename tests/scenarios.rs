//! End-to-end scenarios run against a real `BoardActor` over its async
//! `BoardHandle` API, rather than the synchronous `Board` unit tests in
//! `src/board/state.rs`.

use std::time::Duration;

use memory_scramble::board::BoardActor;
use memory_scramble::{BoardLayout, FlipError};

/// 3x3 board with four matching pairs plus one unpaired center card.
fn perfect_layout() -> BoardLayout {
    BoardLayout::parse("3x3\n🦄\n🦄\n🍭\n🍭\n🐙\n🐙\n🦀\n🦀\n🎈\n").unwrap()
}

async fn settle() {
    // Give any tasks spawned for contention or map a turn to run before the
    // next assertion; tests don't rely on exact timing, only on ordering
    // that's already guaranteed by the actor's FIFO wakeups.
    tokio::time::sleep(Duration::from_millis(5)).await;
}

#[tokio::test]
async fn scenario_1_basic_match_remove() {
    let handle = BoardActor::spawn(perfect_layout());

    handle.flip("alice", 0, 0).await.unwrap();
    handle.flip("alice", 0, 1).await.unwrap();
    handle.flip("alice", 1, 1).await.unwrap(); // completes the match, removes (0,0)/(0,1)

    let snapshot = handle.look("alice").await.unwrap();
    let lines: Vec<&str> = snapshot.lines().collect();
    assert_eq!(lines[0], "3x3");
    assert_eq!(lines[1], "none");
    assert_eq!(lines[2], "none");
    assert_eq!(lines[5], "my 🍭");
}

#[tokio::test]
async fn scenario_2_no_match_flip_down() {
    let handle = BoardActor::spawn(perfect_layout());

    handle.flip("alice", 0, 0).await.unwrap();
    // 🦄 vs 🍭: no match, but a second-card flip only fails on
    // NoCardHere/CardControlled, so this still succeeds.
    handle.flip("alice", 0, 2).await.unwrap();

    let snapshot = handle.look("bob").await.unwrap();
    assert!(snapshot.contains("up 🦄"));

    handle.flip("alice", 1, 1).await.unwrap();
    let snapshot = handle.look("bob").await.unwrap();
    let lines: Vec<&str> = snapshot.lines().collect();
    assert_eq!(lines[1], "down");
    assert_eq!(lines[3], "down");
}

#[tokio::test]
async fn scenario_3_contention_is_resolved_fifo() {
    let handle = BoardActor::spawn(perfect_layout());

    handle.flip("alice", 0, 0).await.unwrap();

    let h1 = handle.clone();
    let bob = tokio::spawn(async move { h1.flip("bob", 0, 0).await });
    settle().await;
    let h2 = handle.clone();
    let charlie = tokio::spawn(async move { h2.flip("charlie", 0, 0).await });
    settle().await;
    let h3 = handle.clone();
    let dave = tokio::spawn(async move { h3.flip("dave", 0, 0).await });
    settle().await;

    // alice's second flip is a mismatch; still succeeds, and releases
    // (0,0), waking bob.
    handle.flip("alice", 0, 2).await.unwrap();
    settle().await;
    bob.await.unwrap().unwrap();

    // bob's second flip releases (0,0) again (mismatch vs (1,0)), waking charlie.
    handle.flip("bob", 1, 0).await.unwrap();
    settle().await;
    charlie.await.unwrap().unwrap();

    handle.flip("charlie", 1, 1).await.unwrap();
    settle().await;
    dave.await.unwrap().unwrap();
}

#[tokio::test]
async fn scenario_4_second_card_on_controlled_is_immediate_failure() {
    let handle = BoardActor::spawn(perfect_layout());

    handle.flip("alice", 0, 0).await.unwrap();
    let err = handle.flip("alice", 0, 0).await.unwrap_err();
    assert!(matches!(err, FlipError::CardControlled { .. }));

    let snapshot = handle.look("bob").await.unwrap();
    assert!(snapshot.contains("up 🦄"));
}

#[tokio::test]
async fn scenario_5_removal_wakes_every_waiter() {
    let handle = BoardActor::spawn(perfect_layout());

    handle.flip("alice", 0, 0).await.unwrap();

    let h1 = handle.clone();
    let bob = tokio::spawn(async move { h1.flip("bob", 0, 0).await });
    settle().await;
    let h2 = handle.clone();
    let charlie = tokio::spawn(async move { h2.flip("charlie", 0, 0).await });
    settle().await;

    handle.flip("alice", 0, 1).await.unwrap(); // matches, queues the pending-match turn

    // alice's third flip completes the matched turn, removing (0,0)/(0,1)
    // and waking every waiter parked on (0,0).
    handle.flip("alice", 1, 0).await.unwrap();
    settle().await;

    let bob_err = bob.await.unwrap().unwrap_err();
    let charlie_err = charlie.await.unwrap().unwrap_err();
    assert!(matches!(bob_err, FlipError::NoCardHere { .. }));
    assert!(matches!(charlie_err, FlipError::NoCardHere { .. }));
}

#[tokio::test]
async fn scenario_6_map_preserves_matching_pairs() {
    let handle = BoardActor::spawn(perfect_layout());

    handle
        .map(|value| async move {
            Ok(if value == "🦄" {
                "🍭".to_string()
            } else {
                value
            })
        })
        .await
        .unwrap();

    handle.flip("bob", 0, 0).await.unwrap();
    handle.flip("bob", 0, 1).await.unwrap();

    let snapshot = handle.look("bob").await.unwrap();
    let lines: Vec<&str> = snapshot.lines().collect();
    assert_eq!(lines[1], "my 🍭");
    assert_eq!(lines[2], "my 🍭");
}

#[tokio::test]
async fn look_never_suspends_even_while_a_flip_is_pending() {
    let handle = BoardActor::spawn(perfect_layout());
    handle.flip("alice", 0, 0).await.unwrap();

    let h1 = handle.clone();
    let _pending = tokio::spawn(async move { h1.flip("bob", 0, 0).await });
    settle().await;

    let snapshot = handle.look("charlie").await.unwrap();
    assert!(snapshot.contains("up 🦄"));
}
