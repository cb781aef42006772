// crates/sync-engine/examples/sync_demo.rs
//! Demonstration of the merge engine

use summit_core::{SessionId, Timestamp, UserAction, UserDataSnapshot, VideoId};
use summit_sync_engine::MergeEngine;

fn main() {
    println!("Summit Merge Engine Demo");
    println!("========================\n");

    demo_fresh_account();
    println!();
    demo_conflict_resolution();
}

fn demo_fresh_account() {
    println!("1. First sync of a fresh account");
    println!("--------------------------------");

    let mut engine =
        MergeEngine::new(UserDataSnapshot::new(), UserDataSnapshot::new()).expect("valid snapshots");
    engine.merge_push_keys();
    engine.merge_pending_actions(&[
        UserAction::add_star(SessionId::new("keynote")).with_timestamp(Timestamp::from_millis(500)),
        UserAction::view_video(VideoId::new("intro-video")),
    ]);

    println!("Merged snapshot: {:?}", engine.merged());
    println!("Remote write-set:");
    for (path, value) in &engine.remote_write_set() {
        println!("  {} = {:?}", path, value);
    }
}

fn demo_conflict_resolution() {
    println!("2. Stale offline action loses to a newer remote star");
    println!("----------------------------------------------------");

    let mut remote = UserDataSnapshot::new();
    remote
        .starred_sessions
        .insert(SessionId::new("keynote"), Timestamp::from_millis(300));

    let mut engine =
        MergeEngine::new(UserDataSnapshot::new(), remote).expect("valid snapshots");
    engine.merge_pending_actions(&[
        // Queued at t=200 on a device that was offline; the remote star at
        // t=300 is newer, so this unstar is dropped
        UserAction::remove_star(SessionId::new("keynote"))
            .with_timestamp(Timestamp::from_millis(200)),
    ]);

    println!(
        "keynote still starred: {}",
        engine.merged().is_starred(&SessionId::new("keynote"))
    );
}
