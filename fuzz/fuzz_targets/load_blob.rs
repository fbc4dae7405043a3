#![no_main]

use libfuzzer_sys::fuzz_target;
use midan_core::invites::{INVITES_KEY, InviteState};
use midan_core::reactions::{REACTIONS_KEY, ReactionState};
use midan_core::storage::{BlobStore, MemoryBlobStore, load_blob, save_blob};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    let mut store = MemoryBlobStore::new();
    if store.set_raw(REACTIONS_KEY, raw).is_err() || store.set_raw(INVITES_KEY, raw).is_err() {
        return;
    }

    // Whatever is stored, loading never fails and a toggled state survives
    // a save/load cycle unchanged.
    let mut reactions: ReactionState = load_blob(&store, REACTIONS_KEY);
    let _: InviteState = load_blob(&store, INVITES_KEY);
    reactions.set_reaction("fuzz", "🔥");
    if save_blob(&mut store, REACTIONS_KEY, &reactions).is_err() {
        return;
    }
    let reloaded: ReactionState = load_blob(&store, REACTIONS_KEY);
    assert_eq!(reloaded, reactions);
});
