#![no_main]

use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use midan_core::AppState;
use midan_core::router::{Location, Route, route};
use midan_core::storage::MemoryBlobStore;
use midan_core::wallet::MockWallet;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    let location = Location::parse(raw);
    assert!(location.path.starts_with('/'));
    if let Route::Redirect { to } = route(&location) {
        assert!(matches!(route(&Location::parse(to)), Route::Events { .. }));
    }

    let Some(now) = Utc.timestamp_opt(1_750_000_000, 0).single() else {
        return;
    };
    let mut app = AppState::new(
        now,
        Box::new(MemoryBlobStore::new()),
        Box::new(MockWallet::default()),
    );
    let page = app.open(raw, now);
    assert!(!page.title.is_empty());
    let _ = serde_json::to_string(&page);
});
