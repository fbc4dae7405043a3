pub mod completions;
pub mod events;
pub mod invites;
pub mod open;
pub mod page;
pub mod react;
pub mod session;
pub mod teams;

use anyhow::Result;
use chrono::{DateTime, Utc};
use midan_core::AppState;
use midan_core::config::EffectiveConfig;
use midan_core::storage::FileBlobStore;
use midan_core::wallet::MockWallet;
use tracing::debug;

use crate::output::OutputMode;

/// What every command needs: resolved config, output mode and the clock.
#[derive(Debug)]
pub struct Context {
    pub output: OutputMode,
    pub config: EffectiveConfig,
    /// Connect the mock wallet before running the command.
    pub connect: bool,
    pub now: DateTime<Utc>,
}

impl Context {
    /// Start a session backed by the blob store in the resolved data dir.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn open_app(&self) -> Result<AppState> {
        let store = FileBlobStore::open(&self.config.data_dir)?;
        let wallet = MockWallet::new(self.config.config.wallet_seed());
        let mut app = AppState::new(self.now, Box::new(store), Box::new(wallet))
            .with_default_sort(self.config.config.default_sort());
        debug!(data_dir = %self.config.data_dir.display(), "blob store opened");
        if self.connect {
            app.connect();
        }
        Ok(app)
    }
}
