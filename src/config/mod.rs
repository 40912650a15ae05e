//! Configuration.
//!
//! Tiers, lowest to highest priority:
//! 1. **Defaults** - compiled in
//! 2. **Project** - `./portfolio/config.yaml`
//! 3. **User** - `~/.task-portfolio/config.yaml`
//! 4. **Environment** - `PORTFOLIO_DATA_FILE`, `PORTFOLIO_MEDIA_DIR`,
//!    `PORTFOLIO_DB_PATH`, `PORTFOLIO_PORT`
//!
//! `PORTFOLIO_CONFIG_PATH` names a single file that replaces the file tiers.
//! Command-line flags are applied on top by the binary.

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{merge_into, merge_layers};
pub use types::*;
