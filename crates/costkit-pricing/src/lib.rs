pub mod live;
pub mod store;

pub use live::*;
pub use store::*;

use std::path::PathBuf;

/// Resolve the default pricing database location: `~/.costkit/pricing.json`.
pub fn default_db_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".costkit").join("pricing.json"))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
