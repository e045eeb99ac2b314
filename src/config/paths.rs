//! Canonical paths for podcastr state.
//!
//! Single source of truth - import this instead of hardcoding paths.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use podcastr::config::{self, paths};
//!
//! let home = &config::config()?.home;
//! let cache = paths::voice_cache(home);
//! let previews = paths::previews_dir(home);
//! ```
//!
//! ## Layout
//!
//! ```text
//! ~/.podcastr/
//! ├── rapidapi-voices.json   # Persisted voice catalog
//! └── previews/              # Local previews for media without a durable URL
//! ```

use std::path::{Path, PathBuf};

/// File name of the persisted voice catalog
pub const VOICE_CACHE_FILE: &str = "rapidapi-voices.json";

/// Directory name for local media previews
pub const PREVIEWS_DIR: &str = "previews";

/// Voice catalog cache file (`<home>/rapidapi-voices.json`)
pub fn voice_cache(home: &Path) -> PathBuf {
    home.join(VOICE_CACHE_FILE)
}

/// Preview directory (`<home>/previews/`)
pub fn previews_dir(home: &Path) -> PathBuf {
    home.join(PREVIEWS_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_under_home() {
        let home = PathBuf::from("/tmp/podcastr-home");
        assert_eq!(
            voice_cache(&home),
            PathBuf::from("/tmp/podcastr-home/rapidapi-voices.json")
        );
        assert_eq!(
            previews_dir(&home),
            PathBuf::from("/tmp/podcastr-home/previews")
        );
    }
}
