/// Effective API key resolution and display masking.
use tracing::debug;

use super::store::ConfigStore;

/// Resolve the API key to use for a request.
///
/// A non-empty `override_key` (the `--api-key` flag) wins without touching
/// storage; otherwise the key comes from [`ConfigStore::load`]. Returns
/// `None` when nothing is configured; callers report that to the user.
#[must_use]
pub fn resolve_api_key(override_key: Option<&str>, store: &ConfigStore) -> Option<String> {
    if let Some(key) = override_key.filter(|k| !k.is_empty()) {
        debug!("using API key from command line");
        return Some(key.to_owned());
    }
    let config = store.load();
    debug!(source = %config.source, found = config.api_key.is_some(), "resolved stored API key");
    config.api_key
}

/// Mask a key for display: first and last four characters, middle elided.
///
/// Keys of eight characters or fewer are hidden entirely.
#[must_use]
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "***".to_owned();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
