//! Join rewriting configuration.

use serde::Deserialize;

/// Settings of the soft-delete join rewriter.
///
/// Deserializable so applications can keep it with the rest of their
/// settings; missing fields take their defaults.
///
/// ```
/// use softjoin_orm::RewriteConfig;
///
/// let config: RewriteConfig = serde_json::from_str(r#"{"strict": true}"#)?;
/// assert_eq!(config.alias_marker, Some('Z'));
/// assert!(config.strict);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteConfig {
    /// Leading marker on a table's entity name (`zusers` → `Zuser`). When the
    /// marked name does not resolve, one marker character is stripped and
    /// resolution is retried. `None` disables the retry.
    pub alias_marker: Option<char>,

    /// Fail joins whose table resolves to no model instead of joining them
    /// unfiltered.
    pub strict: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            alias_marker: Some('Z'),
            strict: false,
        }
    }
}
