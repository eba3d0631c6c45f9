//! Unmarshal configuration options.

/// Duplicate key handling policy for mappings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicateKeyPolicy {
    /// Record a `duplicate-key` validation error; the first pair wins.
    Error,
    /// First key wins: later duplicate pairs are dropped silently.
    FirstWins,
    /// Last key wins: later duplicate pairs replace earlier ones in place.
    LastWins,
}

/// Limits applied to alias replay to harden against alias bombs.
#[derive(Clone, Copy, Debug)]
pub struct AliasLimits {
    /// Maximum total number of nodes materialized from aliases across the
    /// entire parse. When exceeded, unmarshalling fails fatally.
    pub max_total_replayed_nodes: usize,
    /// Maximum depth of nested alias expansion (alias whose anchor body
    /// itself contains an alias, and so on).
    pub max_replay_depth: usize,
}

impl Default for AliasLimits {
    fn default() -> Self {
        Self {
            max_total_replayed_nodes: 1_000_000,
            max_replay_depth: 64,
        }
    }
}

/// Parser configuration options.
///
/// Use this to skip content validation (shape errors are still reported),
/// change the duplicate-key policy, or adjust alias hardening limits.
///
/// Example: parse while tolerating duplicate keys.
///
/// ```rust
/// use swagger_saphyr::{DuplicateKeyPolicy, Options};
///
/// let options = Options {
///     duplicate_keys: DuplicateKeyPolicy::LastWins,
///     ..Options::default()
/// };
/// let yaml = "swagger: \"2.0\"\ninfo:\n  title: T\n  version: \"1\"\npaths: {}\n";
/// let (doc, errors) = swagger_saphyr::unmarshal_with_options(yaml, options).unwrap();
/// assert!(errors.is_empty());
/// assert_eq!(doc.swagger(), "2.0");
/// ```
#[derive(Clone, Debug)]
pub struct Options {
    /// Skip the semantic validation pass. Structural (shape) errors found
    /// while unmarshalling are still collected.
    pub skip_validation: bool,
    /// Policy for duplicate mapping keys.
    pub duplicate_keys: DuplicateKeyPolicy,
    /// Limits for alias replay to harden against alias bombs.
    pub alias_limits: AliasLimits,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            skip_validation: false,
            duplicate_keys: DuplicateKeyPolicy::Error,
            alias_limits: AliasLimits::default(),
        }
    }
}
