/// Classification for fallback policy.
///
/// Used by the provider chain to decide whether a failed provider should be
/// replaced by the next one in line.
///
/// # Behavior Summary
///
/// | Class | Try Next Provider? |
/// |-------|-------------------|
/// | `Never` | No |
/// | `NextProvider` | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - the request itself is invalid or the chain is exhausted.
    Never,

    /// Try the next provider in the chain.
    ///
    /// Used for upstream failures (HTTP errors, expired sessions, empty
    /// payloads, timeouts) that a different endpoint may not share.
    NextProvider,
}
