//! Error types for GitHub client operations.
//!
//! This module defines the error types that can occur when interacting with the GitHub API
//! through the github_client crate. Callers branch on the variants rather than on the
//! rendered messages, in particular on [`Error::BranchNotFound`] which drives the
//! create-then-protect path of branch protection.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match client.protect_branch("owner", "repo", "develop", &request).await {
///     Ok(()) => println!("protected"),
///     Err(Error::BranchNotFound { branch }) => println!("{branch} must be created first"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A generic API request failure.
    ///
    /// This error occurs when a GitHub API request fails for unspecified reasons.
    #[error("API request failed")]
    ApiError(),

    /// Authentication or GitHub client initialization failure.
    #[error("Failed to authenticate or initialize GitHub client: {0}")]
    AuthError(String),

    /// GitHub rejected the request as malformed (HTTP 400 or 422).
    #[error("GitHub rejected the request: {0}")]
    BadRequest(String),

    /// The branch addressed by a branch-scoped call does not exist.
    ///
    /// Branch protection, unprotection and branch lookups map an HTTP 404 to this
    /// variant so that callers can create the branch and retry.
    #[error("Branch not found: {branch}")]
    BranchNotFound { branch: String },

    /// Error deserializing the response from GitHub.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The GitHub API returned a response in an unexpected format, or failed with a
    /// status that has no more specific variant.
    #[error("Invalid response format")]
    InvalidResponse,

    /// The requested resource was not found.
    #[error("Resource not found")]
    NotFound,

    /// GitHub API rate limit has been exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl Error {
    /// Returns `true` when the error signals a missing branch.
    pub fn is_branch_not_found(&self) -> bool {
        matches!(self, Error::BranchNotFound { .. })
    }
}
