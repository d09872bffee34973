use thiserror::Error;

/// Errors surfaced by the identity provider and data store clients.
///
/// Call sites degrade these aggressively: read errors (including RLS policy
/// denials) become "absent", identity errors become "unauthenticated", and
/// write errors map to a redirect code. The only variant that changes a
/// user-visible outcome is `UniqueViolation`.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode provider response: {0}")]
    Decode(String),

    /// The store rejected a write with its unique-constraint error code
    /// (`23505`). The profile-setup race between the uniqueness check and
    /// the upsert resolves through this variant.
    #[error("unique constraint violation")]
    UniqueViolation,
}

impl ProviderError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation)
    }
}
