/// The fixed vocabulary of `error` query codes carried by redirects.
///
/// Every failure path in the form actions terminates in a redirect with one
/// of these codes; the receiving page maps them to localized messages. No
/// other error detail ever reaches the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectCode {
    /// Username empty or outside the [1, 50] length bounds.
    InvalidUsername,
    /// Another profile already holds the requested username.
    UsernameTaken,
    /// Any store write error without a more specific mapping.
    Unknown,
    /// Auth-code exchange or OTP dispatch failed.
    AuthFailed,
    /// Feedback form submitted with an empty subject or message.
    EmptyFields,
    /// Feedback subject exceeds 200 characters.
    SubjectTooLong,
    /// Feedback message exceeds 5000 characters.
    MessageTooLong,
}

impl RedirectCode {
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::InvalidUsername => "invalid_username",
            Self::UsernameTaken => "username_taken",
            Self::Unknown => "unknown",
            Self::AuthFailed => "auth_failed",
            Self::EmptyFields => "empty_fields",
            Self::SubjectTooLong => "subject_too_long",
            Self::MessageTooLong => "message_too_long",
        }
    }

    /// Build the redirect target for `path` carrying this code.
    pub fn target(&self, path: &str) -> String {
        format!("{}?error={}", path, self.as_code())
    }
}

impl std::fmt::Display for RedirectCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_code())
    }
}
