/// Integration-level tests for the `shared` crate.
///
/// Each section tests one module; unit tests that are tightly coupled to
/// private helpers live inside the modules themselves (see `#[cfg(test)]`
/// blocks in `slug.rs` and `config.rs`).
// ---------------------------------------------------------------------------
// Profile types
// ---------------------------------------------------------------------------
#[cfg(test)]
mod profile_tests {
    use shared::types::*;
    use uuid::Uuid;

    fn sample_profile() -> Profile {
        Profile {
            id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            username: Some("aslan".to_string()),
            email: Some("aslan@example.com".to_string()),
        }
    }

    #[test]
    fn profile_serializes_and_deserializes_roundtrip() {
        let p = sample_profile();
        let json = serde_json::to_string(&p).unwrap();
        let back: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn profile_with_null_username_deserializes() {
        let json = r#"{"id":"550e8400-e29b-41d4-a716-446655440000","username":null,"email":null}"#;
        let p: Profile = serde_json::from_str(json).unwrap();
        assert!(p.username.is_none());
        assert!(!p.has_username());
    }

    #[test]
    fn identity_json_contains_expected_keys() {
        let identity = Identity {
            id: Uuid::new_v4(),
            email: Some("user@example.com".to_string()),
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert!(json.get("id").is_some());
        assert!(json.get("email").is_some());
    }

    #[test]
    fn session_tokens_roundtrip() {
        let t = SessionTokens {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
        };
        let json = serde_json::to_string(&t).unwrap();
        let back: SessionTokens = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[cfg(test)]
mod content_tests {
    use shared::types::*;
    use uuid::Uuid;

    #[test]
    fn news_row_from_store_json_deserializes() {
        // Shape matches what the REST gateway returns for the news table.
        // Double-hash delimiters: the markdown body contains `"#`.
        let json = r##"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "slug": "novosti-sela",
            "title": "Новости села",
            "excerpt": null,
            "body_markdown": "# Заголовок",
            "cover_image_path": null,
            "published_at": "2026-01-15T10:00:00Z"
        }"##;
        let item: NewsItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.slug, "novosti-sela");
        assert!(item.is_published());
    }

    #[test]
    fn draft_news_has_null_published_at() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "slug": "draft",
            "title": "Draft",
            "published_at": null
        }"#;
        let item: NewsItem = serde_json::from_str(json).unwrap();
        assert!(!item.is_published());
    }

    #[test]
    fn new_feedback_enters_queue_as_new() {
        let f = NewFeedback::new(Uuid::new_v4(), "s".to_string(), "m".to_string());
        assert_eq!(f.status, "new");
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["status"], "new");
    }

    #[test]
    fn new_comment_serializes_entity_fields() {
        let c = NewComment {
            entity_type: "news".to_string(),
            entity_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            body: "хорошая новость".to_string(),
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["entity_type"], "news");
        assert!(json.get("entity_id").is_some());
        assert!(json.get("author_id").is_some());
    }
}

// ---------------------------------------------------------------------------
// Redirect codes
// ---------------------------------------------------------------------------

#[cfg(test)]
mod redirect_tests {
    use shared::types::RedirectCode;

    #[test]
    fn all_codes_are_snake_case_ascii() {
        let codes = [
            RedirectCode::InvalidUsername,
            RedirectCode::UsernameTaken,
            RedirectCode::Unknown,
            RedirectCode::AuthFailed,
            RedirectCode::EmptyFields,
            RedirectCode::SubjectTooLong,
            RedirectCode::MessageTooLong,
        ];
        for code in codes {
            assert!(
                code.as_code()
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c == '_'),
                "unexpected character in {}",
                code
            );
        }
    }

    #[test]
    fn display_matches_as_code() {
        assert_eq!(
            RedirectCode::InvalidUsername.to_string(),
            RedirectCode::InvalidUsername.as_code()
        );
    }
}

// ---------------------------------------------------------------------------
// Slug
// ---------------------------------------------------------------------------

#[cfg(test)]
mod slug_tests {
    use shared::slug::slugify;

    #[test]
    fn mixed_script_title_produces_clean_slug() {
        assert_eq!(slugify("Парк Али-Юрт 2026"), "park-ali-yurt-2026");
    }

    #[test]
    fn slug_is_idempotent() {
        let once = slugify("Сельская ярмарка");
        assert_eq!(slugify(&once), once);
    }
}
