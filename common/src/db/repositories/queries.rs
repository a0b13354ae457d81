// SQL query constants for repositories
// Centralizes repeated SELECT column lists

/// SQL query fragments for the credentials table
pub mod credentials_queries {
    pub const SELECT_ALL_COLUMNS: &str = "profile_id, username, password_hash, kind, session_version, created_at";
}

/// SQL query fragments for the musicians table
pub mod musician_queries {
    pub const SELECT_ALL_COLUMNS: &str = r#"profile_id, name, surname, age, city, province,
        contacts, musical_tastes, instruments, description,
        available_for_hire, available_locations, profile_picture_path,
        created_at, updated_at"#;
}

/// SQL query fragments for the music_groups table
pub mod group_queries {
    pub const SELECT_ALL_COLUMNS: &str = r#"profile_id, name, city, province,
        contacts, musical_genres, musicians_list, description, time_table,
        available_for_hire, available_locations, profile_picture_path,
        created_at, updated_at"#;
}

/// SQL query fragments for the announcements table
pub mod announcement_queries {
    pub const SELECT_ALL_COLUMNS: &str = r#"id, author_id, author_kind, announcement_type,
        title, description, city, province, published_at, updated_at"#;
}

/// SQL query fragments for the demos table
pub mod demo_queries {
    pub const SELECT_ALL_COLUMNS: &str =
        "id, author_id, author_kind, title, description, file_path, published_at";
}

/// SQL query fragments for the membership_requests table
pub mod membership_request_queries {
    pub const SELECT_ALL_COLUMNS: &str = "id, musician_id, group_id, description, published_at";
}

/// Escape `%`, `_` and `\` so user text is matched literally inside ILIKE
pub fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
