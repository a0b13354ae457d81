// Property-based tests for request validation

use common::models::{AccountKind, CredentialsInput, DemoInput, MusicianInput, SessionAccount};
use common::validation::{
    is_email, validate_credentials, validate_demo, validate_musician, MAX_AGE, MAX_PASSWORD_BYTES,
    MAX_USERNAME_LEN, MIN_AGE, MIN_PASSWORD_LEN, MIN_USERNAME_LEN,
};
use proptest::prelude::*;
use uuid::Uuid;

fn musician_input() -> MusicianInput {
    MusicianInput {
        name: "Giulia".to_string(),
        surname: "Bianchi".to_string(),
        city: "Torino".to_string(),
        province: "TO".to_string(),
        ..Default::default()
    }
}

// Username rule
// A username is accepted exactly when it is long enough or is an email.
#[test]
fn property_username_length_or_email() {
    proptest!(|(username in "[a-z0-9.@]{0,12}")| {
        let input = CredentialsInput {
            username: username.clone(),
            password: "a-valid-password".to_string(),
        };

        let expected_ok = username.chars().count() >= MIN_USERNAME_LEN || is_email(&username);
        prop_assert_eq!(validate_credentials(&input).is_ok(), expected_ok);
    });
}

// Password rule
// Passwords shorter than the minimum are always rejected on the password field.
#[test]
fn property_password_minimum_length() {
    proptest!(|(password in ".{0,12}")| {
        let input = CredentialsInput {
            username: "guitarist".to_string(),
            password: password.clone(),
        };

        let result = validate_credentials(&input);
        if password.chars().count() < MIN_PASSWORD_LEN {
            let err = result.expect_err("short password accepted");
            prop_assert!(err.has_field("password"));
            prop_assert!(!err.has_field("username"));
        } else {
            prop_assert!(result.is_ok());
        }
    });
}

// Username upper bound
// Usernames longer than the credentials column are rejected, never truncated.
#[test]
fn property_username_maximum_length() {
    proptest!(|(len in (MAX_USERNAME_LEN - 5)..(MAX_USERNAME_LEN + 5))| {
        let input = CredentialsInput {
            username: "u".repeat(len),
            password: "a-valid-password".to_string(),
        };

        let result = validate_credentials(&input);
        if len > MAX_USERNAME_LEN {
            prop_assert!(result.expect_err("long username accepted").has_field("username"));
        } else {
            prop_assert!(result.is_ok());
        }
    });
}

// Password upper bound
// bcrypt ignores everything past 72 bytes, so longer passwords are refused.
// The bound counts bytes: multi-byte characters reach it sooner.
#[test]
fn property_password_maximum_bytes() {
    proptest!(|(
        ascii in 60usize..80,
        accented in 0usize..10,
    )| {
        let password = format!("{}{}", "x".repeat(ascii), "é".repeat(accented));
        let input = CredentialsInput {
            username: "guitarist".to_string(),
            password: password.clone(),
        };

        let result = validate_credentials(&input);
        if password.len() > MAX_PASSWORD_BYTES {
            prop_assert!(result.expect_err("long password accepted").has_field("password"));
        } else {
            prop_assert!(result.is_ok());
        }
    });
}

// Age range
// Only ages within the accepted range pass validation.
#[test]
fn property_age_range() {
    proptest!(|(age in -50i32..200)| {
        let input = MusicianInput {
            age: Some(age),
            ..musician_input()
        };

        let owner = SessionAccount {
            profile_id: Uuid::new_v4(),
            username: "bassplayer".to_string(),
            kind: AccountKind::Musician,
        };

        let in_range = (MIN_AGE..=MAX_AGE).contains(&age);
        prop_assert_eq!(validate_musician(&input, &owner).is_ok(), in_range);
    });
}

// Demo ownership
// A demo can only reference a file carrying the author's upload prefix.
#[test]
fn property_demo_file_must_belong_to_author() {
    proptest!(|(
        file_name in "[A-Za-z0-9_-]{1,20}\\.mp3",
        own in any::<bool>(),
    )| {
        let author = SessionAccount {
            profile_id: Uuid::new_v4(),
            username: "songwriter".to_string(),
            kind: AccountKind::Musician,
        };
        let uploader = if own {
            author.clone()
        } else {
            SessionAccount { profile_id: Uuid::new_v4(), ..author.clone() }
        };

        let input = DemoInput {
            title: "Rehearsal".to_string(),
            description: None,
            file_path: format!("/media/demos/{}_{}", uploader.upload_prefix(), file_name),
        };

        prop_assert_eq!(validate_demo(&input, &author).is_ok(), own);
    });
}
