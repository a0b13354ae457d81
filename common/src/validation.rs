// Request validators
//
// Every validator collects all failing fields instead of stopping at the
// first one, so the front end can flag each input at once.

use crate::errors::{FieldError, ValidationError};
use crate::models::{
    AnnouncementInput, AnnouncementUpdate, CredentialsInput, DemoInput, DemoUpdate, GroupInput,
    MembershipRequestInput, MusicianInput, SessionAccount,
};
use regex::Regex;

pub const MIN_USERNAME_LEN: usize = 5;
pub const MAX_USERNAME_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 6;
/// bcrypt only hashes the first 72 bytes of a password
pub const MAX_PASSWORD_BYTES: usize = 72;
pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_TEXT_LEN: usize = 2000;
pub const MIN_AGE: i32 = 1;
pub const MAX_AGE: i32 = 120;

pub const IMAGES_PUBLIC_PREFIX: &str = "/media/images/";
pub const DEMOS_PUBLIC_PREFIX: &str = "/media/demos/";

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email regex is valid");
}

/// Accumulates field errors for one payload
#[derive(Debug, Default)]
struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.fail(field, format!("{} is required", field));
        }
    }

    fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.fail(field, format!("{} must be at most {} characters long", field, max));
        }
    }

    fn optional_max_len(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            self.max_len(field, value, max);
        }
    }

    fn picture_path(&mut self, value: Option<&str>, owner: &SessionAccount) {
        if let Some(path) = value {
            if !is_media_path(path, IMAGES_PUBLIC_PREFIX) {
                self.fail(
                    "profilePicturePath",
                    format!("profilePicturePath must point inside {}", IMAGES_PUBLIC_PREFIX),
                );
            } else if !is_uploaded_by(&path[IMAGES_PUBLIC_PREFIX.len()..], owner) {
                self.fail(
                    "profilePicturePath",
                    "profilePicturePath must reference a picture uploaded by this profile",
                );
            }
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(self.errors))
        }
    }
}

/// Returns true when `value` looks like an email address
pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// A public media path must sit directly inside `prefix` and must not escape it
fn is_media_path(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(name) => !name.is_empty() && !name.contains('/') && !name.contains(".."),
        None => false,
    }
}

/// Uploaded file names start with the uploader's `M<id>_` / `G<id>_` prefix
fn is_uploaded_by(file_name: &str, owner: &SessionAccount) -> bool {
    file_name.starts_with(&format!("{}_", owner.upload_prefix()))
}

/// Signup and login: the username must be long enough or be an email
pub fn validate_credentials(input: &CredentialsInput) -> Result<(), ValidationError> {
    let mut checks = Checks::default();

    let username = input.username.trim();
    if username.chars().count() < MIN_USERNAME_LEN && !is_email(username) {
        checks.fail(
            "username",
            format!(
                "username must have a length of at least {} characters or be a valid email",
                MIN_USERNAME_LEN
            ),
        );
    }
    checks.max_len("username", username, MAX_USERNAME_LEN);

    if input.password.chars().count() < MIN_PASSWORD_LEN {
        checks.fail(
            "password",
            format!("password must be at least {} characters long", MIN_PASSWORD_LEN),
        );
    } else if input.password.len() > MAX_PASSWORD_BYTES {
        checks.fail(
            "password",
            format!("password must be at most {} bytes long", MAX_PASSWORD_BYTES),
        );
    }

    checks.finish()
}

/// A profile may only show a picture its own account uploaded
pub fn validate_musician(
    input: &MusicianInput,
    owner: &SessionAccount,
) -> Result<(), ValidationError> {
    let mut checks = Checks::default();

    checks.required("name", &input.name);
    checks.max_len("name", &input.name, MAX_TITLE_LEN);
    checks.required("surname", &input.surname);
    checks.max_len("surname", &input.surname, MAX_TITLE_LEN);
    checks.required("city", &input.city);
    checks.max_len("city", &input.city, MAX_TITLE_LEN);
    checks.required("province", &input.province);
    checks.max_len("province", &input.province, MAX_TITLE_LEN);

    if let Some(age) = input.age {
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            checks.fail("age", format!("age must be between {} and {}", MIN_AGE, MAX_AGE));
        }
    }

    checks.optional_max_len("contacts", input.contacts.as_deref(), MAX_TEXT_LEN);
    checks.optional_max_len("musicalTastes", input.musical_tastes.as_deref(), MAX_TEXT_LEN);
    checks.optional_max_len("instruments", input.instruments.as_deref(), MAX_TEXT_LEN);
    checks.optional_max_len("description", input.description.as_deref(), MAX_TEXT_LEN);
    checks.optional_max_len(
        "availableLocations",
        input.available_locations.as_deref(),
        MAX_TEXT_LEN,
    );
    checks.picture_path(input.profile_picture_path.as_deref(), owner);

    checks.finish()
}

pub fn validate_group(input: &GroupInput, owner: &SessionAccount) -> Result<(), ValidationError> {
    let mut checks = Checks::default();

    checks.required("name", &input.name);
    checks.max_len("name", &input.name, MAX_TITLE_LEN);
    checks.required("city", &input.city);
    checks.max_len("city", &input.city, MAX_TITLE_LEN);
    checks.required("province", &input.province);
    checks.max_len("province", &input.province, MAX_TITLE_LEN);

    checks.optional_max_len("contacts", input.contacts.as_deref(), MAX_TEXT_LEN);
    checks.optional_max_len("musicalGenres", input.musical_genres.as_deref(), MAX_TEXT_LEN);
    checks.optional_max_len("musiciansList", input.musicians_list.as_deref(), MAX_TEXT_LEN);
    checks.optional_max_len("description", input.description.as_deref(), MAX_TEXT_LEN);
    checks.optional_max_len("timeTable", input.time_table.as_deref(), MAX_TEXT_LEN);
    checks.optional_max_len(
        "availableLocations",
        input.available_locations.as_deref(),
        MAX_TEXT_LEN,
    );
    checks.picture_path(input.profile_picture_path.as_deref(), owner);

    checks.finish()
}

fn check_announcement_text(
    checks: &mut Checks,
    title: &str,
    description: Option<&str>,
    city: &str,
    province: &str,
) {
    checks.required("title", title);
    checks.max_len("title", title, MAX_TITLE_LEN);
    checks.optional_max_len("description", description, MAX_TEXT_LEN);
    checks.required("city", city);
    checks.max_len("city", city, MAX_TITLE_LEN);
    checks.required("province", province);
    checks.max_len("province", province, MAX_TITLE_LEN);
}

pub fn validate_announcement(input: &AnnouncementInput) -> Result<(), ValidationError> {
    let mut checks = Checks::default();
    check_announcement_text(
        &mut checks,
        &input.title,
        input.description.as_deref(),
        &input.city,
        &input.province,
    );
    checks.finish()
}

pub fn validate_announcement_update(input: &AnnouncementUpdate) -> Result<(), ValidationError> {
    let mut checks = Checks::default();
    check_announcement_text(
        &mut checks,
        &input.title,
        input.description.as_deref(),
        &input.city,
        &input.province,
    );
    checks.finish()
}

/// A demo may only reference a file the author uploaded
pub fn validate_demo(input: &DemoInput, author: &SessionAccount) -> Result<(), ValidationError> {
    let mut checks = Checks::default();

    checks.required("title", &input.title);
    checks.max_len("title", &input.title, MAX_TITLE_LEN);
    checks.optional_max_len("description", input.description.as_deref(), MAX_TEXT_LEN);

    if !is_media_path(&input.file_path, DEMOS_PUBLIC_PREFIX) {
        checks.fail(
            "filePath",
            format!("filePath must point inside {}", DEMOS_PUBLIC_PREFIX),
        );
    } else {
        let file_name = &input.file_path[DEMOS_PUBLIC_PREFIX.len()..];
        if !is_uploaded_by(file_name, author) {
            checks.fail("filePath", "filePath must reference a file uploaded by this profile");
        }
    }

    checks.finish()
}

pub fn validate_demo_update(input: &DemoUpdate) -> Result<(), ValidationError> {
    let mut checks = Checks::default();
    checks.required("title", &input.title);
    checks.max_len("title", &input.title, MAX_TITLE_LEN);
    checks.optional_max_len("description", input.description.as_deref(), MAX_TEXT_LEN);
    checks.finish()
}

pub fn validate_membership_request(input: &MembershipRequestInput) -> Result<(), ValidationError> {
    let mut checks = Checks::default();
    checks.optional_max_len("description", input.description.as_deref(), MAX_TEXT_LEN);
    checks.finish()
}
