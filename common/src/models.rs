use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Accounts
// ============================================================================

/// The two parallel account kinds; each has its own credentials namespace
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    Musician,
    Group,
}

impl AccountKind {
    /// Letter prepended to the profile id when naming uploaded files
    pub fn upload_prefix(&self) -> char {
        match self {
            AccountKind::Musician => 'M',
            AccountKind::Group => 'G',
        }
    }

    /// Human-readable name used in response messages
    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Musician => "Musician",
            AccountKind::Group => "Group",
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountKind::Musician => write!(f, "MUSICIAN"),
            AccountKind::Group => write!(f, "GROUP"),
        }
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MUSICIAN" => Ok(AccountKind::Musician),
            "GROUP" => Ok(AccountKind::Group),
            _ => Err(format!("Invalid account kind: {}", s)),
        }
    }
}

impl TryFrom<String> for AccountKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_str(&s)
    }
}

/// Login credentials of a profile; the profile id is minted at signup
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub profile_id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub kind: AccountKind,
    /// Bumped on logout; tokens carrying an older value are rejected
    #[serde(skip_serializing, default)]
    pub session_version: i32,
    pub created_at: DateTime<Utc>,
}

/// The authenticated principal attached to a request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionAccount {
    pub profile_id: Uuid,
    pub username: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
}

impl SessionAccount {
    /// Whether this account authored a row owned by `author_id`
    pub fn owns(&self, author_id: Uuid) -> bool {
        self.profile_id == author_id
    }

    /// `M<id>` / `G<id>`, the prefix of every file this account uploads
    pub fn upload_prefix(&self) -> String {
        format!("{}{}", self.kind.upload_prefix(), self.profile_id)
    }
}

impl From<Credentials> for SessionAccount {
    fn from(credentials: Credentials) -> Self {
        Self {
            profile_id: credentials.profile_id,
            username: credentials.username,
            kind: credentials.kind,
        }
    }
}

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,       // Subject (profile ID)
    pub username: String,  // Username
    pub kind: AccountKind, // Account kind
    pub ver: i32,          // Session version of the credentials row
    pub exp: i64,          // Expiration time (Unix timestamp)
    pub iat: i64,          // Issued at (Unix timestamp)
}

// ============================================================================
// Profiles
// ============================================================================

/// Musician profile
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Musician {
    pub profile_id: Uuid,
    pub name: String,
    pub surname: String,
    pub age: Option<i32>,
    pub city: String,
    pub province: String,
    pub contacts: Option<String>,
    pub musical_tastes: Option<String>,
    pub instruments: Option<String>,
    pub description: Option<String>,
    pub available_for_hire: bool,
    pub available_locations: Option<String>,
    pub profile_picture_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Group (band) profile
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub profile_id: Uuid,
    pub name: String,
    pub city: String,
    pub province: String,
    pub contacts: Option<String>,
    pub musical_genres: Option<String>,
    pub musicians_list: Option<String>,
    pub description: Option<String>,
    pub time_table: Option<String>,
    pub available_for_hire: bool,
    pub available_locations: Option<String>,
    pub profile_picture_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Announcements
// ============================================================================

/// Kind of classified post
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AnnouncementType {
    #[serde(rename = "EVENT")]
    Event,
    /// A group searching for members
    #[serde(rename = "G_SEARCH_M")]
    GroupSearchingMusicians,
    /// A musician searching for other musicians
    #[serde(rename = "M_SEARCH_M")]
    MusicianSearchingMusicians,
    /// A musician wanting to found a group
    #[serde(rename = "G_CREATION")]
    GroupCreation,
}

impl std::fmt::Display for AnnouncementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnouncementType::Event => write!(f, "EVENT"),
            AnnouncementType::GroupSearchingMusicians => write!(f, "G_SEARCH_M"),
            AnnouncementType::MusicianSearchingMusicians => write!(f, "M_SEARCH_M"),
            AnnouncementType::GroupCreation => write!(f, "G_CREATION"),
        }
    }
}

impl FromStr for AnnouncementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EVENT" => Ok(AnnouncementType::Event),
            "G_SEARCH_M" => Ok(AnnouncementType::GroupSearchingMusicians),
            "M_SEARCH_M" => Ok(AnnouncementType::MusicianSearchingMusicians),
            "G_CREATION" => Ok(AnnouncementType::GroupCreation),
            _ => Err(format!("Invalid announcement type: {}", s)),
        }
    }
}

impl TryFrom<String> for AnnouncementType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_str(&s)
    }
}

/// Classified post published by a profile
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: Uuid,
    pub author_id: Uuid,
    #[sqlx(try_from = "String")]
    #[serde(rename = "authorType")]
    pub author_kind: AccountKind,
    #[sqlx(try_from = "String")]
    pub announcement_type: AnnouncementType,
    pub title: String,
    pub description: Option<String>,
    pub city: String,
    pub province: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Demos
// ============================================================================

/// Uploaded audio sample with its metadata
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DemoFile {
    pub id: Uuid,
    pub author_id: Uuid,
    #[sqlx(try_from = "String")]
    #[serde(rename = "authorType")]
    pub author_kind: AccountKind,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub published_at: DateTime<Utc>,
}

// ============================================================================
// Membership requests
// ============================================================================

/// A musician's application to join a group
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    pub id: Uuid,
    pub musician_id: Uuid,
    pub group_id: Uuid,
    pub description: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl MembershipRequest {
    /// Sender and recipient are the only parties allowed to see or remove a request
    pub fn involves(&self, account: &SessionAccount) -> bool {
        match account.kind {
            AccountKind::Musician => self.musician_id == account.profile_id,
            AccountKind::Group => self.group_id == account.profile_id,
        }
    }
}

// ============================================================================
// Request payloads
// ============================================================================

/// Signup and login body
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsInput {
    pub username: String,
    pub password: String,
}

/// Create/update body of a musician profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicianInput {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub age: Option<i32>,
    pub city: String,
    pub province: String,
    #[serde(default)]
    pub contacts: Option<String>,
    #[serde(default)]
    pub musical_tastes: Option<String>,
    #[serde(default)]
    pub instruments: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub available_for_hire: bool,
    #[serde(default)]
    pub available_locations: Option<String>,
    #[serde(default)]
    pub profile_picture_path: Option<String>,
}

/// Create/update body of a group profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInput {
    pub name: String,
    pub city: String,
    pub province: String,
    #[serde(default)]
    pub contacts: Option<String>,
    #[serde(default)]
    pub musical_genres: Option<String>,
    #[serde(default)]
    pub musicians_list: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub time_table: Option<String>,
    #[serde(default)]
    pub available_for_hire: bool,
    #[serde(default)]
    pub available_locations: Option<String>,
    #[serde(default)]
    pub profile_picture_path: Option<String>,
}

/// New announcement; the author comes from the session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementInput {
    pub announcement_type: AnnouncementType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub city: String,
    pub province: String,
}

/// Mutable part of an announcement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementUpdate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub city: String,
    pub province: String,
}

/// New demo; `file_path` is the path returned by the demo upload endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub file_path: String,
}

/// Mutable part of a demo
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoUpdate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// New membership request; the musician comes from the session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequestInput {
    pub group_id: Uuid,
    #[serde(default)]
    pub description: Option<String>,
}
