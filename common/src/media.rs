// Uploaded media: type checks, file naming and local storage

use crate::errors::MediaError;
use crate::models::SessionAccount;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use uuid::Uuid;

pub const IMAGE_TYPES: &[&str] = &["image/png", "image/jpg", "image/jpeg"];
pub const AUDIO_TYPES: &[&str] = &["audio/wav", "audio/mp3", "audio/m4a", "audio/mpeg", "audio/mp4"];

const IMAGE_TYPE_MESSAGE: &str = "Only .png, .jpg and .jpeg formats allowed";
const AUDIO_TYPE_MESSAGE: &str = "Only .wav .mp3 .mp4 and .m4a formats allowed";

const PROFILE_PICTURE_STEM: &str = "profilePict";
const PICTURE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Longest sanitized client file name kept in a stored name
pub const MAX_SANITIZED_NAME_LEN: usize = 100;
const MAX_EXTENSION_LEN: usize = 10;

/// The two upload areas under the media directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    Images,
    Demos,
}

impl MediaCategory {
    pub fn dir_name(&self) -> &'static str {
        match self {
            MediaCategory::Images => "images",
            MediaCategory::Demos => "demos",
        }
    }

    /// URL prefix under which the stored files are served
    pub fn public_prefix(&self) -> &'static str {
        match self {
            MediaCategory::Images => "/media/images/",
            MediaCategory::Demos => "/media/demos/",
        }
    }

    fn from_public_path(path: &str) -> Option<(Self, &str)> {
        [MediaCategory::Images, MediaCategory::Demos]
            .into_iter()
            .find_map(|category| {
                path.strip_prefix(category.public_prefix())
                    .map(|name| (category, name))
            })
    }
}

/// Accept an image content type and return the file extension to store it with
pub fn image_extension(content_type: &str) -> Result<&'static str, MediaError> {
    match content_type {
        "image/png" => Ok("png"),
        "image/jpg" => Ok("jpg"),
        "image/jpeg" => Ok("jpeg"),
        _ => Err(MediaError::UnsupportedMediaType(IMAGE_TYPE_MESSAGE.to_string())),
    }
}

pub fn check_audio_type(content_type: &str) -> Result<(), MediaError> {
    if AUDIO_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(MediaError::UnsupportedMediaType(AUDIO_TYPE_MESSAGE.to_string()))
    }
}

/// Keep the last path component and replace anything outside `[A-Za-z0-9._-]`
///
/// Long names are cut to `MAX_SANITIZED_NAME_LEN` bytes, keeping a short
/// extension when there is one.
pub fn sanitize_file_name(original: &str) -> String {
    let last = original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let mut sanitized = String::with_capacity(last.len());
    for c in last.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '_'
        };
        // Runs of dots collapse so a stored name never contains `..`
        if c == '.' && sanitized.ends_with('.') {
            continue;
        }
        sanitized.push(c);
    }

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        truncate_keeping_extension(sanitized)
    }
}

// Input is ASCII after sanitizing, so byte offsets are char boundaries
fn truncate_keeping_extension(name: String) -> String {
    if name.len() <= MAX_SANITIZED_NAME_LEN {
        return name;
    }

    match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_LEN => {
            let extension = &name[dot..];
            let stem = name[..MAX_SANITIZED_NAME_LEN - extension.len()].trim_end_matches('.');
            format!("{}{}", stem, extension)
        }
        _ => name[..MAX_SANITIZED_NAME_LEN].to_string(),
    }
}

/// `M<id>_profilePict.<ext>`
pub fn profile_picture_name(account: &SessionAccount, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        account.upload_prefix(),
        PROFILE_PICTURE_STEM,
        extension
    )
}

/// `M<id>_<8 random hex digits>_<sanitized original name>`
///
/// The random part keeps two uploads with the same name from sharing a file.
pub fn demo_file_name(account: &SessionAccount, original: &str) -> String {
    let unique = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}",
        account.upload_prefix(),
        &unique[..8],
        sanitize_file_name(original)
    )
}

/// Storage backend for uploaded files
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store a profile picture, replacing the account's previous one
    async fn store_image(
        &self,
        account: &SessionAccount,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError>;

    /// Store an audio demo under a name derived from the uploaded one
    async fn store_demo(
        &self,
        account: &SessionAccount,
        content_type: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError>;

    /// Whether a file is stored under this public path
    async fn exists(&self, public_path: &str) -> Result<bool, MediaError>;

    /// Delete a stored file by its public path; missing files are ignored
    async fn remove(&self, public_path: &str) -> Result<(), MediaError>;
}

/// Stores uploads on the local filesystem under `media_dir/{images,demos}`
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload directories if they do not exist yet
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn init(&self) -> Result<(), MediaError> {
        for category in [MediaCategory::Images, MediaCategory::Demos] {
            tokio::fs::create_dir_all(self.root.join(category.dir_name())).await?;
        }
        info!("Media directories ready");
        Ok(())
    }

    fn path_for(&self, category: MediaCategory, file_name: &str) -> PathBuf {
        self.root.join(category.dir_name()).join(file_name)
    }

    /// Map a public path back to the stored file, refusing anything outside the media dirs
    fn resolve(&self, public_path: &str) -> Result<PathBuf, MediaError> {
        let (category, file_name) = MediaCategory::from_public_path(public_path)
            .ok_or_else(|| MediaError::Io(format!("Not a media path: {}", public_path)))?;

        if file_name.is_empty() || file_name.contains('/') || file_name.contains("..") {
            return Err(MediaError::Io(format!("Not a media path: {}", public_path)));
        }

        Ok(self.path_for(category, file_name))
    }

    async fn write(
        &self,
        category: MediaCategory,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError> {
        let dir = self.root.join(category.dir_name());
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(file_name), bytes).await?;

        let public_path = format!("{}{}", category.public_prefix(), file_name);
        info!(public_path = %public_path, size = bytes.len(), "Stored upload");
        Ok(public_path)
    }
}

async fn remove_if_exists(path: &Path) -> Result<(), MediaError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    #[instrument(skip(self, account, bytes), fields(profile_id = %account.profile_id))]
    async fn store_image(
        &self,
        account: &SessionAccount,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError> {
        let extension = image_extension(content_type)?;

        for previous in PICTURE_EXTENSIONS {
            let name = profile_picture_name(account, previous);
            remove_if_exists(&self.path_for(MediaCategory::Images, &name)).await?;
        }

        let file_name = profile_picture_name(account, extension);
        self.write(MediaCategory::Images, &file_name, bytes).await
    }

    #[instrument(skip(self, account, bytes), fields(profile_id = %account.profile_id))]
    async fn store_demo(
        &self,
        account: &SessionAccount,
        content_type: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError> {
        check_audio_type(content_type)?;

        let file_name = demo_file_name(account, original_name);
        self.write(MediaCategory::Demos, &file_name, bytes).await
    }

    #[instrument(skip(self))]
    async fn exists(&self, public_path: &str) -> Result<bool, MediaError> {
        let path = self.resolve(public_path)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    #[instrument(skip(self))]
    async fn remove(&self, public_path: &str) -> Result<(), MediaError> {
        remove_if_exists(&self.resolve(public_path)?).await?;
        info!(public_path = %public_path, "Removed upload");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountKind;
    use uuid::Uuid;

    fn account(kind: AccountKind) -> SessionAccount {
        SessionAccount {
            profile_id: Uuid::new_v4(),
            username: "bassist".to_string(),
            kind,
        }
    }

    #[test]
    fn test_image_types() {
        assert_eq!(image_extension("image/png").unwrap(), "png");
        assert_eq!(image_extension("image/jpeg").unwrap(), "jpeg");
        let err = image_extension("image/gif").unwrap_err();
        assert_eq!(err.to_string(), "Only .png, .jpg and .jpeg formats allowed");
    }

    #[test]
    fn test_audio_types() {
        for content_type in AUDIO_TYPES {
            assert!(check_audio_type(content_type).is_ok());
        }
        let err = check_audio_type("audio/ogg").unwrap_err();
        assert_eq!(err.to_string(), "Only .wav .mp3 .mp4 and .m4a formats allowed");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("my song.mp3"), "my_song.mp3");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\music\\take 1.wav"), "take_1.wav");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("my..song...mp3"), "my.song.mp3");
    }

    #[test]
    fn test_file_names_carry_upload_prefix() {
        let group = account(AccountKind::Group);
        assert_eq!(
            profile_picture_name(&group, "png"),
            format!("G{}_profilePict.png", group.profile_id)
        );

        let demo = demo_file_name(&group, "live.mp3");
        let prefix = format!("G{}_", group.profile_id);
        assert!(demo.starts_with(&prefix));
        assert!(demo.ends_with("_live.mp3"));
        assert_eq!(demo.len(), prefix.len() + 9 + "live.mp3".len());
    }

    #[test]
    fn test_long_names_are_truncated_keeping_extension() {
        let long = format!("{}.mp3", "a".repeat(300));
        let sanitized = sanitize_file_name(&long);
        assert_eq!(sanitized.len(), MAX_SANITIZED_NAME_LEN);
        assert!(sanitized.ends_with(".mp3"));

        let no_extension = "b".repeat(300);
        assert_eq!(sanitize_file_name(&no_extension).len(), MAX_SANITIZED_NAME_LEN);

        assert_eq!(sanitize_file_name("short.wav"), "short.wav");
    }

    #[tokio::test]
    async fn test_store_image_replaces_previous_picture() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path());
        storage.init().await.unwrap();
        let musician = account(AccountKind::Musician);

        let first = storage
            .store_image(&musician, "image/png", b"png-bytes")
            .await
            .unwrap();
        assert!(first.starts_with("/media/images/M"));
        assert!(first.ends_with("_profilePict.png"));

        let second = storage
            .store_image(&musician, "image/jpeg", b"jpeg-bytes")
            .await
            .unwrap();
        assert!(second.ends_with("_profilePict.jpeg"));

        let images: Vec<_> = std::fs::read_dir(dir.path().join("images"))
            .unwrap()
            .collect();
        assert_eq!(images.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_upload_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path());
        storage.init().await.unwrap();
        let musician = account(AccountKind::Musician);

        let result = storage
            .store_demo(&musician, "video/mp4", "clip.mp4", b"bytes")
            .await;
        assert!(matches!(result, Err(MediaError::UnsupportedMediaType(_))));
        assert_eq!(
            std::fs::read_dir(dir.path().join("demos")).unwrap().count(),
            0
        );
    }

    #[tokio::test]
    async fn test_store_and_remove_demo() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path());
        let group = account(AccountKind::Group);

        let public_path = storage
            .store_demo(&group, "audio/mpeg", "first take.mp3", b"mp3-bytes")
            .await
            .unwrap();
        let stored = dir
            .path()
            .join("demos")
            .join(public_path.trim_start_matches("/media/demos/"));
        assert_eq!(std::fs::read(&stored).unwrap(), b"mp3-bytes");

        storage.remove(&public_path).await.unwrap();
        assert!(!stored.exists());

        // Removing twice is fine
        storage.remove(&public_path).await.unwrap();
    }

    #[tokio::test]
    async fn test_same_demo_name_uploaded_twice_keeps_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path());
        let musician = account(AccountKind::Musician);

        let first = storage
            .store_demo(&musician, "audio/mpeg", "take.mp3", b"FIRST")
            .await
            .unwrap();
        let second = storage
            .store_demo(&musician, "audio/mpeg", "take.mp3", b"SECOND")
            .await
            .unwrap();
        assert_ne!(first, second);

        let read = |public: &str| {
            std::fs::read(
                dir.path()
                    .join("demos")
                    .join(public.trim_start_matches("/media/demos/")),
            )
            .unwrap()
        };
        assert_eq!(read(&first), b"FIRST");
        assert_eq!(read(&second), b"SECOND");

        storage.remove(&second).await.unwrap();
        assert_eq!(read(&first), b"FIRST");
    }

    #[tokio::test]
    async fn test_exists_reports_stored_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path());
        let group = account(AccountKind::Group);

        let stored = storage
            .store_demo(&group, "audio/wav", "jam.wav", b"wav")
            .await
            .unwrap();
        assert!(storage.exists(&stored).await.unwrap());
        assert!(!storage
            .exists(&format!("/media/demos/{}_never.wav", group.upload_prefix()))
            .await
            .unwrap());
        assert!(storage.exists("/media/demos/../secret").await.is_err());
    }

    #[tokio::test]
    async fn test_remove_rejects_paths_outside_media() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalMediaStorage::new(dir.path());
        assert!(storage.remove("/etc/passwd").await.is_err());
        assert!(storage.remove("/media/demos/../secret").await.is_err());
    }
}
