//! Resume uploads, portfolio links and attachment downloads.
//!
//! A profile upload is one unit of work: the attachment row, the portfolio
//! upsert and the file on disk either all land or none of them do.

use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::database::models::{Attachment, NewAttachment, Portfolio, PortfolioLinks};
use crate::database::{ProfileStore, ProfileTransaction};

/// A file received in a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpload {
    pub user_id: Option<i64>,
    pub links: PortfolioLinks,
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileSaved {
    pub attachment: Option<Attachment>,
    pub portfolio: Option<Portfolio>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub attachment: Vec<Attachment>,
    pub portfolio: Option<Portfolio>,
}

/// Random on-disk name that keeps the original extension
fn storage_name(original: &str) -> String {
    let extension = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{}{}", Uuid::new_v4(), extension)
}

/// Stored paths are relative and may not climb out of the upload directory
fn is_safe_relative(path: &Path) -> bool {
    let mut components = path.components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

async fn write_upload(upload_dir: &Path, stored_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(upload_dir).await?;
    let path = upload_dir.join(stored_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

async fn remove_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove partial upload {}: {}", path.display(), e);
        }
    }
}

async fn run_upload(
    tx: &mut dyn ProfileTransaction,
    upload_dir: &Path,
    user_id: i64,
    links: &PortfolioLinks,
    file: Option<UploadedFile>,
    written: &mut Option<PathBuf>,
) -> ServiceResult<ProfileSaved> {
    let mut pending = None;
    let attachment = match file {
        Some(file) => {
            let stored = storage_name(&file.file_name);
            let row = tx
                .insert_attachment(NewAttachment {
                    user_id,
                    file_name: file.file_name,
                    file_path: stored.clone(),
                    mime_type: file.mime_type,
                    file_size: file.bytes.len() as i64,
                })
                .await?;
            pending = Some((stored, file.bytes));
            Some(row)
        }
        None => None,
    };

    let portfolio = if links.is_empty() {
        None
    } else {
        Some(tx.upsert_portfolio(user_id, links).await?)
    };

    if let Some((stored, bytes)) = pending {
        *written = Some(upload_dir.join(&stored));
        write_upload(upload_dir, &stored, &bytes).await?;
    }

    Ok(ProfileSaved { attachment, portfolio })
}

/// Insert attachment → upsert portfolio → write file → commit. Any failure
/// rolls the transaction back and removes whatever was written to disk.
pub async fn save_profile<S>(store: &S, upload_dir: &Path, upload: ProfileUpload) -> ServiceResult<ProfileSaved>
where
    S: ProfileStore + ?Sized,
{
    let user_id = upload
        .user_id
        .ok_or_else(|| ServiceError::invalid("userId", "User ID is required"))?;
    let links = upload.links.normalized();

    let mut tx = store.begin_profile_update().await?;
    let mut written = None;

    let outcome = run_upload(tx.as_mut(), upload_dir, user_id, &links, upload.file, &mut written).await;
    let outcome = match outcome {
        Ok(saved) => tx.commit().await.map(|_| saved).map_err(ServiceError::from),
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!("Profile rollback failed for user {}: {}", user_id, rollback_err);
            }
            Err(e)
        }
    };

    match outcome {
        Ok(saved) => {
            info!(
                "Profile updated for user {} (attachment: {}, portfolio: {})",
                user_id,
                saved.attachment.is_some(),
                saved.portfolio.is_some()
            );
            Ok(saved)
        }
        Err(e) => {
            if let Some(path) = written {
                remove_partial(&path).await;
            }
            error!("Profile update failed for user {}: {}", user_id, e);
            Err(e)
        }
    }
}

pub async fn get_profile<S>(store: &S, user_id: i64) -> ServiceResult<ProfileView>
where
    S: ProfileStore + ?Sized,
{
    Ok(ProfileView {
        attachment: store.attachments_for(user_id).await?,
        portfolio: store.portfolio_for(user_id).await?,
    })
}

pub async fn update_portfolio<S>(store: &S, id: i64, links: PortfolioLinks) -> ServiceResult<()>
where
    S: ProfileStore + ?Sized,
{
    if store.update_portfolio(id, &links.normalized()).await? {
        Ok(())
    } else {
        Err(ServiceError::not_found("Portfolio not found"))
    }
}

pub async fn delete_resume<S>(store: &S, id: i64) -> ServiceResult<()>
where
    S: ProfileStore + ?Sized,
{
    if store.delete_attachment(id).await? {
        Ok(())
    } else {
        Err(ServiceError::not_found("Resume not found"))
    }
}

pub async fn delete_portfolio<S>(store: &S, id: i64) -> ServiceResult<()>
where
    S: ProfileStore + ?Sized,
{
    if store.delete_portfolio(id).await? {
        Ok(())
    } else {
        Err(ServiceError::not_found("Portfolio link not found"))
    }
}

/// Locate the attachment row and its file under `upload_dir`
pub async fn resolve_download<S>(store: &S, upload_dir: &Path, id: i64) -> ServiceResult<(Attachment, PathBuf)>
where
    S: ProfileStore + ?Sized,
{
    let attachment = store
        .find_attachment(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Attachment not found"))?;

    let relative = Path::new(&attachment.file_path);
    if !is_safe_relative(relative) {
        warn!("Attachment {} has an unsafe stored path", attachment.id);
        return Err(ServiceError::not_found("File not found on disk"));
    }

    let path = upload_dir.join(relative);
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => Ok((attachment, path)),
        _ => Err(ServiceError::not_found("File not found on disk")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn upload(user_id: i64) -> ProfileUpload {
        ProfileUpload {
            user_id: Some(user_id),
            links: PortfolioLinks {
                github_link: Some("https://github.com/someone".into()),
                linked_in_link: Some("  ".into()),
            },
            file: Some(UploadedFile {
                file_name: "Resume.PDF".into(),
                mime_type: "application/pdf".into(),
                bytes: b"%PDF-1.4".to_vec(),
            }),
        }
    }

    #[test]
    fn storage_names_keep_extension_only() {
        let name = storage_name("my cv.Pdf");
        assert!(name.ends_with(".pdf"));
        assert!(!name.contains(' '));
        assert!(!storage_name("no_extension").contains('.'));
    }

    #[test]
    fn rejects_paths_leaving_the_upload_dir() {
        assert!(is_safe_relative(Path::new("abc.pdf")));
        assert!(!is_safe_relative(Path::new("../etc/passwd")));
        assert!(!is_safe_relative(Path::new("/etc/passwd")));
        assert!(!is_safe_relative(Path::new("")));
    }

    #[tokio::test]
    async fn saved_profile_is_downloadable() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();

        let saved = save_profile(&store, dir.path(), upload(3)).await.unwrap();
        let attachment = saved.attachment.unwrap();
        assert_eq!(attachment.file_name, "Resume.PDF");
        assert_eq!(attachment.file_size, 8);

        let portfolio = saved.portfolio.unwrap();
        assert!(portfolio.linked_in_link.is_none());

        let (found, path) = resolve_download(&store, dir.path(), attachment.id).await.unwrap();
        assert_eq!(found, attachment);
        assert_eq!(tokio::fs::read(path).await.unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn failed_write_rolls_back_both_rows() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let store = MemoryStore::new();

        let err = save_profile(&store, &blocker, upload(3)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert!(store.attachments_for(3).await.unwrap().is_empty());
        assert!(store.portfolio_for(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn user_id_is_required() {
        let store = MemoryStore::new();
        let mut missing = upload(3);
        missing.user_id = None;
        assert!(matches!(
            save_profile(&store, Path::new("unused"), missing).await,
            Err(ServiceError::Validation { field: Some("userId"), .. })
        ));
    }

    #[tokio::test]
    async fn missing_file_on_disk_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let saved = save_profile(&store, dir.path(), upload(3)).await.unwrap();
        let attachment = saved.attachment.unwrap();
        std::fs::remove_file(dir.path().join(&attachment.file_path)).unwrap();

        assert!(matches!(
            resolve_download(&store, dir.path(), attachment.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            resolve_download(&store, dir.path(), 999).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
