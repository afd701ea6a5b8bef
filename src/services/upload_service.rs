//! Picture and logo uploads.
//!
//! Files are validated, staged under `<uploads>/staging`, and only moved into
//! the public directory when the draft is committed. Staged files that are
//! removed or never committed are deleted, so an aborted request leaves
//! nothing behind.

use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{Error, Result};

pub const MAX_PICTURES: usize = 3;
pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            "image/webp" => Some(ImageKind::Webp),
            "image/gif" => Some(ImageKind::Gif),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Webp => "webp",
            ImageKind::Gif => "gif",
        }
    }

    fn matches_content(&self, data: &[u8]) -> bool {
        match self {
            ImageKind::Jpeg => data.starts_with(&[0xFF, 0xD8, 0xFF]),
            ImageKind::Png => data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            ImageKind::Webp => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
            ImageKind::Gif => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
        }
    }
}

/// Which entity the upload belongs to; also the public sub-directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    Company,
    CompanyLogo,
    Job,
    Cv,
}

impl UploadTarget {
    fn dir(&self) -> &'static str {
        match self {
            UploadTarget::Company => "company",
            UploadTarget::CompanyLogo => "logos",
            UploadTarget::Job => "jobs",
            UploadTarget::Cv => "cv",
        }
    }

    pub fn cap(&self) -> usize {
        match self {
            UploadTarget::CompanyLogo => 1,
            _ => MAX_PICTURES,
        }
    }
}

/// Checks declared type, content signature and size of one file.
pub fn validate_picture(content_type: Option<&str>, data: &[u8]) -> Result<ImageKind> {
    let kind = content_type
        .and_then(ImageKind::from_mime)
        .ok_or_else(|| Error::BadRequest("Only JPEG, PNG, WebP or GIF images are allowed".into()))?;
    if data.is_empty() {
        return Err(Error::BadRequest("Empty file".into()));
    }
    if data.len() > MAX_PICTURE_BYTES {
        return Err(Error::BadRequest("Each picture must be 5MB or smaller".into()));
    }
    if !kind.matches_content(data) {
        return Err(Error::BadRequest(format!(
            "File content is not a valid {} image",
            kind.extension()
        )));
    }
    Ok(kind)
}

#[derive(Clone)]
pub struct UploadService {
    root: PathBuf,
}

impl UploadService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join("staging")
    }

    pub fn draft(&self, target: UploadTarget, existing: Vec<String>) -> PictureDraft {
        PictureDraft {
            target,
            staging_dir: self.staging_dir(),
            public_dir: self.root.join(target.dir()),
            retained: existing,
            staged: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct StagedPicture {
    path: PathBuf,
    file_name: String,
}

/// Pictures being edited for one entity: URLs the user kept plus files not
/// yet published.
#[derive(Debug)]
pub struct PictureDraft {
    target: UploadTarget,
    staging_dir: PathBuf,
    public_dir: PathBuf,
    retained: Vec<String>,
    staged: Vec<StagedPicture>,
}

impl PictureDraft {
    pub fn len(&self) -> usize {
        self.retained.len() + self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rejects the file when the cap is already reached, before anything is
    /// validated or written.
    pub async fn stage(&mut self, content_type: Option<&str>, data: &Bytes) -> Result<()> {
        let cap = self.target.cap();
        if self.len() >= cap {
            return Err(Error::BadRequest(format!(
                "You can upload at most {} picture{}",
                cap,
                if cap == 1 { "" } else { "s" }
            )));
        }
        let kind = validate_picture(content_type, data)?;

        tokio::fs::create_dir_all(&self.staging_dir).await?;
        let digest = hex::encode(Sha256::digest(data));
        let file_name = format!("{}.{}", &digest[..32], kind.extension());
        let path = self.staging_dir.join(format!("{}-{}", Uuid::new_v4(), file_name));
        tokio::fs::write(&path, data).await?;

        tracing::debug!(upload = ?self.target, file = %file_name, bytes = data.len(), "picture staged");
        self.staged.push(StagedPicture { path, file_name });
        Ok(())
    }

    pub fn remove_existing(&mut self, url: &str) -> bool {
        let before = self.retained.len();
        self.retained.retain(|u| u != url);
        before != self.retained.len()
    }

    /// Drops a staged file, deleting it from the staging area.
    pub fn discard_staged(&mut self, index: usize) -> bool {
        if index >= self.staged.len() {
            return false;
        }
        let picture = self.staged.remove(index);
        release(&picture.path);
        true
    }

    /// Publishes staged files and returns `(all_urls, new_urls)`.
    pub async fn commit(mut self) -> Result<(Vec<String>, Vec<String>)> {
        tokio::fs::create_dir_all(&self.public_dir).await?;
        let mut added = Vec::with_capacity(self.staged.len());
        let staged = std::mem::take(&mut self.staged);
        for (index, picture) in staged.iter().enumerate() {
            let target = self.public_dir.join(&picture.file_name);
            if let Err(e) = tokio::fs::rename(&picture.path, &target).await {
                for leftover in &staged[index..] {
                    release(&leftover.path);
                }
                return Err(e.into());
            }
            added.push(format!(
                "{}/{}/{}",
                PUBLIC_PREFIX,
                self.target.dir(),
                picture.file_name
            ));
        }
        let mut all = std::mem::take(&mut self.retained);
        all.extend(added.iter().cloned());
        Ok((all, added))
    }
}

fn release(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to release staged picture");
        }
    }
}

impl Drop for PictureDraft {
    fn drop(&mut self) {
        for picture in self.staged.drain(..) {
            release(&picture.path);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::samples::{GIF, JPEG, PNG};
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("wsjb-uploads-{}", Uuid::new_v4()))
    }

    fn files_in(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[test]
    fn accepts_only_supported_images() {
        assert_eq!(validate_picture(Some("image/png"), PNG).unwrap(), ImageKind::Png);
        assert_eq!(validate_picture(Some("image/jpeg"), JPEG).unwrap(), ImageKind::Jpeg);
        assert!(validate_picture(Some("application/pdf"), b"%PDF-1.4").is_err());
        assert!(validate_picture(None, PNG).is_err());
        assert!(validate_picture(Some("image/png"), JPEG).is_err());
    }

    #[test]
    fn rejects_oversized_files() {
        let mut big = PNG.to_vec();
        big.resize(MAX_PICTURE_BYTES + 1, 0);
        assert!(validate_picture(Some("image/png"), &big).is_err());
    }

    #[tokio::test]
    async fn fourth_picture_is_rejected_without_writing() {
        let root = temp_root();
        let service = UploadService::new(&root);
        let mut draft = service.draft(
            UploadTarget::Job,
            vec!["/uploads/jobs/a.png".into(), "/uploads/jobs/b.png".into()],
        );

        draft.stage(Some("image/png"), &Bytes::from_static(PNG)).await.unwrap();
        assert_eq!(draft.len(), 3);
        assert_eq!(files_in(&service.staging_dir()), 1);

        let err = draft
            .stage(Some("image/gif"), &Bytes::from_static(GIF))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert_eq!(files_in(&service.staging_dir()), 1);

        drop(draft);
        assert_eq!(files_in(&service.staging_dir()), 0);
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn commit_merges_retained_and_new_urls() {
        let root = temp_root();
        let service = UploadService::new(&root);
        let mut draft = service.draft(
            UploadTarget::Cv,
            vec!["/uploads/cv/old1.png".into(), "/uploads/cv/old2.png".into()],
        );
        assert!(draft.remove_existing("/uploads/cv/old1.png"));
        draft.stage(Some("image/png"), &Bytes::from_static(PNG)).await.unwrap();
        draft.stage(Some("image/jpeg"), &Bytes::from_static(JPEG)).await.unwrap();

        let (all, added) = draft.commit().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], "/uploads/cv/old2.png");
        assert_eq!(added.len(), 2);
        assert!(added.iter().all(|url| url.starts_with("/uploads/cv/")));
        assert_eq!(files_in(&root.join("cv")), 2);
        assert_eq!(files_in(&service.staging_dir()), 0);
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn discarding_a_staged_picture_releases_it() {
        let root = temp_root();
        let service = UploadService::new(&root);
        let mut draft = service.draft(UploadTarget::CompanyLogo, Vec::new());
        draft.stage(Some("image/png"), &Bytes::from_static(PNG)).await.unwrap();
        assert!(draft
            .stage(Some("image/png"), &Bytes::from_static(PNG))
            .await
            .is_err());

        assert!(draft.discard_staged(0));
        assert!(draft.is_empty());
        assert_eq!(files_in(&service.staging_dir()), 0);
        let _ = std::fs::remove_dir_all(root);
    }
}
