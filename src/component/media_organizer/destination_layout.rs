use super::path_classifier::DurationBucket;
use crate::tools::ensure_directory_exists;
use anyhow::{Context, Result, bail};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// 目的資料夾中的固定分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Images,
    ImageDerivedVideos,
    Videos10s,
    Videos20s,
    Videos30s,
    VideosLong,
}

impl Bucket {
    pub const ALL: [Self; 6] = [
        Self::Images,
        Self::ImageDerivedVideos,
        Self::Videos10s,
        Self::Videos20s,
        Self::Videos30s,
        Self::VideosLong,
    ];

    #[must_use]
    pub const fn folder_name(self) -> &'static str {
        match self {
            Self::Images => "00_IMAGES",
            Self::ImageDerivedVideos => "01_IMAGES_VIDS",
            Self::Videos10s => "02_VIDS_10s",
            Self::Videos20s => "03_VIDS_20s",
            Self::Videos30s => "04_VIDS_30s",
            Self::VideosLong => "05_VIDS_LONG",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Images => "圖片",
            Self::ImageDerivedVideos => "圖片轉影片",
            Self::Videos10s => "影片 (≤10 秒)",
            Self::Videos20s => "影片 (≤20 秒)",
            Self::Videos30s => "影片 (≤30 秒)",
            Self::VideosLong => "影片 (>30 秒)",
        }
    }
}

impl From<DurationBucket> for Bucket {
    fn from(bucket: DurationBucket) -> Self {
        match bucket {
            DurationBucket::UpTo10s => Self::Videos10s,
            DurationBucket::UpTo20s => Self::Videos20s,
            DurationBucket::UpTo30s => Self::Videos30s,
            DurationBucket::Long => Self::VideosLong,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStatus {
    Created,
    /// 目的資料夾已存在，沿用並可能加入或覆寫檔案
    Reused,
}

/// 一次批次作業的目的資料夾結構，建立後不再變動
#[derive(Debug, Clone)]
pub struct DestinationLayout {
    base: PathBuf,
}

impl DestinationLayout {
    #[must_use]
    pub fn new(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
        }
    }

    /// `<來源>/<工作資料夾>/<名稱>`
    #[must_use]
    pub fn for_batch(source: &Path, working_subdir: &str, folder_name: &str) -> Self {
        Self::new(&source.join(working_subdir).join(folder_name))
    }

    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    #[must_use]
    pub fn folder(&self, bucket: Bucket) -> PathBuf {
        self.base.join(bucket.folder_name())
    }

    pub fn folders(&self) -> impl Iterator<Item = (Bucket, PathBuf)> + '_ {
        Bucket::ALL.into_iter().map(move |b| (b, self.folder(b)))
    }

    /// 建立目的資料夾與全部分類資料夾
    ///
    /// 任一分類資料夾建立失敗即回傳錯誤，此時尚未移動任何檔案
    pub fn ensure(&self) -> Result<LayoutStatus> {
        let status = if self.base.is_dir() {
            warn!(
                "目的資料夾已存在，將沿用（檔案可能被加入）: {}",
                self.base.display()
            );
            LayoutStatus::Reused
        } else {
            ensure_directory_exists(&self.base)
                .with_context(|| format!("無法建立目的資料夾: {}", self.base.display()))?;
            info!("已建立目的資料夾: {}", self.base.display());
            LayoutStatus::Created
        };

        let mut failed = Vec::new();
        for (bucket, folder) in self.folders() {
            if let Err(e) = ensure_directory_exists(&folder) {
                error!("無法建立分類資料夾 {}: {e:#}", bucket.folder_name());
                failed.push(folder.display().to_string());
            }
        }

        if !failed.is_empty() {
            bail!("無法建立必要的分類資料夾: {}", failed.join(", "));
        }

        Ok(status)
    }
}

/// 清理使用者輸入的資料夾名稱，只保留文字、數字、空白、底線與連字號
pub fn sanitize_folder_name(raw: &str) -> Result<String> {
    let sanitized: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    let sanitized = sanitized.trim();

    if sanitized.is_empty() {
        bail!("無效的資料夾名稱: '{raw}'，請使用文字、數字、空白、底線或連字號");
    }

    Ok(sanitized.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_for_batch_path() {
        let layout = DestinationLayout::for_batch(Path::new("/media"), "WORKING", "trip");
        assert_eq!(layout.base(), Path::new("/media/WORKING/trip"));
        assert_eq!(
            layout.folder(Bucket::Videos30s),
            PathBuf::from("/media/WORKING/trip/04_VIDS_30s")
        );
    }

    #[test]
    fn test_duration_bucket_mapping() {
        assert_eq!(Bucket::from(DurationBucket::UpTo10s), Bucket::Videos10s);
        assert_eq!(Bucket::from(DurationBucket::Long), Bucket::VideosLong);
    }

    #[test]
    fn test_ensure_creates_all_folders() {
        let temp_dir = TempDir::new().unwrap();
        let layout = DestinationLayout::for_batch(temp_dir.path(), "WORKING", "batch");

        assert_eq!(layout.ensure().unwrap(), LayoutStatus::Created);
        for (_, folder) in layout.folders() {
            assert!(folder.is_dir(), "{} 應該存在", folder.display());
        }

        // 第二次沿用既有資料夾
        assert_eq!(layout.ensure().unwrap(), LayoutStatus::Reused);
    }

    #[test]
    fn test_ensure_fails_when_subfolder_blocked() {
        let temp_dir = TempDir::new().unwrap();
        let layout = DestinationLayout::new(&temp_dir.path().join("batch"));
        fs::create_dir_all(layout.base()).unwrap();
        fs::write(layout.folder(Bucket::Videos20s), "not a folder").unwrap();

        let err = layout.ensure().unwrap_err();
        assert!(err.to_string().contains("03_VIDS_20s"));
    }

    #[test]
    fn test_sanitize_folder_name() {
        assert_eq!(sanitize_folder_name("  My Trip_2024-05 ").unwrap(), "My Trip_2024-05");
        assert_eq!(sanitize_folder_name("a/b\\c:d*").unwrap(), "abcd");
        assert_eq!(sanitize_folder_name("旅行 相簿").unwrap(), "旅行 相簿");
        assert!(sanitize_folder_name("").is_err());
        assert!(sanitize_folder_name("../?*").is_err());
        assert!(sanitize_folder_name("   ").is_err());
    }
}
