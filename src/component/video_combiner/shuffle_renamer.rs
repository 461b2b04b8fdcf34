//! 兩階段隨機重新命名：先把所有影片移到暫存資料夾，打亂順序後再以
//! `001.mp4`、`002.mov` 等名稱移回原資料夾
//!
//! 中途失敗時不會自動還原，未移回的檔案留在暫存資料夾中，可手動取回

use crate::config::FileTypeTable;
use crate::tools::{ensure_directory_exists, scan_folder_files_matching};
use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use rand::Rng;
use rand::seq::SliceRandom;
use std::fs;
use std::path::{Path, PathBuf};

/// 暫存資料夾名稱（位於要重新命名的資料夾內）
pub const HOLDING_FOLDER: &str = "temp_rename_combiner";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShuffleStage {
    NotStarted,
    /// 所有影片已移入暫存資料夾
    Staged,
    Shuffled,
    /// 所有影片已以新名稱移回
    Restored,
    /// 暫存資料夾已處理完畢（刪除失敗只會警告）
    Cleaned,
}

pub struct ShuffleRenamer {
    folder: PathBuf,
    file_type_table: FileTypeTable,
    stage: ShuffleStage,
}

impl ShuffleRenamer {
    pub fn new(folder: &Path, file_type_table: FileTypeTable) -> Self {
        Self {
            folder: folder.to_path_buf(),
            file_type_table,
            stage: ShuffleStage::NotStarted,
        }
    }

    #[must_use]
    pub const fn stage(&self) -> ShuffleStage {
        self.stage
    }

    #[must_use]
    pub fn holding_folder(&self) -> PathBuf {
        self.folder.join(HOLDING_FOLDER)
    }

    /// 資料夾第一層的影片
    pub fn discover_clips(&self) -> Result<Vec<PathBuf>> {
        scan_folder_files_matching(&self.folder, |path| {
            self.file_type_table.is_video_file(path)
        })
        .with_context(|| format!("無法讀取影片資料夾: {}", self.folder.display()))
    }

    pub fn shuffle_rename(&mut self) -> Result<Vec<PathBuf>> {
        self.shuffle_rename_with_rng(&mut rand::thread_rng())
    }

    /// 隨機重新命名，回傳依新序號排列的影片路徑（即打亂後的順序）
    pub fn shuffle_rename_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<PathBuf>> {
        let clips = self.discover_clips()?;
        if clips.is_empty() {
            warn!("資料夾中沒有影片: {}", self.folder.display());
            return Ok(Vec::new());
        }

        let holding = self.prepare_holding_folder()?;
        info!("共 {} 部影片，移入暫存資料夾: {}", clips.len(), holding.display());

        let mut staged = self.stage_clips(&clips, &holding)?;
        self.stage = ShuffleStage::Staged;

        staged.shuffle(rng);
        self.stage = ShuffleStage::Shuffled;
        debug!("已打亂影片順序");

        let renamed = self.restore_clips(&staged)?;
        self.stage = ShuffleStage::Restored;

        match fs::remove_dir(&holding) {
            Ok(()) => info!("已刪除暫存資料夾: {}", holding.display()),
            Err(e) => warn!("無法刪除暫存資料夾 {}: {}", holding.display(), e),
        }
        self.stage = ShuffleStage::Cleaned;

        info!("已重新命名 {} 部影片", renamed.len());
        Ok(renamed)
    }

    /// 暫存資料夾必須是空的；裡面若有檔案，通常是上次中斷留下的影片
    fn prepare_holding_folder(&self) -> Result<PathBuf> {
        let holding = self.holding_folder();

        if holding.is_dir() {
            let mut entries = fs::read_dir(&holding)
                .with_context(|| format!("無法讀取暫存資料夾: {}", holding.display()))?;
            if entries.next().is_some() {
                bail!(
                    "暫存資料夾不是空的，可能是上次未完成的重新命名，請先手動取回其中的檔案: {}",
                    holding.display()
                );
            }
        } else {
            ensure_directory_exists(&holding)?;
        }

        Ok(holding)
    }

    fn stage_clips(&self, clips: &[PathBuf], holding: &Path) -> Result<Vec<PathBuf>> {
        clips
            .iter()
            .map(|clip| {
                let file_name = clip
                    .file_name()
                    .with_context(|| format!("無法取得檔案名稱: {}", clip.display()))?;
                let staged = holding.join(file_name);
                fs::rename(clip, &staged).with_context(|| {
                    format!("無法將影片移入暫存資料夾: {}", clip.display())
                })?;
                Ok(staged)
            })
            .collect()
    }

    fn restore_clips(&self, staged: &[PathBuf]) -> Result<Vec<PathBuf>> {
        staged
            .iter()
            .enumerate()
            .map(|(i, clip)| {
                let target = self.folder.join(numbered_name(i + 1, clip));
                fs::rename(clip, &target).with_context(|| {
                    format!(
                        "無法將影片重新命名並移回: {} -> {}",
                        clip.display(),
                        target.display()
                    )
                })?;
                debug!("重新命名: {} -> {}", clip.display(), target.display());
                Ok(target)
            })
            .collect()
    }
}

/// 三位數序號加上原本的副檔名（大小寫不變）
fn numbered_name(index: usize, clip: &Path) -> String {
    match clip.extension() {
        Some(ext) => format!("{index:03}.{}", ext.to_string_lossy()),
        None => format!("{index:03}"),
    }
}
