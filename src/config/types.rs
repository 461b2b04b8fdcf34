use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// 最近使用路徑的保留數量
pub const MAX_RECENT_PATHS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "IMAGE_FILE")]
    pub image_file: Vec<String>,
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn image_extensions_set(&self) -> HashSet<String> {
        Self::extensions_set(&self.image_file)
    }

    #[must_use]
    pub fn video_extensions_set(&self) -> HashSet<String> {
        Self::extensions_set(&self.video_file)
    }

    #[must_use]
    pub fn is_image_file(&self, path: &Path) -> bool {
        Self::has_extension_in(path, &self.image_extensions_set())
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        Self::has_extension_in(path, &self.video_extensions_set())
    }

    fn extensions_set(list: &[String]) -> HashSet<String> {
        list.iter().map(|ext| ext.to_lowercase()).collect()
    }

    fn has_extension_in(path: &Path, extensions: &HashSet<String>) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

/// 圖片轉影片（Ken Burns 效果）設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KenBurnsSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// 每段影片長度（秒）
    pub duration_secs: u32,
    /// 每幀放大量
    pub zoom_speed: f64,
    pub max_zoom: f64,
    pub preset: String,
}

impl Default for KenBurnsSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 25,
            duration_secs: 7,
            zoom_speed: 0.001,
            max_zoom: 1.2,
            preset: "veryfast".to_string(),
        }
    }
}

/// 媒體整理流程設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerSettings {
    /// 平行轉檔數量，0 表示自動（CPU 核心數 - 1）
    pub worker_count: usize,
    /// 目的資料夾的上層工作資料夾名稱
    pub working_subdir: String,
}

impl Default for OrganizerSettings {
    fn default() -> Self {
        Self {
            worker_count: 0,
            working_subdir: "WORKING".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub recent_paths: Vec<String>,
    pub organizer: OrganizerSettings,
    pub ken_burns: KenBurnsSettings,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}
