use super::pipeline::{CLIP_SUBFOLDER, CombineReport, STITCH_OUTPUT_FOLDER, VideoCombinePipeline};
use crate::component::media_organizer::format_elapsed;
use crate::component::prompt::prompt_directory;
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use crate::tools::{FfmpegEncoder, is_encoder_missing};
use anyhow::Result;
use console::style;
use dialoguer::Confirm;
use log::{error, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 隨機排序並合併影片，以及只重新命名、只依檔名合併兩個獨立工具
pub struct VideoCombiner {
    config: Config,
}

impl VideoCombiner {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<()> {
        println!("{}", style("=== 隨機排序並合併影片 ===").cyan().bold());
        println!(
            "{}",
            style(format!("請選擇包含 '{CLIP_SUBFOLDER}' 的資料夾")).dim()
        );

        let Some(root) = self.prompt_folder("請輸入根資料夾路徑")? else {
            return Ok(());
        };

        let confirm = Confirm::new()
            .with_prompt(format!(
                "'{CLIP_SUBFOLDER}' 中的影片會被隨機重新命名為 001、002…，確定要繼續嗎？"
            ))
            .default(true)
            .interact()?;
        if !confirm {
            println!("{}", style("操作已取消").yellow());
            return Ok(());
        }

        println!("{}", style("重新命名並合併影片中...").cyan());
        Self::finish(self.pipeline().run(&root))
    }

    /// 只隨機重新命名資料夾中的影片，不合併
    pub fn run_shuffle_only(&self) -> Result<()> {
        println!("{}", style("=== 隨機重新命名影片 ===").cyan().bold());

        let Some(folder) = self.prompt_folder("請輸入影片資料夾路徑")? else {
            return Ok(());
        };

        let confirm = Confirm::new()
            .with_prompt("資料夾中的影片會被隨機重新命名為 001、002…，確定要繼續嗎？")
            .default(true)
            .interact()?;
        if !confirm {
            println!("{}", style("操作已取消").yellow());
            return Ok(());
        }

        let renamed = self.pipeline().shuffle_folder(&folder)?;
        println!();
        if renamed.is_empty() {
            println!("{}", style("資料夾中沒有影片").yellow());
        } else {
            println!("{}", style("=== 完成 ===").green().bold());
            println!("  {} 已重新命名: {} 部影片", style("•").dim(), renamed.len());
        }
        Ok(())
    }

    /// 依檔名順序合併資料夾中的影片，不重新命名
    pub fn run_stitch(&self) -> Result<()> {
        println!("{}", style("=== 依檔名順序合併影片 ===").cyan().bold());
        println!(
            "{}",
            style(format!("結果會放在資料夾內的 '{STITCH_OUTPUT_FOLDER}' 子資料夾")).dim()
        );

        let Some(folder) = self.prompt_folder("請輸入影片資料夾路徑")? else {
            return Ok(());
        };

        println!("{}", style("合併影片中...").cyan());
        Self::finish(self.pipeline().stitch_folder(&folder))
    }

    fn prompt_folder(&self, prompt: &str) -> Result<Option<PathBuf>> {
        let Some(input_path) = prompt_directory(&self.config.settings.recent_paths, prompt)? else {
            return Ok(None);
        };

        let mut settings = self.config.settings.clone();
        add_recent_path(&mut settings, &input_path);
        if let Err(e) = save_settings(&settings) {
            warn!("無法儲存路徑歷史: {e}");
        }

        Ok(Some(PathBuf::from(input_path)))
    }

    fn pipeline(&self) -> VideoCombinePipeline {
        VideoCombinePipeline::new(
            self.config.file_type_table.clone(),
            Arc::new(FfmpegEncoder::new()),
        )
    }

    fn finish(result: Result<CombineReport>) -> Result<()> {
        match result {
            Ok(report) => {
                println!();
                match &report.output {
                    Some(output) => Self::print_output(report.clip_count, output),
                    None => println!("{}", style("沒有可合併的影片").yellow()),
                }
                println!(
                    "  {} 總耗時: {}",
                    style("•").dim(),
                    format_elapsed(report.elapsed)
                );
                Ok(())
            }
            Err(e) if is_encoder_missing(&e) => {
                error!("找不到編碼器: {e:#}");
                println!(
                    "{} {}",
                    style("錯誤:").red().bold(),
                    style("找不到 ffmpeg，請先安裝並確認已加入 PATH").red()
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn print_output(clip_count: usize, output: &Path) {
        println!("{}", style("=== 完成 ===").green().bold());
        println!("  {} 合併影片數: {}", style("•").dim(), clip_count);
        println!("  {} 輸出檔案: {}", style("•").dim(), output.display());
    }
}
