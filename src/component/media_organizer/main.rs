use super::batch_report::BatchReport;
use super::pipeline::MediaPipeline;
use crate::component::prompt::prompt_directory;
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use crate::tools::{FfmpegEncoder, FfprobeDurationProbe, is_encoder_missing};
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, warn};
use std::path::PathBuf;
use std::sync::Arc;

/// 整理媒體並產生圖片影片
pub struct MediaOrganizer {
    config: Config,
}

impl MediaOrganizer {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<()> {
        println!("{}", style("=== 整理媒體並產生圖片影片 ===").cyan().bold());

        let Some(input_path) = prompt_directory(
            &self.config.settings.recent_paths,
            "請輸入要整理的來源資料夾路徑",
        )?
        else {
            return Ok(());
        };
        let source = PathBuf::from(&input_path);

        {
            let mut settings = self.config.settings.clone();
            add_recent_path(&mut settings, &input_path);
            if let Err(e) = save_settings(&settings) {
                warn!("無法儲存路徑歷史: {e}");
            }
        }

        let folder_name: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("請輸入目的資料夾名稱（文字、數字、空白、底線、連字號）")
            .interact_text()?;

        println!(
            "  {} 結果將放在 {}",
            style("→").dim(),
            style(
                source
                    .join(&self.config.settings.organizer.working_subdir)
                    .join(folder_name.trim())
                    .display()
            )
            .cyan()
        );

        let confirm = Confirm::new()
            .with_prompt("確定要開始整理嗎？來源資料夾中的媒體檔案將被移動")
            .default(true)
            .interact()?;
        if !confirm {
            println!("{}", style("操作已取消").yellow());
            return Ok(());
        }

        let pipeline = MediaPipeline::new(
            self.config.clone(),
            Arc::new(FfmpegEncoder::new()),
            Arc::new(FfprobeDurationProbe),
        )
        .with_cpu_usage(true);

        let progress = Self::progress_bar();
        match pipeline.run(&source, &folder_name, &progress) {
            Ok(report) => {
                progress.finish_and_clear();
                Self::print_report(&report);
                Ok(())
            }
            Err(e) if is_encoder_missing(&e) => {
                progress.abandon();
                error!("找不到編碼器: {e:#}");
                println!(
                    "{} {}",
                    style("錯誤:").red().bold(),
                    style("找不到 ffmpeg，請先安裝並確認已加入 PATH").red()
                );
                Ok(())
            }
            Err(e) => {
                progress.abandon();
                Err(e)
            }
        }
    }

    fn progress_bar() -> ProgressBar {
        let progress = ProgressBar::new(0);
        progress.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        progress
    }

    fn print_report(report: &BatchReport) {
        println!();
        let headline = if report.has_errors() {
            style(format!("=== {} ===", report.headline())).yellow().bold()
        } else {
            style(format!("=== {} ===", report.headline())).green().bold()
        };
        println!("{headline}");

        for line in report.summary_lines() {
            println!("  {} {}", style("•").dim(), line);
        }
    }
}
