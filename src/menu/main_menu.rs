use crate::config::Config;
use crate::config::save::save_settings;
use crate::menu::handlers::{
    run_folder_shuffler, run_folder_stitcher, run_media_organizer, run_video_combiner,
};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::thread;
use std::time::Duration;

pub fn show_main_menu(term: &Term, config: &mut Config) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style("=== 媒體整理系統 ===").cyan().bold());
    println!("{}", style("(按 ESC 離開)").dim());

    let options = vec![
        "整理媒體並產生圖片影片",
        "隨機排序並合併影片",
        "隨機重新命名資料夾中的影片",
        "依檔名順序合併資料夾中的影片",
        "設定",
        "離開",
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇功能")
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_media_organizer(term, config)?;
            // 元件會更新路徑歷史，重新載入以顯示最新清單
            *config = Config::new()?;
            Ok(true)
        }
        Some(1) => {
            run_video_combiner(term, config)?;
            *config = Config::new()?;
            Ok(true)
        }
        Some(2) => {
            run_folder_shuffler(term, config)?;
            *config = Config::new()?;
            Ok(true)
        }
        Some(3) => {
            run_folder_stitcher(term, config)?;
            *config = Config::new()?;
            Ok(true)
        }
        Some(4) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(5) | None => Ok(false),
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style("=== 設定 ===").cyan().bold());
        println!("{}", style("(按 ESC 返回)").dim());

        let options = vec![
            format!(
                "平行轉檔數量（目前: {}）",
                describe_worker_count(config.settings.organizer.worker_count)
            ),
            format!(
                "圖片影片長度（目前: {} 秒）",
                config.settings.ken_burns.duration_secs
            ),
            "返回".to_string(),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("請選擇要修改的設定")
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => edit_worker_count(config)?,
            Some(1) => edit_duration(config)?,
            Some(2) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn describe_worker_count(worker_count: usize) -> String {
    if worker_count == 0 {
        "自動".to_string()
    } else {
        worker_count.to_string()
    }
}

fn edit_worker_count(config: &mut Config) -> Result<()> {
    let worker_count: usize = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("平行轉檔數量（0 = 自動，CPU 核心數 - 1）")
        .default(config.settings.organizer.worker_count)
        .interact_text()?;

    if worker_count != config.settings.organizer.worker_count {
        config.settings.organizer.worker_count = worker_count;
        save_settings(&config.settings)?;
        println!(
            "\n{} {}",
            style("設定已儲存:").green(),
            describe_worker_count(worker_count)
        );
        thread::sleep(Duration::from_secs(1));
    }

    Ok(())
}

fn edit_duration(config: &mut Config) -> Result<()> {
    let duration_secs: u32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("每段圖片影片的長度（秒）")
        .default(config.settings.ken_burns.duration_secs)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("長度必須大於 0")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    if duration_secs != config.settings.ken_burns.duration_secs {
        config.settings.ken_burns.duration_secs = duration_secs;
        save_settings(&config.settings)?;
        println!("\n{} {} 秒", style("設定已儲存:").green(), duration_secs);
        thread::sleep(Duration::from_secs(1));
    }

    Ok(())
}
