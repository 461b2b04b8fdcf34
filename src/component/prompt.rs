use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::path::Path;

/// 從最近使用的路徑中選擇，或輸入新路徑；按 ESC 回傳 None
pub fn prompt_directory(recent_paths: &[String], prompt: &str) -> Result<Option<String>> {
    if recent_paths.is_empty() {
        let path: String = Input::new().with_prompt(prompt).interact_text()?;
        return Ok(Some(path.trim().to_string()));
    }

    let mut options: Vec<String> = recent_paths
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let indicator = if Path::new(p).exists() { "✓" } else { "✗" };
            format!("{} [{}] {}", i + 1, indicator, p)
        })
        .collect();
    options.push("輸入新路徑...".to_string());

    println!("{}", style("(按 ESC 返回主選單)").dim());

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇路徑")
        .items(&options)
        .default(0)
        .interact_opt()?;

    match selection {
        None => Ok(None),
        Some(idx) if idx < recent_paths.len() => Ok(Some(recent_paths[idx].clone())),
        Some(_) => {
            let path: String = Input::new().with_prompt(prompt).interact_text()?;
            Ok(Some(path.trim().to_string()))
        }
    }
}
