use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 列出資料夾第一層的一般檔案（不遞迴、不含子資料夾），依檔名排序
pub fn scan_folder_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("無法讀取資料夾: {}", directory.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// 列出資料夾第一層中符合條件的檔案
pub fn scan_folder_files_matching<F>(directory: &Path, predicate: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    Ok(scan_folder_files(directory)?
        .into_iter()
        .filter(|path| predicate(path))
        .collect())
}

/// 依檔名自然排序（`2.mp4` 排在 `10.mp4` 之前）
pub fn sort_by_natural_name(files: &mut [PathBuf]) {
    files.sort_by(|a, b| {
        let name_a = a
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name_b = b
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        natural_cmp(&name_a, &name_b)
    });
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let parts_a = split_numeric(a);
    let parts_b = split_numeric(b);

    for (&pa, &pb) in parts_a.iter().zip(parts_b.iter()) {
        let is_number = |s: &str| s.starts_with(|c: char| c.is_ascii_digit());
        let ord = if is_number(pa) && is_number(pb) {
            // 數字長度不限，去掉前導零後先比位數再比字面
            let na = pa.trim_start_matches('0');
            let nb = pb.trim_start_matches('0');
            na.len().cmp(&nb.len()).then_with(|| na.cmp(nb))
        } else {
            pa.to_lowercase().cmp(&pb.to_lowercase())
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    parts_a.len().cmp(&parts_b.len()).then_with(|| a.cmp(b))
}

/// 切成連續的數字與非數字片段
fn split_numeric(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;

    while let Some(first) = rest.chars().next() {
        let is_digit = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (part, tail) = rest.split_at(end);
        parts.push(part);
        rest = tail;
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_folder_files_is_flat_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();

        fs::write(base.join("b.txt"), "b").unwrap();
        fs::write(base.join("a.txt"), "a").unwrap();
        fs::create_dir(base.join("WORKING")).unwrap();
        fs::write(base.join("WORKING/nested.txt"), "n").unwrap();

        let files = scan_folder_files(base).unwrap();
        assert_eq!(files, vec![base.join("a.txt"), base.join("b.txt")]);
    }

    #[test]
    fn test_scan_missing_folder_is_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(scan_folder_files(&temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_scan_folder_files_matching() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::write(base.join("a.mp4"), "a").unwrap();
        fs::write(base.join("b.txt"), "b").unwrap();

        let files = scan_folder_files_matching(base, |p| {
            p.extension().is_some_and(|e| e == "mp4")
        })
        .unwrap();
        assert_eq!(files, vec![base.join("a.mp4")]);
    }

    #[test]
    fn test_sort_by_natural_name() {
        let mut files: Vec<PathBuf> = [
            "/c/10.mp4",
            "/c/2.mp4",
            "/c/Clip1.ts",
            "/c/1.mp4",
            "/c/clip10.mp4",
            "/c/clip9.mp4",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        sort_by_natural_name(&mut files);

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["1.mp4", "2.mp4", "10.mp4", "Clip1.ts", "clip9.mp4", "clip10.mp4"]
        );
    }

    #[test]
    fn test_natural_cmp_handles_long_numbers() {
        assert_eq!(
            natural_cmp("99999999999999999999999.mp4", "100000000000000000000000.mp4"),
            Ordering::Less
        );
        assert_eq!(natural_cmp("007.mp4", "7.mp4"), "007.mp4".cmp("7.mp4"));
    }
}
