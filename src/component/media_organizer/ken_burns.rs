//! 將單張圖片轉成帶有緩慢放大效果（Ken Burns）的固定長度影片

use crate::config::KenBurnsSettings;
use crate::tools::{Encoder, EncoderError};
use log::{error, info, warn};
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// zoompan 前的中間放大寬度，用來減少逐幀縮放的抖動
const INTERMEDIATE_UPSCALE_WIDTH: u32 = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderStatus {
    Rendered,
    /// 編碼器有執行但失敗，附上 stdout/stderr
    Failed(String),
}

pub struct KenBurnsRenderer {
    settings: KenBurnsSettings,
    encoder: Arc<dyn Encoder>,
}

impl KenBurnsRenderer {
    pub fn new(settings: KenBurnsSettings, encoder: Arc<dyn Encoder>) -> Self {
        Self { settings, encoder }
    }

    #[must_use]
    pub fn frame_count(&self) -> u32 {
        self.settings.duration_secs * self.settings.fps
    }

    /// 建立濾鏡圖：
    /// 1. 保持比例縮放，讓限制邊達到 目標尺寸 × 最大倍率
    /// 2. 置中補黑邊到 (寬 × 倍率) × (高 × 倍率)，任何倍率下都不會露出空白
    /// 3. 像素比例設為 1:1
    /// 4. 大幅放大後再做 zoompan，減少逐幀內插的跳動
    /// 5. 由 1.0 開始每幀放大，上限為最大倍率，裁切永遠置中
    #[must_use]
    pub fn filter_graph(&self) -> String {
        let KenBurnsSettings {
            width,
            height,
            fps,
            zoom_speed,
            max_zoom,
            ..
        } = self.settings;
        let aspect_ratio = f64::from(width) / f64::from(height);
        let frames = self.frame_count();

        format!(
            "[0:v]scale=w='if(gte(iw/ih,{aspect_ratio}),{width}*{max_zoom},-2)':h='if(lt(iw/ih,{aspect_ratio}),{height}*{max_zoom},-2)',\
             pad=w={width}*{max_zoom}:h={height}*{max_zoom}:x='(ow-iw)/2':y='(oh-ih)/2':color=black,\
             setsar=1,\
             scale={INTERMEDIATE_UPSCALE_WIDTH}:-1,\
             zoompan=z='min(zoom+{zoom_speed},{max_zoom})':x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':d={frames}:s={width}x{height}:fps={fps}[v]"
        )
    }

    #[must_use]
    pub fn build_args(&self, image_path: &Path, output_path: &Path) -> Vec<OsString> {
        let filter_graph = self.filter_graph();
        let duration = self.settings.duration_secs.to_string();
        let fps = self.settings.fps.to_string();

        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-y", "-loop", "1", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(image_path.as_os_str().to_os_string());
        args.extend(
            [
                "-filter_complex",
                filter_graph.as_str(),
                "-map",
                "[v]",
                "-t",
                duration.as_str(),
                "-c:v",
                "libx264",
                "-preset",
                self.settings.preset.as_str(),
                "-tune",
                "stillimage",
                "-pix_fmt",
                "yuv420p",
                "-r",
                fps.as_str(),
                "-movflags",
                "+faststart",
                "-an",
            ]
            .iter()
            .map(OsString::from),
        );
        args.push(output_path.as_os_str().to_os_string());
        args
    }

    /// 產生影片
    ///
    /// 找不到編碼器時回傳 `Err`，讓整批作業中止；其餘失敗都只算這張圖片失敗
    pub fn render(
        &self,
        image_path: &Path,
        output_path: &Path,
    ) -> Result<RenderStatus, EncoderError> {
        let args = self.build_args(image_path, output_path);

        let output = match self.encoder.run(&args) {
            Ok(output) => output,
            Err(e @ EncoderError::NotFound { .. }) => {
                error!("找不到編碼器，無法轉換 {}", image_path.display());
                return Err(e);
            }
            Err(e @ EncoderError::Io { .. }) => {
                error!("無法啟動編碼器 {}: {e}", image_path.display());
                return Ok(RenderStatus::Failed(e.to_string()));
            }
        };

        if output.success {
            info!("已建立 Ken Burns 影片: {}", output_path.display());
            return Ok(RenderStatus::Rendered);
        }

        let diagnostics = output.diagnostics();
        error!("圖片轉影片失敗 {}:\n{}", image_path.display(), diagnostics);
        Self::discard_failed_output(output_path);
        Ok(RenderStatus::Failed(diagnostics))
    }

    /// 刪除失敗的輸出，避免下次被當成已完成而略過
    fn discard_failed_output(output_path: &Path) {
        if output_path.exists() {
            match fs::remove_file(output_path) {
                Ok(()) => info!("已刪除失敗的輸出檔案: {}", output_path.display()),
                Err(e) => warn!("無法刪除失敗的輸出檔案 {}: {}", output_path.display(), e),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::tools::EncoderOutput;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// 假編碼器：記錄參數，並依設定寫出輸出檔或回傳失敗
    pub(crate) struct FakeEncoder {
        pub fail_when_contains: Option<String>,
        pub missing: bool,
        pub calls: Mutex<Vec<Vec<OsString>>>,
        /// 包含找不到編碼器而失敗的呼叫
        pub attempts: AtomicUsize,
    }

    impl FakeEncoder {
        pub(crate) fn ok() -> Self {
            Self {
                fail_when_contains: None,
                missing: false,
                calls: Mutex::new(Vec::new()),
                attempts: AtomicUsize::new(0),
            }
        }

        pub(crate) fn failing_on(pattern: &str) -> Self {
            Self {
                fail_when_contains: Some(pattern.to_string()),
                ..Self::ok()
            }
        }

        pub(crate) fn missing() -> Self {
            Self {
                missing: true,
                ..Self::ok()
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub(crate) fn attempt_count(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    impl Encoder for FakeEncoder {
        fn probe_version(&self) -> Result<(), EncoderError> {
            if self.missing {
                return Err(EncoderError::NotFound {
                    program: "ffmpeg".to_string(),
                });
            }
            Ok(())
        }

        fn run(&self, args: &[OsString]) -> Result<EncoderOutput, EncoderError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.probe_version()?;
            self.calls.lock().unwrap().push(args.to_vec());

            let output = Path::new(args.last().unwrap());
            let joined = args
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(" ");
            let fail = self
                .fail_when_contains
                .as_ref()
                .is_some_and(|p| joined.contains(p.as_str()));

            // 失敗時也寫出部分檔案，模擬 ffmpeg 中途失敗
            fs::write(output, if fail { "partial" } else { "video" }).unwrap();

            Ok(EncoderOutput {
                success: !fail,
                code: Some(i32::from(fail)),
                stdout: "fake stdout".to_string(),
                stderr: if fail {
                    "fake stderr: invalid data".to_string()
                } else {
                    String::new()
                },
            })
        }
    }

    fn renderer(encoder: Arc<dyn Encoder>) -> KenBurnsRenderer {
        KenBurnsRenderer::new(KenBurnsSettings::default(), encoder)
    }

    #[test]
    fn test_filter_graph_matches_default_settings() {
        let renderer = renderer(Arc::new(FakeEncoder::ok()));
        assert_eq!(
            renderer.filter_graph(),
            "[0:v]scale=w='if(gte(iw/ih,1.7777777777777777),1920*1.2,-2)':h='if(lt(iw/ih,1.7777777777777777),1080*1.2,-2)',\
             pad=w=1920*1.2:h=1080*1.2:x='(ow-iw)/2':y='(oh-ih)/2':color=black,\
             setsar=1,\
             scale=8000:-1,\
             zoompan=z='min(zoom+0.001,1.2)':x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':d=175:s=1920x1080:fps=25[v]"
        );
    }

    #[test]
    fn test_frame_count() {
        let settings = KenBurnsSettings {
            duration_secs: 4,
            fps: 30,
            ..KenBurnsSettings::default()
        };
        let renderer = KenBurnsRenderer::new(settings, Arc::new(FakeEncoder::ok()));
        assert_eq!(renderer.frame_count(), 120);
        assert!(renderer.filter_graph().contains(":d=120:"));
    }

    #[test]
    fn test_build_args_layout() {
        let renderer = renderer(Arc::new(FakeEncoder::ok()));
        let args: Vec<String> = renderer
            .build_args(Path::new("/in/a.jpg"), Path::new("/out/a.mp4"))
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect();

        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("-loop") + 1], "1");
        assert_eq!(args[pos("-i") + 1], "/in/a.jpg");
        assert_eq!(args[pos("-map") + 1], "[v]");
        assert_eq!(args[pos("-t") + 1], "7");
        assert_eq!(args[pos("-c:v") + 1], "libx264");
        assert_eq!(args[pos("-preset") + 1], "veryfast");
        assert_eq!(args[pos("-tune") + 1], "stillimage");
        assert_eq!(args[pos("-pix_fmt") + 1], "yuv420p");
        assert_eq!(args[pos("-r") + 1], "25");
        assert_eq!(args[pos("-movflags") + 1], "+faststart");
        assert!(args.contains(&"-an".to_string()));
        assert_eq!(args.last().unwrap(), "/out/a.mp4");
    }

    #[test]
    fn test_render_success() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("a.mp4");
        let renderer = renderer(Arc::new(FakeEncoder::ok()));

        let status = renderer.render(Path::new("/in/a.jpg"), &output).unwrap();
        assert_eq!(status, RenderStatus::Rendered);
        assert!(output.exists());
    }

    #[test]
    fn test_render_failure_keeps_diagnostics_and_removes_output() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("bad.mp4");
        let renderer = renderer(Arc::new(FakeEncoder::failing_on("bad.jpg")));

        let status = renderer.render(Path::new("/in/bad.jpg"), &output).unwrap();
        match status {
            RenderStatus::Failed(message) => {
                assert!(message.contains("fake stdout"));
                assert!(message.contains("fake stderr"));
            }
            RenderStatus::Rendered => panic!("應該失敗"),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_render_missing_encoder_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let renderer = renderer(Arc::new(FakeEncoder::missing()));
        let result = renderer.render(Path::new("/in/a.jpg"), &temp_dir.path().join("a.mp4"));
        assert!(matches!(result, Err(EncoderError::NotFound { .. })));
    }
}
