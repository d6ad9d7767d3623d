use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::MediaTool;
use crate::config::TranscriptionConfig;
use crate::error::JobError;

/// Media tool backed by the `ffmpeg` and `ffprobe` binaries.
pub struct FfmpegTool {
    ffmpeg: String,
    ffprobe: String,
    bitrate_kbps: u32,
    sample_rate: u32,
}

impl FfmpegTool {
    pub fn new(config: &TranscriptionConfig) -> Self {
        Self {
            ffmpeg: config.ffmpeg_path.clone(),
            ffprobe: config.ffprobe_path.clone(),
            bitrate_kbps: config.audio_bitrate_kbps,
            sample_rate: config.sample_rate,
        }
    }

    async fn run(&self, program: &str, args: Vec<OsString>) -> Result<Vec<u8>, JobError> {
        debug!(%program, ?args, "Running media tool");
        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| JobError::MediaTool(format!("failed to run {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(JobError::MediaTool(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.lines().last().unwrap_or("").trim()
            )));
        }

        Ok(output.stdout)
    }

    /// Encoding arguments for the canonical format: audio-only, mono,
    /// 16 kHz, low bitrate.
    fn encode_args(&self) -> Vec<OsString> {
        vec![
            OsString::from("-vn"),
            OsString::from("-ac"),
            OsString::from("1"),
            OsString::from("-ar"),
            OsString::from(self.sample_rate.to_string()),
            OsString::from("-b:a"),
            OsString::from(format!("{}k", self.bitrate_kbps)),
        ]
    }
}

#[async_trait]
impl MediaTool for FfmpegTool {
    async fn probe_duration(&self, input: &Path) -> Result<f64, JobError> {
        let args = vec![
            OsString::from("-v"),
            OsString::from("error"),
            OsString::from("-show_entries"),
            OsString::from("format=duration"),
            OsString::from("-of"),
            OsString::from("default=noprint_wrappers=1:nokey=1"),
            OsString::from(input.as_os_str()),
        ];
        let stdout = self.run(&self.ffprobe, args).await?;

        let text = String::from_utf8_lossy(&stdout);
        text.trim().parse::<f64>().map_err(|_| {
            JobError::MediaTool(format!("unparseable ffprobe duration: '{}'", text.trim()))
        })
    }

    async fn normalize(&self, input: &Path, output: &Path) -> Result<(), JobError> {
        let mut args = vec![
            OsString::from("-y"),
            OsString::from("-i"),
            OsString::from(input.as_os_str()),
        ];
        args.extend(self.encode_args());
        args.push(OsString::from(output.as_os_str()));

        self.run(&self.ffmpeg, args).await?;
        Ok(())
    }

    async fn extract_range(
        &self,
        input: &Path,
        output: &Path,
        start_secs: f64,
        duration_secs: f64,
    ) -> Result<(), JobError> {
        // -ss before -i seeks on the demuxer, which keeps extraction fast
        // on long inputs.
        let mut args = vec![
            OsString::from("-y"),
            OsString::from("-ss"),
            OsString::from(format!("{start_secs:.3}")),
            OsString::from("-t"),
            OsString::from(format!("{duration_secs:.3}")),
            OsString::from("-i"),
            OsString::from(input.as_os_str()),
        ];
        args.extend(self.encode_args());
        args.push(OsString::from(output.as_os_str()));

        self.run(&self.ffmpeg, args).await?;
        Ok(())
    }
}
