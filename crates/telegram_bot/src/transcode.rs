//! mp3 → opus conversion through a local `ffmpeg`.
//!
//! Telegram only renders voice notes for OGG/Opus, while the speech service
//! answers with mp3. Whether `ffmpeg` exists is checked once at startup and
//! kept in [`Transcoder`]; when it's missing the mp3 is sent as plain audio.

use std::{process::Stdio, time::Duration};

use thiserror::Error;
use tokio::{io::AsyncWriteExt, process::Command};

const FFMPEG: &str = "ffmpeg";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("transcoder is not available")]
    Unavailable,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),
}

#[derive(Clone, Debug)]
pub struct Transcoder {
    program: Option<String>,
    timeout: Duration,
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::unavailable()
    }
}

impl Transcoder {
    /// Probe `ffmpeg` on `PATH`.
    pub async fn detect() -> Self {
        Self::detect_program(FFMPEG).await
    }

    pub async fn detect_program(program: &str) -> Self {
        let found = Command::new(program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false);

        if found {
            tracing::info!("{program} found, voice notes enabled");
            Self::with_program(program)
        } else {
            tracing::warn!("{program} not found, speech will be sent as mp3");
            Self::unavailable()
        }
    }

    /// Use `program` without probing it.
    pub fn with_program(program: &str) -> Self {
        Self {
            program: Some(program.to_string()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            program: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Upper bound for one conversion; the process is killed past it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_available(&self) -> bool {
        self.program.is_some()
    }

    pub async fn mp3_to_opus(&self, mp3: &[u8]) -> Result<Vec<u8>, TranscodeError> {
        let program = self.program.as_deref().ok_or(TranscodeError::Unavailable)?;

        let mut child = Command::new(program)
            .args([
                "-hide_banner",
                "-loglevel",
                "error",
                "-f",
                "mp3",
                "-i",
                "pipe:0",
                "-c:a",
                "libopus",
                "-b:a",
                "48k",
                "-application",
                "voip",
                "-f",
                "ogg",
                "pipe:1",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TranscodeError::Ffmpeg("stdin not captured".to_string()))?;
        let input = mp3.to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(TranscodeError::Ffmpeg(format!(
                    "no result after {:?}",
                    self.timeout
                )));
            }
        };
        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::debug!("ffmpeg stdin closed early: {err}"),
            Err(err) => tracing::debug!("ffmpeg writer task failed: {err}"),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscodeError::Ffmpeg(stderr.trim().to_string()));
        }
        if output.stdout.is_empty() {
            return Err(TranscodeError::Ffmpeg("empty output".to_string()));
        }
        Ok(output.stdout)
    }
}

/// Audio to send after a speech synthesis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechReply {
    /// OGG/Opus, sent as a voice note.
    Voice(Vec<u8>),
    /// The untouched mp3, sent as an audio file.
    Audio(Vec<u8>),
}

/// Turn synthesized mp3 into a voice note when possible, otherwise keep it.
pub async fn speech_reply(mp3: Vec<u8>, transcoder: &Transcoder) -> SpeechReply {
    if !transcoder.is_available() {
        return SpeechReply::Audio(mp3);
    }

    match transcoder.mp3_to_opus(&mp3).await {
        Ok(opus) => SpeechReply::Voice(opus),
        Err(err) => {
            tracing::warn!("transcoding failed, sending mp3: {err}");
            SpeechReply::Audio(mp3)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: &str = "ffmpeg-that-does-not-exist-on-this-host";

    #[tokio::test]
    async fn missing_program_is_unavailable() {
        let transcoder = Transcoder::detect_program(MISSING).await;
        assert!(!transcoder.is_available());
    }

    #[tokio::test]
    async fn unavailable_transcoder_keeps_the_mp3() {
        let reply = speech_reply(b"mp3 bytes".to_vec(), &Transcoder::unavailable()).await;
        assert_eq!(reply, SpeechReply::Audio(b"mp3 bytes".to_vec()));
    }

    #[tokio::test]
    async fn failing_transcoder_keeps_the_mp3() {
        let transcoder = Transcoder::with_program(MISSING);
        assert!(transcoder.is_available());
        let reply = speech_reply(b"mp3 bytes".to_vec(), &transcoder).await;
        assert_eq!(reply, SpeechReply::Audio(b"mp3 bytes".to_vec()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hanging_transcoder_is_cut_off() {
        use std::os::unix::fs::PermissionsExt;

        let dir = std::env::temp_dir().join(format!("schoolbot-transcode-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let script = dir.join("stuck-ffmpeg");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let transcoder = Transcoder::with_program(script.to_str().unwrap())
            .with_timeout(Duration::from_millis(200));
        let started = std::time::Instant::now();
        let result = transcoder.mp3_to_opus(b"mp3 bytes").await;

        assert!(matches!(result, Err(TranscodeError::Ffmpeg(_))));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(
            speech_reply(b"mp3 bytes".to_vec(), &transcoder).await,
            SpeechReply::Audio(b"mp3 bytes".to_vec())
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn unavailable_transcoder_refuses_to_convert() {
        assert!(matches!(
            Transcoder::unavailable().mp3_to_opus(b"x").await,
            Err(TranscodeError::Unavailable)
        ));
    }
}
