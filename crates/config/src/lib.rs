use std::path::Path;

use serde::{Deserialize, Serialize};

use scribe_transcription::TranscriptionConfig;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

/// Upload validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum accepted request body in bytes.
    pub max_content_length: usize,
    /// Accepted audio file extensions (lowercase, no dot).
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_content_length: 100 * 1024 * 1024,
            allowed_extensions: ["mp3", "mp4", "mpeg", "mpga", "m4a", "wav", "webm"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl UploadConfig {
    /// Whether a filename carries an accepted extension.
    pub fn is_allowed(&self, filename: &str) -> bool {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.allowed_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }
}

/// Outbound transcript email settings.
///
/// Defaults target a local plaintext capture relay (Mailpit); point
/// host/port/credentials at a real relay for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Sender address; emailing is disabled while unset.
    pub sender: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            sender: None,
            username: None,
            password: None,
        }
    }
}

/// PDF export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory holding the `{family}-Regular/Bold/Italic/BoldItalic.ttf`
    /// files genpdf loads.
    pub font_dir: String,
    pub font_family: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            font_dir: "./fonts".to_string(),
            font_family: "LiberationSans".to_string(),
        }
    }
}

/// Whole-application configuration, constructed once at startup and passed
/// down explicitly. No hidden process-wide state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub email: EmailConfig,
    pub export: ExportConfig,
    pub transcription: TranscriptionConfig,
}

impl AppConfig {
    /// Loads `scribe.toml` (optional) layered under `SCRIBE__*` environment
    /// variables, e.g. `SCRIBE__TRANSCRIPTION__API_KEY`.
    ///
    /// Falls back to the legacy `OPENAI_API_KEY`, `GMAIL_SENDER_EMAIL` and
    /// `GMAIL_APP_PASSWORD` variables when the structured settings leave
    /// those empty.
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("scribe").required(false))
            .add_source(config::Environment::with_prefix("SCRIBE").separator("__"))
            .build()?;

        let mut app: AppConfig = settings.try_deserialize()?;

        if app.transcription.api_key.is_none() {
            app.transcription.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if app.email.sender.is_none() {
            app.email.sender = std::env::var("GMAIL_SENDER_EMAIL").ok();
        }
        if app.email.password.is_none() {
            app.email.password = std::env::var("GMAIL_APP_PASSWORD").ok();
        }

        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_service_limits() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.upload.max_content_length, 100 * 1024 * 1024);
        assert_eq!(config.transcription.chunk_duration_secs, 1200);
        assert_eq!(config.transcription.max_parallel_chunks, 10);
    }

    #[test]
    fn partial_settings_fall_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"server": {"port": 8080}}"#).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.transcription.api_key.is_none());
        assert_eq!(config.email.smtp_port, 1025);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let upload = UploadConfig::default();
        assert!(upload.is_allowed("meeting.mp3"));
        assert!(upload.is_allowed("MEETING.M4A"));
        assert!(upload.is_allowed("two.dots.webm"));
        assert!(!upload.is_allowed("notes.txt"));
        assert!(!upload.is_allowed("noextension"));
    }
}
