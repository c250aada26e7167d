use clap::builder::TypedValueParser as _;
use clap::Parser;
use directories::ProjectDirs;
use dotenvy::dotenv;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

/// Default base URL of the taskdeck REST API.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/v1";

/// File name of the persisted session inside the data directory.
const SESSION_FILE_NAME: &str = "session.json";

/// Fallback session location when no platform data directory can be determined.
const FALLBACK_SESSION_FILE: &str = ".taskdeck/session.json";

// Settings shared by every command. Each field can also be set through the
// environment variable of the same name, or a `.env` file.
#[derive(Clone, Debug, Parser)]
pub struct Config {
    /// Base URL of the taskdeck REST API. All endpoints are resolved relative to it.
    #[arg(long, env, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Where the access and refresh tokens are persisted between runs.
    /// Defaults to the platform data directory.
    #[arg(long, env)]
    session_file: Option<PathBuf>,

    /// Timeout in seconds for a single HTTP request
    #[arg(long, env, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Use the stored refresh token when a request comes back 401 or no access
    /// token is stored. Without it, expired sessions require logging in again.
    #[arg(long, env)]
    pub refresh_with_stored_token: bool,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Config {
    /// Load a `.env` file, if present, so its values act as environment fallbacks
    /// when the command line is parsed.
    pub fn load_dotenv() {
        dotenv().ok();
    }

    pub fn set_session_file(mut self, session_file: PathBuf) -> Self {
        self.session_file = Some(session_file);
        self
    }

    /// Returns the session file path, resolving the platform default when unset.
    pub fn session_file(&self) -> PathBuf {
        self.session_file.clone().unwrap_or_else(|| {
            ProjectDirs::from("dev", "taskdeck", "taskdeck")
                .map(|dirs| dirs.data_dir().join(SESSION_FILE_NAME))
                .unwrap_or_else(|| PathBuf::from(FALLBACK_SESSION_FILE))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
