use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::recruitment::domain::ActorRole;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pipeline: PipelineConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let levels = match env::var("APP_INTERVIEW_LEVELS") {
            Ok(raw) => parse_levels(&raw)?,
            Err(_) => PipelineConfig::default_levels(),
        };

        let access_tokens = match env::var("APP_ACCESS_TOKENS") {
            Ok(raw) => parse_access_tokens(&raw)?,
            Err(_) => AuthConfig::development_tokens(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pipeline: PipelineConfig { levels },
            auth: AuthConfig { access_tokens },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Interview level identifiers, lowest stage first.
///
/// `APP_INTERVIEW_LEVELS` overrides the default scheme with a comma
/// separated list, e.g. `L0,L1,L2`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub levels: Vec<String>,
}

impl PipelineConfig {
    fn default_levels() -> Vec<String> {
        (0..7).map(|stage| format!("L{stage}")).collect()
    }
}

fn parse_levels(raw: &str) -> Result<Vec<String>, ConfigError> {
    let levels: Vec<String> = raw
        .split(',')
        .map(|level| level.trim().to_string())
        .filter(|level| !level.is_empty())
        .collect();
    if levels.is_empty() {
        return Err(ConfigError::InvalidLevels);
    }
    Ok(levels)
}

/// Static bearer-token directory standing in for the external
/// authentication service during local runs.
///
/// `APP_ACCESS_TOKENS` holds comma separated `token:actor-id:Display
/// Name:Role` entries; the display name segment may be omitted.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_tokens: Vec<AccessTokenEntry>,
}

#[derive(Debug, Clone)]
pub struct AccessTokenEntry {
    pub token: String,
    pub actor_id: String,
    pub display_name: String,
    pub role: ActorRole,
}

impl AuthConfig {
    /// Well-known local tokens, one per role. Never used when
    /// `APP_ACCESS_TOKENS` is set.
    pub fn development_tokens() -> Vec<AccessTokenEntry> {
        [
            ("admin-token", "admin-1", "Avery Admin", ActorRole::Admin),
            (
                "initiator-token",
                "initiator-1",
                "Isha Initiator",
                ActorRole::ProjectInitiator,
            ),
            (
                "lead-token",
                "lead-1",
                "Lee Lead",
                ActorRole::RecruiterLead,
            ),
            (
                "recruiter-token",
                "recruiter-1",
                "Riley Recruiter",
                ActorRole::Recruiter,
            ),
        ]
        .into_iter()
        .map(|(token, actor_id, display_name, role)| AccessTokenEntry {
            token: token.to_string(),
            actor_id: actor_id.to_string(),
            display_name: display_name.to_string(),
            role,
        })
        .collect()
    }
}

fn parse_access_tokens(raw: &str) -> Result<Vec<AccessTokenEntry>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let fields: Vec<&str> = entry.split(':').map(str::trim).collect();
            let (token, actor_id, display_name, role) = match fields.as_slice() {
                [token, actor_id, role] => (*token, *actor_id, *actor_id, *role),
                [token, actor_id, display_name, role] => {
                    (*token, *actor_id, *display_name, *role)
                }
                _ => {
                    return Err(ConfigError::InvalidAccessToken {
                        entry: entry.to_string(),
                    })
                }
            };
            if token.is_empty() || actor_id.is_empty() {
                return Err(ConfigError::InvalidAccessToken {
                    entry: entry.to_string(),
                });
            }
            let role = ActorRole::parse(role).ok_or_else(|| ConfigError::InvalidRole {
                value: role.to_string(),
            })?;
            Ok(AccessTokenEntry {
                token: token.to_string(),
                actor_id: actor_id.to_string(),
                display_name: display_name.to_string(),
                role,
            })
        })
        .collect()
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLevels,
    InvalidAccessToken { entry: String },
    InvalidRole { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLevels => {
                write!(
                    f,
                    "APP_INTERVIEW_LEVELS must list at least one non-empty level"
                )
            }
            ConfigError::InvalidAccessToken { entry } => {
                write!(
                    f,
                    "APP_ACCESS_TOKENS entry '{entry}' must be token:actor-id[:display-name]:role"
                )
            }
            ConfigError::InvalidRole { value } => {
                write!(f, "'{value}' is not a recognized role label")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
