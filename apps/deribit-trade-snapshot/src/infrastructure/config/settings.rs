//! Snapshot Configuration Settings
//!
//! Configuration types for the snapshot job, loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::application::services::CollectorSettings;
use crate::application::use_cases::FailurePolicy;

/// Largest page the Deribit history endpoint accepts.
const MAX_PAGE_SIZE: u32 = 1000;

/// GCS HMAC credentials for the S3-compatible XML API.
#[derive(Clone)]
pub struct HmacCredentials {
    access_key_id: String,
    secret: String,
}

impl HmacCredentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(access_key_id: String, secret: String) -> Self {
        Self {
            access_key_id,
            secret,
        }
    }

    /// Get the access key id.
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Get the secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for HmacCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacCredentials")
            .field("access_key_id", &"[REDACTED]")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Deribit endpoint settings.
#[derive(Debug, Clone)]
pub struct DeribitSettings {
    /// Host serving instrument discovery.
    pub api_host: String,
    /// Host serving trade history.
    pub history_host: String,
    /// Per-request timeout.
    pub http_timeout: Duration,
}

impl Default for DeribitSettings {
    fn default() -> Self {
        Self {
            api_host: "https://www.deribit.com".to_string(),
            history_host: "https://history.deribit.com".to_string(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

/// What to collect and how to paginate.
#[derive(Debug, Clone)]
pub struct CollectionSettings {
    /// Underlying currency.
    pub currency: String,
    /// Contract kind.
    pub kind: String,
    /// Trade history lookback in days.
    pub lookback_days: u32,
    /// Expiry selection horizon in days.
    pub expiry_horizon_days: u32,
    /// Trades per page (1..=1000).
    pub page_size: u32,
    /// Pause between page requests.
    pub page_delay: Duration,
    /// Maximum pages per instrument (0 = unlimited).
    pub max_pages: u32,
    /// Per-instrument failure handling.
    pub failure_policy: FailurePolicy,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            currency: "BTC".to_string(),
            kind: "option".to_string(),
            lookback_days: 7,
            expiry_horizon_days: 30,
            page_size: MAX_PAGE_SIZE,
            page_delay: Duration::from_millis(100),
            max_pages: 0, // Unlimited
            failure_policy: FailurePolicy::Abort,
        }
    }
}

/// Local output settings.
#[derive(Debug, Clone)]
pub struct OutputSettings {
    /// Local JSON document path.
    pub output_file: PathBuf,
    /// Prometheus textfile path, written at exit when set.
    pub metrics_file: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from("all_trades.json"),
            metrics_file: None,
        }
    }
}

/// Object store upload settings.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Upload switch.
    pub enabled: bool,
    /// Destination bucket.
    pub bucket: String,
    /// Key prefix inside the bucket.
    pub folder: String,
    /// S3-compatible endpoint.
    pub endpoint: String,
    /// Signing region.
    pub region: String,
    /// HMAC credentials, if provided.
    pub credentials: Option<HmacCredentials>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bucket: "anfi_json".to_string(),
            folder: "deribit_trades".to_string(),
            endpoint: "https://storage.googleapis.com".to_string(),
            region: "auto".to_string(),
            credentials: None,
        }
    }
}

impl UploadSettings {
    /// Credentials to upload with, or `None` when uploading is off.
    #[must_use]
    pub fn active_credentials(&self) -> Option<&HmacCredentials> {
        if self.enabled {
            self.credentials.as_ref()
        } else {
            None
        }
    }
}

/// Complete snapshot configuration.
#[derive(Debug, Clone, Default)]
pub struct SnapshotConfig {
    /// Deribit endpoints.
    pub deribit: DeribitSettings,
    /// Collection parameters.
    pub collection: CollectionSettings,
    /// Local outputs.
    pub output: OutputSettings,
    /// Object store upload.
    pub upload: UploadSettings,
}

impl SnapshotConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// Unset and blank variables fall back to their defaults, except
    /// `GCS_FOLDER`, where an explicit empty value means the bucket root.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let deribit_defaults = DeribitSettings::default();
        let deribit = DeribitSettings {
            api_host: env("DERIBIT_API_HOST").unwrap_or(deribit_defaults.api_host),
            history_host: env("DERIBIT_HISTORY_HOST").unwrap_or(deribit_defaults.history_host),
            http_timeout: parse_or(&env, "SNAPSHOT_HTTP_TIMEOUT_SECS", 30_u64)
                .map(Duration::from_secs)?,
        };

        let collection_defaults = CollectionSettings::default();
        let page_size = parse_or(&env, "SNAPSHOT_PAGE_SIZE", collection_defaults.page_size)?;
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::InvalidValue {
                key: "SNAPSHOT_PAGE_SIZE".to_string(),
                value: page_size.to_string(),
                reason: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }
        let failure_policy = match env("SNAPSHOT_FAILURE_POLICY") {
            None => collection_defaults.failure_policy,
            Some(raw) => FailurePolicy::parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "SNAPSHOT_FAILURE_POLICY".to_string(),
                value: raw,
                reason: "expected `abort` or `isolate`".to_string(),
            })?,
        };
        let collection = CollectionSettings {
            currency: env("SNAPSHOT_CURRENCY").unwrap_or(collection_defaults.currency),
            kind: env("SNAPSHOT_KIND").unwrap_or(collection_defaults.kind),
            lookback_days: parse_or(
                &env,
                "SNAPSHOT_LOOKBACK_DAYS",
                collection_defaults.lookback_days,
            )?,
            expiry_horizon_days: parse_or(
                &env,
                "SNAPSHOT_EXPIRY_HORIZON_DAYS",
                collection_defaults.expiry_horizon_days,
            )?,
            page_size,
            page_delay: parse_or(&env, "SNAPSHOT_PAGE_DELAY_MS", 100_u64)
                .map(Duration::from_millis)?,
            max_pages: parse_or(&env, "SNAPSHOT_MAX_PAGES", collection_defaults.max_pages)?,
            failure_policy,
        };

        let output = OutputSettings {
            output_file: env("SNAPSHOT_OUTPUT_FILE")
                .map_or_else(|| OutputSettings::default().output_file, PathBuf::from),
            metrics_file: env("SNAPSHOT_METRICS_FILE").map(PathBuf::from),
        };

        let upload_defaults = UploadSettings::default();
        let credentials = match (env("GCS_HMAC_ACCESS_KEY_ID"), env("GCS_HMAC_SECRET")) {
            (Some(id), Some(secret)) => Some(HmacCredentials::new(id, secret)),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("GCS_HMAC_SECRET".to_string())),
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar("GCS_HMAC_ACCESS_KEY_ID".to_string()));
            }
        };
        let upload = UploadSettings {
            enabled: parse_bool_or(&env, "SNAPSHOT_UPLOAD_ENABLED", upload_defaults.enabled)?,
            bucket: env("GCS_BUCKET").unwrap_or(upload_defaults.bucket),
            folder: lookup("GCS_FOLDER").map_or(upload_defaults.folder, |v| v.trim().to_string()),
            endpoint: env("GCS_ENDPOINT").unwrap_or(upload_defaults.endpoint),
            region: env("GCS_REGION").unwrap_or(upload_defaults.region),
            credentials,
        };

        Ok(Self {
            deribit,
            collection,
            output,
            upload,
        })
    }

    /// Collector tuning derived from the collection settings.
    #[must_use]
    pub const fn collector_settings(&self) -> CollectorSettings {
        CollectorSettings {
            page_size: self.collection.page_size,
            page_delay: self.collection.page_delay,
            max_pages: self.collection.max_pages,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable could not be interpreted.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
        /// What was expected.
        reason: String,
    },
}

fn parse_or<T, F>(env: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    env(key).map_or(Ok(default), |raw| {
        raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
    })
}

fn parse_bool_or<F>(env: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = env(key) else {
        return Ok(default);
    };
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
            reason: "expected a boolean".to_string(),
        }),
    }
}
