use std::path::PathBuf;

pub const REGION_ENV: &str = "SIGN_XPI_REGION";
pub const SCRATCH_DIR_ENV: &str = "SIGN_XPI_SCRATCH_DIR";

/// Settings read once at cold start and shared by every invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Region for the S3 client. `None` defers to the AWS default provider chain.
    pub region: Option<String>,
    /// Directory for scratch buffers. `None` uses the system temp directory.
    pub scratch_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConfigError {}

impl HandlerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let scratch_dir = read(SCRATCH_DIR_ENV).map(PathBuf::from);
        if let Some(dir) = &scratch_dir {
            if !dir.is_dir() {
                return Err(ConfigError::new(format!(
                    "{SCRATCH_DIR_ENV} must name an existing directory: {}",
                    dir.display()
                )));
            }
        }

        Ok(Self {
            region: read(REGION_ENV),
            scratch_dir,
        })
    }
}
