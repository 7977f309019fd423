use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub allowed_hooks_secret_id: String,
    pub jobs: JobSettings,
}

/// Naming and routing of submitted Batch jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSettings {
    pub definition_prefix: String,
    pub name_prefix: String,
    pub queue: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            allowed_hooks_secret_id: required("ALLOWED_WEBHOOK_UUIDS_SECRET_ID")?,
            jobs: JobSettings {
                definition_prefix: required("JOB_DEFINITION_NAME_PREFIX")?,
                name_prefix: required("JOB_NAME_PREFIX")?,
                queue: required("JOB_QUEUE_ARN")?,
            },
        })
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{} must be set", name))
}
