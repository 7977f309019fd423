use serde::Serialize;

use crate::directive::{extract, Keyword};
use crate::error::{HookError, Result};

pub const ENV_JOB_ARGS: &str = "ACME_RUN_ARGS";
pub const ENV_RUN_EXP: &str = "ACME_RUN_EXP";
const GPU_FALLBACK: &str = "1";

/// Container overrides derived from the directives of one commit message.
///
/// Absent fields are left out of the serialized form; the lists are only
/// ever present when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcpus: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_requirements: Option<Vec<ResourceRequirement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Vec<EnvironmentVariable>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRequirement {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceKind {
    #[serde(rename = "GPU")]
    Gpu,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
}

impl EnvironmentVariable {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

impl JobOverrides {
    pub fn is_empty(&self) -> bool {
        self == &JobOverrides::default()
    }

    /// Build the overrides for a commit message.
    pub fn from_message(message: &str) -> Result<Self> {
        let mut overrides = JobOverrides {
            memory: parse_integer(Keyword::Memory, message)?,
            vcpus: parse_integer(Keyword::Vcpus, message)?,
            ..Default::default()
        };

        if let Some(gpus) = extract(Keyword::Gpus, message, Some(GPU_FALLBACK)) {
            overrides.resource_requirements = Some(vec![ResourceRequirement {
                kind: ResourceKind::Gpu,
                value: gpus,
            }]);
        }

        let mut environment = Vec::new();
        // An empty run line triggers the job but passes no arguments.
        if let Some(args) = extract(Keyword::RunJob, message, None).filter(|a| !a.is_empty()) {
            environment.push(EnvironmentVariable::new(ENV_JOB_ARGS, args));
        }
        if extract(Keyword::RunExp, message, None).is_some() {
            environment.push(EnvironmentVariable::new(ENV_RUN_EXP, "1"));
        }
        if !environment.is_empty() {
            overrides.environment = Some(environment);
        }

        Ok(overrides)
    }
}

fn parse_integer(keyword: Keyword, message: &str) -> Result<Option<i32>> {
    match extract(keyword, message, None) {
        Some(value) if !value.is_empty() => ungroup_digits(&value)
            .and_then(|digits| digits.parse().ok())
            .map(Some)
            .ok_or_else(|| HookError::InvalidOverrideValue {
                keyword: keyword.as_str(),
                value,
            }),
        _ => Ok(None),
    }
}

/// Drop `_` separators between digits, as in `8_192`.
///
/// A separator at either end of the digits or next to another one is rejected.
fn ungroup_digits(value: &str) -> Option<String> {
    let digits = value.trim_start_matches(['+', '-']);
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    Some(value.replace('_', ""))
}
