use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::changes::JobRequest;
use crate::config::JobSettings;
use crate::error::{Result, ServiceError};
use crate::overrides::JobOverrides;

pub const PARAM_BRANCH_NAME: &str = "branchName";
pub const PARAM_REPOSITORY_NAME: &str = "repositoryName";

const SHORT_HASH_LEN: usize = 7;

/// A fully resolved `SubmitJob` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSubmission {
    pub job_definition: String,
    pub job_name: String,
    pub job_queue: String,
    pub parameters: BTreeMap<String, String>,
    pub container_overrides: Option<JobOverrides>,
}

/// Queue that accepts job submissions and returns the new job id.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn submit(&self, job: &JobSubmission) -> std::result::Result<String, ServiceError>;
}

impl JobSettings {
    pub fn job_definition(&self, repository: &str) -> String {
        format!("{}-{}", self.definition_prefix, repository)
    }

    pub fn job_name(&self, repository: &str, commit_hash: &str) -> String {
        let short_hash = commit_hash
            .char_indices()
            .nth(SHORT_HASH_LEN)
            .map_or(commit_hash, |(idx, _)| &commit_hash[..idx]);
        format!("{}-{}-{}", self.name_prefix, repository, short_hash)
    }

    pub fn submission(&self, repository: &str, request: JobRequest) -> JobSubmission {
        let parameters = BTreeMap::from([
            (PARAM_BRANCH_NAME.to_string(), request.branch),
            (PARAM_REPOSITORY_NAME.to_string(), repository.to_string()),
        ]);

        JobSubmission {
            job_definition: self.job_definition(repository),
            job_name: self.job_name(repository, &request.commit_hash),
            job_queue: self.queue.clone(),
            parameters,
            container_overrides: Some(request.overrides).filter(|o| !o.is_empty()),
        }
    }
}

/// Submit one job per request, in order, stopping at the first failure.
///
/// Jobs submitted before a failure stay submitted. Job names are derived from
/// the repository and commit, so redelivering the whole push is safe to retry.
pub async fn dispatch(
    queue: &dyn JobQueue,
    settings: &JobSettings,
    repository: &str,
    requests: Vec<JobRequest>,
) -> Result<Vec<String>> {
    let mut job_ids = Vec::with_capacity(requests.len());

    for request in requests {
        let job = settings.submission(repository, request);
        let job_id = queue.submit(&job).await?;
        tracing::info!("Submitted job {} ({}) to {}", job.job_name, job_id, job.job_queue);
        job_ids.push(job_id);
    }

    Ok(job_ids)
}
