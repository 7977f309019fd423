use async_trait::async_trait;
use aws_sdk_batch::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_batch::types::{ContainerOverrides, KeyValuePair, ResourceRequirement, ResourceType};

use crate::auth::SecretStore;
use crate::dispatcher::{JobQueue, JobSubmission};
use crate::error::ServiceError;
use crate::overrides::{JobOverrides, ResourceKind};

pub struct BatchJobQueue {
    client: aws_sdk_batch::Client,
}

impl BatchJobQueue {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_batch::Client::new(config),
        }
    }
}

#[async_trait]
impl JobQueue for BatchJobQueue {
    async fn submit(&self, job: &JobSubmission) -> Result<String, ServiceError> {
        let container_overrides = job
            .container_overrides
            .as_ref()
            .map(to_container_overrides);

        let output = self
            .client
            .submit_job()
            .job_definition(&job.job_definition)
            .job_name(&job.job_name)
            .job_queue(&job.job_queue)
            .set_parameters(Some(job.parameters.clone().into_iter().collect()))
            .set_container_overrides(container_overrides)
            .send()
            .await
            .map_err(|e| service_error("SubmitJob", e))?;

        output
            .job_id()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::new("SubmitJob", "MissingJobId", &job.job_name))
    }
}

fn to_container_overrides(overrides: &JobOverrides) -> ContainerOverrides {
    let resources = overrides.resource_requirements.as_ref().map(|requirements| {
        requirements
            .iter()
            .map(|r| {
                let kind = match r.kind {
                    ResourceKind::Gpu => ResourceType::Gpu,
                };
                ResourceRequirement::builder().r#type(kind).value(&r.value).build()
            })
            .collect()
    });

    let environment = overrides.environment.as_ref().map(|vars| {
        vars.iter()
            .map(|v| KeyValuePair::builder().name(&v.name).value(&v.value).build())
            .collect()
    });

    // Batch deprecates the flat memory/vcpus fields but still honors them.
    ContainerOverrides::builder()
        .set_memory(overrides.memory)
        .set_vcpus(overrides.vcpus)
        .set_resource_requirements(resources)
        .set_environment(environment)
        .build()
}

pub struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerStore {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_secretsmanager::Client::new(config),
        }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn secret_string(&self, secret_id: &str) -> Result<String, ServiceError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| service_error("GetSecretValue", e))?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::new("GetSecretValue", "MissingSecretString", secret_id))
    }
}

/// Classify an SDK failure by its service error code, or by how the call failed.
fn service_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let kind = match &err {
        SdkError::ServiceError(context) => context.err().code().unwrap_or("ServiceError"),
        SdkError::TimeoutError(_) => "TimeoutError",
        SdkError::DispatchFailure(_) => "DispatchFailure",
        SdkError::ResponseError(_) => "ResponseError",
        SdkError::ConstructionFailure(_) => "ConstructionFailure",
        _ => "SdkError",
    }
    .to_string();

    ServiceError::new(operation, kind, DisplayErrorContext(&err).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_overrides_from_directives() {
        let overrides =
            JobOverrides::from_message(":ACME_RUN: train\n:ACME_RUN_EXP:\n:ACME_GPUS: 2\n:ACME_MEMORY: 8192")
                .unwrap();
        let container = to_container_overrides(&overrides);

        assert_eq!(container.memory(), Some(8192));
        assert_eq!(container.vcpus(), None);

        let resources = container.resource_requirements();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].r#type(), Some(&ResourceType::Gpu));
        assert_eq!(resources[0].value(), Some("2"));

        let environment: Vec<_> = container
            .environment()
            .iter()
            .map(|kv| (kv.name(), kv.value()))
            .collect();
        assert_eq!(
            environment,
            [
                (Some("ACME_RUN_ARGS"), Some("train")),
                (Some("ACME_RUN_EXP"), Some("1")),
            ]
        );
    }

    #[test]
    fn test_container_overrides_leave_unset_fields_empty() {
        let overrides = JobOverrides::from_message(":ACME_RUN:\n:ACME_VCPUS: 4").unwrap();
        let container = to_container_overrides(&overrides);

        assert_eq!(container.vcpus(), Some(4));
        assert_eq!(container.memory(), None);
        assert!(container.resource_requirements().is_empty());
        assert!(container.environment().is_empty());
    }

    #[test]
    fn test_empty_overrides_are_not_sent() {
        let settings = crate::config::JobSettings {
            definition_prefix: "def".into(),
            name_prefix: "P".into(),
            queue: "queue".into(),
        };
        let request = crate::changes::JobRequest {
            branch: "main".into(),
            commit_hash: "1234567".into(),
            overrides: JobOverrides::from_message(":ACME_RUN:").unwrap(),
        };

        let job = settings.submission("test-repo", request);
        assert!(job.container_overrides.is_none());
    }
}
