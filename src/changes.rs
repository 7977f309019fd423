use crate::directive::RUN_TRIGGER;
use crate::error::Result;
use crate::models::Change;
use crate::overrides::JobOverrides;

/// A pushed commit that asked for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub branch: String,
    pub commit_hash: String,
    pub overrides: JobOverrides,
}

/// Keep the changes whose head commit carries the run trigger, in payload order.
///
/// Deleted refs and changes without a branch name or commit hash are skipped.
/// The first commit with an unparsable override fails the whole push.
pub fn filter_changes(changes: &[Change]) -> Result<Vec<JobRequest>> {
    let mut requests = Vec::new();

    for change in changes {
        let (Some(branch), Some(commit_hash)) = (change.branch_name(), change.commit_hash()) else {
            continue;
        };
        if branch.is_empty() || commit_hash.is_empty() {
            continue;
        }

        let message = change.commit_message();
        if !message.contains(RUN_TRIGGER) {
            tracing::debug!("Commit {} on {} has no run trigger, skipping", commit_hash, branch);
            continue;
        }

        requests.push(JobRequest {
            branch: branch.to_string(),
            commit_hash: commit_hash.to_string(),
            overrides: JobOverrides::from_message(message)?,
        });
    }

    Ok(requests)
}
