use serde::Deserialize;

/// Bitbucket `repo:push` payload, reduced to the fields the hook reads.
#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    pub repository: Repository,
    pub push: Push,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Push {
    pub changes: Vec<Change>,
}

/// One ref update. `new` is null when the ref was deleted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub new: Option<RefState>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefState {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub target: Option<CommitTarget>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitTarget {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl Change {
    pub fn branch_name(&self) -> Option<&str> {
        self.new.as_ref()?.name.as_deref()
    }

    pub fn commit_hash(&self) -> Option<&str> {
        self.new.as_ref()?.target.as_ref()?.hash.as_deref()
    }

    pub fn commit_message(&self) -> &str {
        self.new
            .as_ref()
            .and_then(|state| state.target.as_ref())
            .map_or("", |target| target.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_push_event() {
        let body = r#"{
            "repository": {"name": "test-repo"},
            "push": {"changes": [
                {"new": null},
                {"new": {"name": "main", "target": {"hash": "abc123", "message": "hi"}}}
            ]}
        }"#;

        let event: PushEvent = serde_json::from_str(body).unwrap();
        assert_eq!(event.repository.name, "test-repo");
        assert_eq!(event.push.changes.len(), 2);
        assert_eq!(event.push.changes[0].branch_name(), None);
        assert_eq!(event.push.changes[1].branch_name(), Some("main"));
        assert_eq!(event.push.changes[1].commit_hash(), Some("abc123"));
        assert_eq!(event.push.changes[1].commit_message(), "hi");
    }

    #[test]
    fn test_missing_message_defaults_to_empty() {
        let change: Change =
            serde_json::from_str(r#"{"new": {"name": "main", "target": {"hash": "abc"}}}"#).unwrap();
        assert_eq!(change.commit_message(), "");
    }

    #[test]
    fn test_missing_repository_is_an_error() {
        let result = serde_json::from_str::<PushEvent>(r#"{"push": {"changes": []}}"#);
        assert!(result.is_err());
    }
}
