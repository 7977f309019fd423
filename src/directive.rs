use regex::Regex;
use std::sync::OnceLock;

/// Keywords recognized as `:<KEYWORD>:<value>` lines in a commit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    RunJob,
    RunExp,
    Memory,
    Vcpus,
    Gpus,
}

impl Keyword {
    pub const ALL: [Keyword; 5] = [
        Keyword::RunJob,
        Keyword::RunExp,
        Keyword::Memory,
        Keyword::Vcpus,
        Keyword::Gpus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::RunJob => "ACME_RUN",
            Keyword::RunExp => "ACME_RUN_EXP",
            Keyword::Memory => "ACME_MEMORY",
            Keyword::Vcpus => "ACME_VCPUS",
            Keyword::Gpus => "ACME_GPUS",
        }
    }

    fn pattern(self) -> &'static Regex {
        static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
        let patterns = PATTERNS.get_or_init(|| {
            Keyword::ALL
                .iter()
                .map(|k| {
                    Regex::new(&format!(r"(?m)^:{}:(.*?)$", regex::escape(k.as_str())))
                        .expect("directive pattern is a valid regex")
                })
                .collect()
        });
        &patterns[self as usize]
    }
}

/// Marker whose presence anywhere in a commit message makes the commit eligible for a job.
pub const RUN_TRIGGER: &str = ":ACME_RUN:";

/// Find the first `:<keyword>:` line in `text` and return its trimmed value.
///
/// Returns `None` when no line starts with the marker. An empty value is
/// replaced by `fallback` when one is given.
pub fn extract(keyword: Keyword, text: &str, fallback: Option<&str>) -> Option<String> {
    let captures = keyword.pattern().captures(text)?;
    let capture = captures.get(1).map_or("", |m| m.as_str()).trim();

    match fallback {
        Some(fallback) if capture.is_empty() => Some(fallback.to_string()),
        _ => Some(capture.to_string()),
    }
}
