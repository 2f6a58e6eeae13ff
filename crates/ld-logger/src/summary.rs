//! Shutdown report.

use serde::Serialize;

/// Count of stored payloads and the most frequent one, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of stored payloads.
    pub count: usize,
    /// Most frequent payload, decoded lossily as UTF-8.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common: Option<String>,
    /// How often `most_common` occurred.
    pub occurrences: usize,
}

impl Summary {
    pub fn empty() -> Self {
        Self {
            count: 0,
            most_common: None,
            occurrences: 0,
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number of messages: {}", self.count)?;
        match &self.most_common {
            Some(payload) => write!(f, "The most frequent message is: \"{payload}\""),
            None => f.write_str("No messages were received"),
        }
    }
}
