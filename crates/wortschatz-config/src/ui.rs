use serde::{Deserialize, Serialize};

fn default_notice_ttl_ms() -> u64 {
    2500
}

fn default_suggested_words() -> Vec<String> {
    ["Haus", "Auto", "Lernen", "Sprache", "Essen", "Schule", "Arbeit", "Zeit"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UiConfig {
    /// How long a transient notification stays visible
    #[serde(default = "default_notice_ttl_ms")]
    pub notice_ttl_ms: u64,
    /// Starter words offered when the search view is empty
    #[serde(default = "default_suggested_words")]
    pub suggested_words: Vec<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notice_ttl_ms: default_notice_ttl_ms(),
            suggested_words: default_suggested_words(),
        }
    }
}

impl UiConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
