use serde::{Deserialize, Serialize};
use std::fs;

pub const DEFAULT_THINGPEDIA_URL: &str = "https://thingpedia.stanford.edu/thingpedia";
pub const DEFAULT_LOCALE: &str = "en-US";

/// Settings shared by the catalog client and the front ends.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BuilderConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub developer_key: Option<String>,
    #[serde(default = "default_thingpedia_url")]
    pub thingpedia_url: String,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_thingpedia_url() -> String {
    DEFAULT_THINGPEDIA_URL.to_string()
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            developer_key: None,
            thingpedia_url: default_thingpedia_url(),
        }
    }
}

impl BuilderConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }
}
