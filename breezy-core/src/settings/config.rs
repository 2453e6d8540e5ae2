use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_server_url() -> String {
    "http://localhost:50000".to_string()
}

fn default_openai_url() -> String {
    "http://localhost:8080/v1".to_string()
}

fn default_model() -> String {
    "tts-1".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

/// The BreezyVoice inference server (`/inference_sft`, `/add_speaker`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_url")]
    pub base_url: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: default_server_url(),
        }
    }
}

/// The OpenAI-compatible server (`/audio/speech`, `/models`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default = "default_openai_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: default_openai_url(),
            api_key: None,
            model: default_model(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Where synthesized audio is written when no explicit path is given
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,

    /// Play audio after synthesis (needs the `playback` feature)
    #[serde(default)]
    pub autoplay: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            autoplay: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Speaker used when a command doesn't name one
    #[serde(default)]
    pub default_speaker: Option<String>,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub openai: OpenAiSettings,

    #[serde(default)]
    pub output: OutputSettings,
}
