use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use breezy_core::api::openai::OpenAiSpeechClient;
use breezy_core::api::types::PromptAudio;
use breezy_core::audio::wav::pcm_to_wav;
use breezy_core::audio::AudioData;
use breezy_core::settings::{Settings, SettingsManager};
use breezy_core::{BreezyClient, Console, WavContainer};

/// Everything a command needs: settings, the HTTP clients and the console
/// state wrapped around them
pub struct App {
    settings: Settings,
    client: Arc<BreezyClient>,
    console: Console,
}

impl App {
    pub fn new(settings_path: Option<PathBuf>, server: Option<String>) -> Result<Self> {
        let manager = match settings_path {
            Some(path) => SettingsManager::from_path(path)?,
            None => SettingsManager::new()?,
        };
        if let Some(url) = server {
            manager.update_setting(|settings| settings.server.base_url = url);
        }
        let settings = manager.settings();

        let client = Arc::new(BreezyClient::from_settings(&settings.server));
        info!(server = client.base_url(), "using inference server");
        let console = Console::new(client.clone());

        Ok(Self {
            settings,
            client,
            console,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Resolve the speaker to synthesize with, falling back to the configured default
    pub fn speaker_or_default(&self, speaker: Option<String>) -> Result<String> {
        speaker
            .or_else(|| self.settings.default_speaker.clone())
            .context("no speaker given and no default_speaker configured")
    }

    pub async fn say(
        &self,
        text: &str,
        speaker_id: &str,
        output: Option<PathBuf>,
        play: bool,
    ) -> Result<PathBuf> {
        let wav = self.console.synthesize(text, speaker_id).await?;
        let path = output.unwrap_or_else(|| self.default_output(speaker_id));
        write_wav(&path, wav.as_bytes()).await?;
        if play || self.settings.output.autoplay {
            play_container(&wav).await?;
        }
        Ok(path)
    }

    pub async fn clone_voice(
        &self,
        text: &str,
        prompt_wav: &Path,
        prompt_text: &str,
        output: Option<PathBuf>,
    ) -> Result<PathBuf> {
        let prompt = PromptAudio::from_path(prompt_wav).await?;
        let audio = self
            .client
            .synthesize_zero_shot(text, prompt_text, &prompt)
            .await?;
        let wav = pcm_to_wav(&audio.pcm_data)?;
        let path = output.unwrap_or_else(|| self.default_output("zero-shot"));
        write_wav(&path, wav.as_bytes()).await?;
        Ok(path)
    }

    pub async fn speech(&self, text: &str, speed: f32, output: Option<PathBuf>) -> Result<PathBuf> {
        let client = OpenAiSpeechClient::new(&self.settings.openai);
        let bytes = client.speech(text, speed).await?;
        let path = output.unwrap_or_else(|| self.default_output("speech"));
        write_wav(&path, &bytes).await?;
        Ok(path)
    }

    pub async fn models(&self) -> Result<Vec<String>> {
        let client = OpenAiSpeechClient::new(&self.settings.openai);
        Ok(client.models().await?)
    }

    pub async fn add_speaker(
        &self,
        speaker_id: &str,
        wav: &Path,
        text: Option<&str>,
    ) -> Result<String> {
        let prompt = PromptAudio::from_path(wav).await?;
        Ok(self.console.add_speaker(speaker_id, &prompt, text).await?)
    }

    fn default_output(&self, stem: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        self.settings
            .output
            .directory
            .join(format!("{}-{stamp}.wav", sanitize(stem)))
    }
}

/// Keep speaker ids usable as file names
fn sanitize(stem: &str) -> String {
    stem.chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect()
}

async fn write_wav(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {parent:?}"))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write audio to {path:?}"))?;
    info!(path = ?path, bytes = bytes.len(), "wrote audio");
    Ok(())
}

#[cfg(feature = "playback")]
async fn play_container(wav: &WavContainer) -> Result<()> {
    use breezy_core::audio::playback::AudioPlayer;

    let audio = AudioData::new(wav.pcm().to_vec());
    let player = AudioPlayer::new()?;
    let playback = player.play(&audio)?;
    playback.wait().await;
    Ok(())
}

#[cfg(not(feature = "playback"))]
async fn play_container(wav: &WavContainer) -> Result<()> {
    let audio = AudioData::new(wav.pcm().to_vec());
    tracing::warn!(
        seconds = audio.duration_secs(),
        "built without the playback feature, audio was only written to disk"
    );
    eprintln!("playback unavailable: rebuild with --features playback");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize("a/b\\c"), "a_b_c");
        assert_eq!(sanitize("臺灣女"), "臺灣女");
    }
}
