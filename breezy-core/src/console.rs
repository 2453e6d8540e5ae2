//! The console's request handlers: synthesize, add/remove speakers and
//! search the cached speaker list.
//!
//! Each form carries its own loading flag. While a form's request is in
//! flight a second submit of the same form is refused with
//! [`ConsoleError::Busy`]; other forms are unaffected. The speaker cache is
//! replaced by every successful list fetch and left alone by failed ones.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::error::ApiError;
use crate::api::provider::SpeechBackend;
use crate::api::types::PromptAudio;
use crate::audio::wav::{pcm_to_wav, ContainerError, WavContainer};
use crate::speakers::SpeakerRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Synthesize,
    AddSpeaker,
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Form::Synthesize => write!(f, "synthesize"),
            Form::AddSpeaker => write!(f, "add speaker"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("the {0} form is still waiting for the server")]
    Busy(Form),

    #[error("no speaker selected")]
    MissingSpeaker,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Container(#[from] ContainerError),
}

/// Clears the form's loading flag when dropped
struct Loading<'a> {
    flag: &'a AtomicBool,
}

impl<'a> Loading<'a> {
    fn start(flag: &'a AtomicBool, form: Form) -> Result<Self, ConsoleError> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ConsoleError::Busy(form))?;
        Ok(Self { flag })
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

pub struct Console {
    backend: Arc<dyn SpeechBackend>,
    registry: Mutex<SpeakerRegistry>,
    query: Mutex<String>,
    synthesizing: AtomicBool,
    adding_speaker: AtomicBool,
}

impl Console {
    pub fn new(backend: Arc<dyn SpeechBackend>) -> Self {
        Self {
            backend,
            registry: Mutex::new(SpeakerRegistry::default()),
            query: Mutex::new(String::new()),
            synthesizing: AtomicBool::new(false),
            adding_speaker: AtomicBool::new(false),
        }
    }

    fn flag(&self, form: Form) -> &AtomicBool {
        match form {
            Form::Synthesize => &self.synthesizing,
            Form::AddSpeaker => &self.adding_speaker,
        }
    }

    pub fn is_loading(&self, form: Form) -> bool {
        self.flag(form).load(Ordering::SeqCst)
    }

    /// Synthesize `text` with `speaker_id` and wrap the PCM in a WAV container
    pub async fn synthesize(
        &self,
        text: &str,
        speaker_id: &str,
    ) -> Result<WavContainer, ConsoleError> {
        if speaker_id.trim().is_empty() {
            return Err(ConsoleError::MissingSpeaker);
        }
        let _loading = Loading::start(self.flag(Form::Synthesize), Form::Synthesize)?;

        let audio = self.backend.synthesize(text, speaker_id).await?;
        let wav = pcm_to_wav(&audio.pcm_data)?;
        info!(
            speaker_id,
            bytes = audio.pcm_data.len(),
            seconds = audio.duration_secs(),
            "synthesized"
        );
        Ok(wav)
    }

    /// Register a speaker, then reload the list
    pub async fn add_speaker(
        &self,
        speaker_id: &str,
        prompt: &PromptAudio,
        prompt_text: Option<&str>,
    ) -> Result<String, ConsoleError> {
        let _loading = Loading::start(self.flag(Form::AddSpeaker), Form::AddSpeaker)?;

        let message = self
            .backend
            .add_speaker(speaker_id, prompt, prompt_text)
            .await?;
        if let Err(e) = self.refresh().await {
            debug!(error = %e, speaker_id, "speaker list not reloaded");
        }
        Ok(message)
    }

    /// Delete a speaker, then reload the list. Confirmation is the caller's job.
    pub async fn remove_speaker(&self, speaker_id: &str) -> Result<String, ConsoleError> {
        let message = self.backend.remove_speaker(speaker_id).await?;
        if let Err(e) = self.refresh().await {
            debug!(error = %e, speaker_id, "speaker list not reloaded");
        }
        Ok(message)
    }

    /// Fetch the speaker list and return it filtered by the current query.
    /// On failure the previous list is kept.
    pub async fn refresh(&self) -> Result<Vec<String>, ConsoleError> {
        match self.backend.list_speakers().await {
            Ok(speakers) => {
                self.registry.lock().unwrap().replace(speakers);
                Ok(self.visible())
            }
            Err(e) => {
                warn!(error = %e, "failed to load speaker list");
                Err(e.into())
            }
        }
    }

    /// Set the search query and return the matching speakers
    pub fn search(&self, query: &str) -> Vec<String> {
        *self.query.lock().unwrap() = query.to_string();
        self.visible()
    }

    /// Speakers matching the current query
    pub fn visible(&self) -> Vec<String> {
        let query = self.query.lock().unwrap().clone();
        self.registry
            .lock()
            .unwrap()
            .search(&query)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn speakers(&self) -> Vec<String> {
        self.registry.lock().unwrap().all().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockBackend, MockBehavior};

    fn console_with(backend: &Arc<MockBackend>) -> Console {
        Console::new(backend.clone())
    }

    #[tokio::test]
    async fn busy_form_refuses_second_submit() {
        let backend = Arc::new(MockBackend::new(&["alice"]));
        let console = console_with(&backend);

        let loading = Loading::start(console.flag(Form::Synthesize), Form::Synthesize).unwrap();
        let err = console.synthesize("hi", "alice").await.unwrap_err();
        assert!(matches!(err, ConsoleError::Busy(Form::Synthesize)));
        assert!(backend.calls().is_empty());

        drop(loading);
        assert!(!console.is_loading(Form::Synthesize));
        console.synthesize("hi", "alice").await.unwrap();
    }

    #[tokio::test]
    async fn busy_synthesize_does_not_block_add_speaker() {
        let backend = Arc::new(MockBackend::new(&[]));
        let console = console_with(&backend);

        let _loading = Loading::start(console.flag(Form::Synthesize), Form::Synthesize).unwrap();
        let prompt = PromptAudio::new("carol.wav", vec![0; 4]);
        console.add_speaker("carol", &prompt, None).await.unwrap();
        assert!(!console.is_loading(Form::AddSpeaker));
    }

    #[tokio::test]
    async fn flag_is_cleared_after_failure() {
        let backend = Arc::new(MockBackend::new(&["alice"]));
        backend.set_behavior(MockBehavior::Unavailable);
        let console = console_with(&backend);

        assert!(console.synthesize("hi", "alice").await.is_err());
        assert!(!console.is_loading(Form::Synthesize));
    }

    #[tokio::test]
    async fn empty_speaker_is_rejected_locally() {
        let backend = Arc::new(MockBackend::new(&["alice"]));
        let console = console_with(&backend);

        let err = console.synthesize("hi", "  ").await.unwrap_err();
        assert!(matches!(err, ConsoleError::MissingSpeaker));
        assert!(backend.calls().is_empty());
    }
}
