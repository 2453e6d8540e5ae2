pub mod api;
pub mod audio;
pub mod console;
pub mod settings;
pub mod speakers;

// Public library API - the types most callers need to drive a BreezyVoice
// server without reaching into submodules.
pub use api::client::BreezyClient;
pub use api::error::ApiError;
pub use api::provider::SpeechBackend;
pub use audio::wav::{pcm_to_wav, WavContainer};
pub use audio::{AudioData, AudioProfile};
pub use console::{Console, ConsoleError};
pub use settings::{Settings, SettingsManager};
pub use speakers::SpeakerRegistry;
