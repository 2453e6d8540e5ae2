//! HTTP access to the BreezyVoice inference server and its OpenAI-compatible
//! sibling

pub mod client;
pub mod error;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod types;

#[cfg(test)]
mod test_server;
