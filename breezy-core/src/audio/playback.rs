//! Plays synthesized speech on the default output device.
//! BreezyVoice streams 22050 Hz mono, which most devices don't run at, so
//! samples are resampled to the device rate and fanned out to its channels.

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig, SupportedStreamConfig,
};
use rubato::{FftFixedIn, Resampler};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::AudioData;

const RESAMPLE_CHUNK: usize = 1024;

pub struct AudioPlayer {
    device: Device,
    supported_config: SupportedStreamConfig,
}

/// Handle for an in-flight playback; dropping it stops the stream
pub struct Playback {
    _stream: Stream,
    finished: Arc<AtomicBool>,
}

impl Playback {
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub async fn wait(&self) {
        while !self.is_finished() {
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }
    }
}

impl AudioPlayer {
    pub fn new() -> Result<Self> {
        let device = cpal::default_host()
            .default_output_device()
            .context("no output device available")?;

        let supported_config = device
            .default_output_config()
            .context("failed to get default output config")?;

        Ok(Self {
            device,
            supported_config,
        })
    }

    pub fn play(&self, audio: &AudioData) -> Result<Playback> {
        let device_rate = self.supported_config.sample_rate().0;
        let device_channels = usize::from(self.supported_config.channels());
        let config: StreamConfig = self.supported_config.clone().into();

        let source_channels = usize::from(audio.profile.channels.max(1));
        let mono = downmix(&pcm_to_f32(&audio.pcm_data), source_channels);
        let resampled = if audio.profile.sample_rate == device_rate {
            mono
        } else {
            resample(&mono, audio.profile.sample_rate, device_rate)?
        };
        let samples = Arc::new(fan_out(&resampled, device_channels));

        tracing::debug!(
            device_rate,
            device_channels,
            frames = resampled.len(),
            "starting playback"
        );

        let finished = Arc::new(AtomicBool::new(false));
        let stream = match self.supported_config.sample_format() {
            SampleFormat::F32 => self.build_stream::<f32>(&config, samples, finished.clone())?,
            SampleFormat::I16 => self.build_stream::<i16>(&config, samples, finished.clone())?,
            format => anyhow::bail!("unsupported sample format: {:?}", format),
        };

        stream.play().context("failed to start playback stream")?;

        Ok(Playback {
            _stream: stream,
            finished,
        })
    }

    fn build_stream<T>(
        &self,
        config: &StreamConfig,
        samples: Arc<Vec<f32>>,
        finished: Arc<AtomicBool>,
    ) -> Result<Stream>
    where
        T: SizedSample + FromSample<f32> + Default + Send + 'static,
    {
        let position = AtomicUsize::new(0);
        self.device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let pos = position.load(Ordering::SeqCst);
                    let remaining = &samples[pos.min(samples.len())..];
                    let n = remaining.len().min(data.len());

                    for (out, &sample) in data.iter_mut().zip(&remaining[..n]) {
                        *out = T::from_sample(sample);
                    }
                    data[n..].fill(T::default());

                    position.store(pos + n, Ordering::SeqCst);
                    if n == 0 {
                        finished.store(true, Ordering::SeqCst);
                    }
                },
                move |err| {
                    tracing::error!(error = ?err, "playback stream error");
                },
                None,
            )
            .context("failed to build output stream")
    }
}

/// Dangling odd bytes are dropped here; they never form a whole sample
fn pcm_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect()
}

fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn fan_out(samples: &[f32], channels: usize) -> Vec<f32> {
    samples
        .iter()
        .flat_map(|&sample| std::iter::repeat(sample).take(channels.max(1)))
        .collect()
}

fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        RESAMPLE_CHUNK,
        2,
        1,
    )
    .context("failed to create resampler")?;

    let mut output = Vec::new();
    let mut pos = 0;

    while pos < samples.len() {
        let needed = resampler.input_frames_next();
        let end = (pos + needed).min(samples.len());

        let mut chunk = samples[pos..end].to_vec();
        chunk.resize(needed, 0.0);

        let input = vec![chunk];
        let resampled = resampler
            .process(&input, None)
            .map_err(|e| anyhow::anyhow!("resampling failed: {e:?}"))?;
        if let Some(channel) = resampled.into_iter().next() {
            output.extend(channel);
        }

        pos = end;
    }

    Ok(output)
}
