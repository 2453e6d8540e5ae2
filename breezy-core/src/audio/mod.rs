//! PCM audio descriptions, the WAV container builder and (optionally) playback

#[cfg(feature = "playback")]
pub mod playback;
pub mod wav;

/// Audio format profile specifying sample rate and channel count.
/// Samples are always signed 16-bit little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioProfile {
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioProfile {
    pub const BITS_PER_SAMPLE: u16 = 16;

    /// What the BreezyVoice inference endpoints stream back
    pub const BREEZY: AudioProfile = AudioProfile {
        sample_rate: 22050,
        channels: 1,
    };

    /// Bytes per sample frame (all channels). `None` when there are no
    /// channels or the frame doesn't fit the header's 16-bit field.
    pub fn block_align(&self) -> Option<u16> {
        if self.channels == 0 {
            return None;
        }
        self.channels.checked_mul(Self::BITS_PER_SAMPLE / 8)
    }

    pub fn byte_rate(&self) -> Option<u32> {
        self.sample_rate.checked_mul(u32::from(self.block_align()?))
    }
}

impl Default for AudioProfile {
    fn default() -> Self {
        Self::BREEZY
    }
}

/// Raw PCM returned from a synthesis request
#[derive(Debug, Clone)]
pub struct AudioData {
    pub pcm_data: Vec<u8>,
    pub profile: AudioProfile,
}

impl AudioData {
    pub fn new(pcm_data: Vec<u8>) -> Self {
        Self {
            pcm_data,
            profile: AudioProfile::BREEZY,
        }
    }

    /// Playback length; a trailing half sample is ignored
    pub fn duration_secs(&self) -> f64 {
        let align = self.profile.block_align().unwrap_or(1);
        let frames = self.pcm_data.len() / usize::from(align);
        frames as f64 / f64::from(self.profile.sample_rate.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breezy_profile_rates() {
        let profile = AudioProfile::BREEZY;
        assert_eq!(profile.block_align(), Some(2));
        assert_eq!(profile.byte_rate(), Some(44100));
    }

    #[test]
    fn oversized_profiles_have_no_rates() {
        let wide = AudioProfile {
            sample_rate: 22050,
            channels: 40000,
        };
        assert_eq!(wide.block_align(), None);
        assert_eq!(wide.byte_rate(), None);

        let fast = AudioProfile {
            sample_rate: u32::MAX,
            channels: 2,
        };
        assert_eq!(fast.block_align(), Some(4));
        assert_eq!(fast.byte_rate(), None);

        let silent = AudioProfile {
            sample_rate: 22050,
            channels: 0,
        };
        assert_eq!(silent.block_align(), None);
    }

    #[test]
    fn duration_of_one_second() {
        let audio = AudioData::new(vec![0; 44100]);
        assert!((audio.duration_secs() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn duration_ignores_dangling_byte() {
        let audio = AudioData::new(vec![0; 3]);
        assert!((audio.duration_secs() - 1.0 / 22050.0).abs() < 1e-12);
    }
}
