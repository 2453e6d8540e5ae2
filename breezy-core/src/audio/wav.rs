//! RIFF/WAVE container builder for raw PCM responses
//!
//! The inference endpoints return bare 16-bit samples with no header, which
//! no media player will accept. [`pcm_to_wav`] prefixes them with the
//! canonical 44-byte header so the result can be played or saved as-is.

use thiserror::Error;

use super::AudioProfile;

pub const HEADER_LEN: usize = 44;

const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("PCM buffer of {len} bytes does not fit a 32-bit RIFF size field")]
    TooLarge { len: usize },

    #[error("{channels} channel(s) at {sample_rate} Hz can't be described by a WAV header")]
    InvalidProfile { sample_rate: u32, channels: u16 },
}

/// A complete WAV file: header followed by the untouched PCM payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavContainer {
    bytes: Vec<u8>,
}

impl WavContainer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn header(&self) -> &[u8] {
        &self.bytes[..HEADER_LEN]
    }

    /// The PCM payload after the header
    pub fn pcm(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }
}

impl AsRef<[u8]> for WavContainer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Wrap BreezyVoice output (mono, 16-bit, 22050 Hz) in a WAV container.
///
/// Odd-length input is passed through as-is; the trailing byte ends up in
/// the data chunk without padding.
pub fn pcm_to_wav(pcm_data: &[u8]) -> Result<WavContainer, ContainerError> {
    build_container(pcm_data, AudioProfile::BREEZY)
}

/// Wrap 16-bit PCM in a WAV container described by `profile`
pub fn build_container(
    pcm_data: &[u8],
    profile: AudioProfile,
) -> Result<WavContainer, ContainerError> {
    let data_len = u32::try_from(pcm_data.len())
        .ok()
        .filter(|len| *len <= u32::MAX - 36)
        .ok_or(ContainerError::TooLarge {
            len: pcm_data.len(),
        })?;

    let invalid = ContainerError::InvalidProfile {
        sample_rate: profile.sample_rate,
        channels: profile.channels,
    };
    let block_align = profile.block_align().ok_or(invalid.clone())?;
    let byte_rate = profile.byte_rate().ok_or(invalid)?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + pcm_data.len());

    // RIFF header
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    // fmt sub-chunk
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    bytes.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    bytes.extend_from_slice(&profile.channels.to_le_bytes());
    bytes.extend_from_slice(&profile.sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&AudioProfile::BITS_PER_SAMPLE.to_le_bytes());

    // data sub-chunk
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.extend_from_slice(pcm_data);

    Ok(WavContainer { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(4096)]
    #[case(22051)]
    fn length_and_size_fields(#[case] n: usize) {
        let pcm: Vec<u8> = (0..n).map(|i| (i % 251) as u8).collect();
        let wav = pcm_to_wav(&pcm).unwrap();
        let bytes = wav.as_bytes();

        assert_eq!(bytes.len(), HEADER_LEN + n);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(bytes, 4) as usize, 36 + n);
        assert_eq!(u32_at(bytes, 40) as usize, n);
        assert_eq!(wav.pcm(), pcm.as_slice());
    }

    #[test]
    fn fixed_format_chunk() {
        let wav = pcm_to_wav(&[0; 8]).unwrap();
        let bytes = wav.header();

        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(bytes, 16), 16);
        assert_eq!(u16_at(bytes, 20), 1);
        assert_eq!(u16_at(bytes, 22), 1);
        assert_eq!(u32_at(bytes, 24), 22050);
        assert_eq!(u32_at(bytes, 28), 44100);
        assert_eq!(u16_at(bytes, 32), 2);
        assert_eq!(u16_at(bytes, 34), 16);
    }

    #[test]
    fn empty_input() {
        let wav = pcm_to_wav(&[]).unwrap();
        assert_eq!(wav.len(), 44);
        assert_eq!(u32_at(wav.as_bytes(), 4), 36);
        assert_eq!(u32_at(wav.as_bytes(), 40), 0);
        assert!(wav.pcm().is_empty());
    }

    #[test]
    fn four_bytes() {
        let wav = pcm_to_wav(&[0x01, 0x02, 0x03, 0x04]).unwrap();
        let bytes = wav.as_bytes();
        assert_eq!(bytes.len(), 48);
        assert_eq!(u32_at(bytes, 4), 40);
        assert_eq!(u32_at(bytes, 40), 4);
        assert_eq!(&bytes[44..48], &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn deterministic() {
        let pcm = [9u8, 8, 7, 6, 5];
        assert_eq!(pcm_to_wav(&pcm), pcm_to_wav(&pcm));
    }

    #[test]
    fn stereo_profile_header() {
        let profile = AudioProfile {
            sample_rate: 16000,
            channels: 2,
        };
        let wav = build_container(&[0; 4], profile).unwrap();
        let bytes = wav.header();
        assert_eq!(u16_at(bytes, 22), 2);
        assert_eq!(u32_at(bytes, 24), 16000);
        assert_eq!(u32_at(bytes, 28), 64000);
        assert_eq!(u16_at(bytes, 32), 4);
    }

    #[test]
    fn unrepresentable_profiles_are_rejected() {
        let wide = AudioProfile {
            sample_rate: 22050,
            channels: 40000,
        };
        assert_eq!(
            build_container(&[0; 4], wide),
            Err(ContainerError::InvalidProfile {
                sample_rate: 22050,
                channels: 40000
            })
        );

        let fast = AudioProfile {
            sample_rate: u32::MAX,
            channels: 1,
        };
        assert!(matches!(
            build_container(&[], fast),
            Err(ContainerError::InvalidProfile { .. })
        ));

        let silent = AudioProfile {
            sample_rate: 22050,
            channels: 0,
        };
        assert!(build_container(&[], silent).is_err());
    }
}
