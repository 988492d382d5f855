//! In-process WAV encoder
//!
//! Replaces the external `sox -r <rate> -e signed -b 16 -c 1` invocation of
//! the original tool. SMF payloads are 16-bit signed mono with big-endian
//! sample bytes, so each pair is swapped to little-endian before being
//! wrapped in a RIFF/WAVE header.

use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use soundreaver_extract::{ClipEncoder, EncodeError};

pub struct WavEncoder;

/// Swap 16-bit samples to little-endian. An odd trailing byte cannot form a
/// sample and is dropped.
fn swap_samples(raw: &[u8]) -> Vec<u8> {
    let mut swapped = Vec::with_capacity(raw.len());
    for pair in raw.chunks_exact(2) {
        swapped.push(pair[1]);
        swapped.push(pair[0]);
    }
    swapped
}

/// Build a complete WAV file (PCM, mono, 16-bit) from one clip's payload.
pub fn wav_bytes(raw_samples: &[u8], sample_rate: u32) -> Vec<u8> {
    const CHANNELS: u16 = 1;
    const BITS_PER_SAMPLE: u16 = 16;

    let pcm = swap_samples(raw_samples);
    let byte_rate = sample_rate * CHANNELS as u32 * BITS_PER_SAMPLE as u32 / 8;
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let data_len = pcm.len() as u32;
    let file_len = 36 + data_len;

    let mut wav = Vec::with_capacity(file_len as usize + 8);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.write_u32::<LittleEndian>(file_len).unwrap();
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.write_u32::<LittleEndian>(16).unwrap(); // chunk size
    wav.write_u16::<LittleEndian>(1).unwrap(); // PCM format
    wav.write_u16::<LittleEndian>(CHANNELS).unwrap();
    wav.write_u32::<LittleEndian>(sample_rate).unwrap();
    wav.write_u32::<LittleEndian>(byte_rate).unwrap();
    wav.write_u16::<LittleEndian>(block_align).unwrap();
    wav.write_u16::<LittleEndian>(BITS_PER_SAMPLE).unwrap();

    // data chunk
    wav.extend_from_slice(b"data");
    wav.write_u32::<LittleEndian>(data_len).unwrap();
    wav.extend_from_slice(&pcm);

    wav
}

impl ClipEncoder for WavEncoder {
    fn encode(
        &mut self,
        raw_samples: &[u8],
        sample_rate: u32,
        dest: &Path,
    ) -> Result<(), EncodeError> {
        std::fs::write(dest, wav_bytes(raw_samples, sample_rate)).map_err(|e| EncodeError::Io {
            path: dest.to_path_buf(),
            source: e,
        })
    }

    fn ensure_dir(&mut self, dir: &Path) -> Result<(), EncodeError> {
        std::fs::create_dir_all(dir).map_err(|e| EncodeError::Io {
            path: dir.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::ByteOrder;

    #[test]
    fn header_layout() {
        let wav = wav_bytes(&[0x12, 0x34, 0x56, 0x78], 22050);

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(LittleEndian::read_u32(&wav[4..8]), 36 + 4);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(LittleEndian::read_u16(&wav[20..22]), 1); // PCM
        assert_eq!(LittleEndian::read_u16(&wav[22..24]), 1); // mono
        assert_eq!(LittleEndian::read_u32(&wav[24..28]), 22050);
        assert_eq!(LittleEndian::read_u32(&wav[28..32]), 44100); // byte rate
        assert_eq!(LittleEndian::read_u16(&wav[32..34]), 2); // block align
        assert_eq!(LittleEndian::read_u16(&wav[34..36]), 16); // bit depth
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(LittleEndian::read_u32(&wav[40..44]), 4);
        assert_eq!(wav.len(), 48);
    }

    #[test]
    fn samples_are_byte_swapped() {
        let wav = wav_bytes(&[0x12, 0x34, 0x56, 0x78], 8000);
        assert_eq!(&wav[44..], &[0x34, 0x12, 0x78, 0x56]);
    }

    #[test]
    fn odd_trailing_byte_is_dropped() {
        let wav = wav_bytes(&[0x12, 0x34, 0x56], 8000);
        assert_eq!(LittleEndian::read_u32(&wav[40..44]), 2);
        assert_eq!(&wav[44..], &[0x34, 0x12]);
    }

    #[test]
    fn encoder_writes_and_provisions_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("grouped");
        let dest = dir.join("clip_1.wav");

        let mut enc = WavEncoder;
        enc.ensure_dir(&dir).unwrap();
        enc.encode(&[0x01, 0x02], 11025, &dest).unwrap();

        let written = std::fs::read(&dest).unwrap();
        assert_eq!(&written[0..4], b"RIFF");
        assert_eq!(LittleEndian::read_u32(&written[24..28]), 11025);
    }

    #[test]
    fn encode_into_missing_dir_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("no-such-dir").join("clip.wav");

        let mut enc = WavEncoder;
        let err = enc.encode(&[0, 0], 8000, &dest).unwrap_err();
        assert!(matches!(err, EncodeError::Io { .. }));
    }
}
