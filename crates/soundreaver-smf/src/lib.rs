//! Parser for the SMF multi-sound container format
//!
//! SMF archives (PC version of Soul Reaver 2, found in `pcenglish/` inside
//! bigfile.dat) hold multiple concatenated sound clips. The layout is:
//! - 16-byte global header, clip count as i16 LE at offset 8
//! - clip records back to back, each self-describing via its declared length
//!
//! There are no boundary markers between clips, so parsing is strictly
//! sequential: each clip's offset is derived from the previous clip's
//! declared payload length. A single wrong field misaligns everything after
//! it, which is why every read is bounds-checked and reported as
//! [`SmfError`] instead of truncating silently.

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

/// Size of the global container header.
pub const HEADER_LEN: usize = 16;

/// Offset of the clip count within the header (i16 LE).
const CLIP_COUNT_OFFSET: usize = 8;

// Field offsets relative to the start of one clip record.
const SOUND_ID_OFFSET: usize = 0x00;
const PAYLOAD_LEN_OFFSET: usize = 0x10;
const SAMPLE_RATE_OFFSET: usize = 0x14;
const PAYLOAD_OFFSET: usize = 0x16;

/// The declared payload length includes a 2-byte sample-rate marker that is
/// not part of the audio data.
const RATE_TRAILER_LEN: usize = 2;

#[derive(Debug, Error)]
pub enum SmfError {
    #[error("container is {len} bytes, smaller than the {HEADER_LEN}-byte header")]
    HeaderTooShort { len: usize },

    #[error("header declares a negative clip count ({0})")]
    NegativeClipCount(i16),

    #[error("clip {index}: read at offset {offset}..{end} is outside the {len}-byte container")]
    OutOfBounds {
        index: usize,
        offset: usize,
        end: usize,
        len: usize,
    },

    #[error("clip {index}: declared payload length {payload_len} cannot hold the 2-byte rate trailer")]
    PayloadTooShort { index: usize, payload_len: i32 },
}

pub type Result<T> = std::result::Result<T, SmfError>;

/// One decoded clip entry. `raw_samples` borrows from the container buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipDescriptor<'a> {
    /// Clip identifier from the record (the format does not guarantee
    /// non-negative or unique IDs).
    pub sound_id: i16,
    /// Declared sample rate in samples/sec.
    pub sample_rate: u32,
    /// Declared payload length, including the 2-byte rate trailer.
    pub payload_len: u32,
    /// Absolute offset of the audio data within the container buffer.
    pub payload_start: usize,
    /// Raw PCM bytes (16-bit signed mono), `payload_len - 2` bytes.
    pub raw_samples: &'a [u8],
}

/// A validated SMF container. Parsing the clips is lazy: [`Self::clips`]
/// returns an iterator that decodes one record at a time, and re-invoking it
/// on the same buffer yields the same sequence.
#[derive(Debug, Clone, Copy)]
pub struct SmfContainer<'a> {
    buf: &'a [u8],
    clip_count: u16,
}

impl<'a> SmfContainer<'a> {
    /// Validate the global header. Clip records are not touched yet.
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(SmfError::HeaderTooShort { len: buf.len() });
        }
        let clip_count =
            LittleEndian::read_i16(&buf[CLIP_COUNT_OFFSET..CLIP_COUNT_OFFSET + 2]);
        if clip_count < 0 {
            return Err(SmfError::NegativeClipCount(clip_count));
        }
        tracing::debug!("SMF header: {} clips, {} bytes", clip_count, buf.len());
        Ok(Self {
            buf,
            clip_count: clip_count as u16,
        })
    }

    /// Number of clip records the header declares.
    pub fn clip_count(&self) -> usize {
        self.clip_count as usize
    }

    /// Iterate over the clip records in file order. The iterator yields
    /// `Err` once on the first malformed record and nothing after that —
    /// subsequent records cannot be located once alignment is lost.
    pub fn clips(&self) -> Clips<'a> {
        Clips {
            buf: self.buf,
            cursor: HEADER_LEN,
            index: 0,
            remaining: self.clip_count as usize,
            failed: false,
        }
    }
}

/// Lazy clip iterator, see [`SmfContainer::clips`].
pub struct Clips<'a> {
    buf: &'a [u8],
    cursor: usize,
    index: usize,
    remaining: usize,
    failed: bool,
}

impl<'a> Clips<'a> {
    fn read_field(&self, offset: usize, size: usize) -> Result<&'a [u8]> {
        self.buf
            .get(offset..offset + size)
            .ok_or(SmfError::OutOfBounds {
                index: self.index,
                offset,
                end: offset + size,
                len: self.buf.len(),
            })
    }

    fn decode_next(&mut self) -> Result<ClipDescriptor<'a>> {
        let pos = self.cursor;

        let sound_id =
            LittleEndian::read_i16(self.read_field(pos + SOUND_ID_OFFSET, 2)?);
        let payload_len =
            LittleEndian::read_i32(self.read_field(pos + PAYLOAD_LEN_OFFSET, 4)?);
        let sample_rate =
            LittleEndian::read_u32(self.read_field(pos + SAMPLE_RATE_OFFSET, 4)?);

        if payload_len < RATE_TRAILER_LEN as i32 {
            return Err(SmfError::PayloadTooShort {
                index: self.index,
                payload_len,
            });
        }

        let payload_start = pos + PAYLOAD_OFFSET;
        let samples_len = payload_len as usize - RATE_TRAILER_LEN;
        let raw_samples = self.read_field(payload_start, samples_len)?;

        self.cursor = payload_start + samples_len;
        self.index += 1;

        tracing::debug!(
            "clip {}: id={} rate={} len={} start={} end={}",
            self.index - 1,
            sound_id,
            sample_rate,
            payload_len,
            payload_start,
            self.cursor
        );

        Ok(ClipDescriptor {
            sound_id,
            sample_rate,
            payload_len: payload_len as u32,
            payload_start,
            raw_samples,
        })
    }
}

impl<'a> Iterator for Clips<'a> {
    type Item = Result<ClipDescriptor<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        match self.decode_next() {
            Ok(clip) => Some(Ok(clip)),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a synthetic container from (sound_id, sample_rate, samples)
    /// triples. The on-disk rate field is 16 bits wide; the 32-bit rate read
    /// overlaps the first two payload bytes, so tests that assert an exact
    /// rate use payloads starting with two zero bytes.
    fn container(clips: &[(i16, u16, &[u8])]) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_LEN];
        LittleEndian::write_i16(&mut buf[8..10], clips.len() as i16);

        for &(sound_id, sample_rate, samples) in clips {
            let mut rec = vec![0u8; PAYLOAD_OFFSET];
            LittleEndian::write_i16(&mut rec[0..2], sound_id);
            LittleEndian::write_i32(
                &mut rec[0x10..0x14],
                (samples.len() + RATE_TRAILER_LEN) as i32,
            );
            LittleEndian::write_u16(&mut rec[0x14..0x16], sample_rate);
            buf.extend_from_slice(&rec);
            buf.extend_from_slice(samples);
        }
        buf
    }

    fn collect(buf: &[u8]) -> Vec<ClipDescriptor<'_>> {
        SmfContainer::parse(buf)
            .unwrap()
            .clips()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn two_clip_container() {
        let buf = container(&[
            (1, 22050, &[0, 0, 0xAA, 0xBB]),
            (2, 11025, &[0, 0]),
        ]);
        let clips = collect(&buf);

        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].sound_id, 1);
        assert_eq!(clips[0].sample_rate, 22050);
        assert_eq!(clips[0].payload_len, 6);
        assert_eq!(clips[0].raw_samples, &[0, 0, 0xAA, 0xBB]);
        assert_eq!(clips[1].sound_id, 2);
        assert_eq!(clips[1].sample_rate, 11025);
        assert_eq!(clips[1].payload_len, 4);
        assert_eq!(clips[1].raw_samples, &[0, 0]);
    }

    #[test]
    fn payloads_are_contiguous() {
        let buf = container(&[
            (1, 22050, &[0, 0, 1, 2]),
            (2, 11025, &[0, 0, 3, 4, 5, 6]),
        ]);
        let clips = collect(&buf);

        // Clip 1's record begins exactly where clip 0's samples end.
        let end_0 = clips[0].payload_start + clips[0].raw_samples.len();
        assert_eq!(clips[1].payload_start, end_0 + PAYLOAD_OFFSET);
        // And clip 1's samples run to the end of the buffer.
        assert_eq!(
            clips[1].payload_start + clips[1].raw_samples.len(),
            buf.len()
        );
    }

    #[test]
    fn parse_is_restartable() {
        let buf = container(&[(7, 8000, &[0, 0, 9, 9]), (8, 8000, &[0, 0])]);
        let smf = SmfContainer::parse(&buf).unwrap();
        let first: Vec<_> = smf.clips().collect::<Result<Vec<_>>>().unwrap();
        let second: Vec<_> = smf.clips().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_container() {
        let buf = container(&[]);
        let smf = SmfContainer::parse(&buf).unwrap();
        assert_eq!(smf.clip_count(), 0);
        assert_eq!(smf.clips().count(), 0);
    }

    #[test]
    fn header_too_short() {
        assert!(matches!(
            SmfContainer::parse(&[0u8; 15]),
            Err(SmfError::HeaderTooShort { len: 15 })
        ));
    }

    #[test]
    fn negative_clip_count() {
        let mut buf = vec![0u8; HEADER_LEN];
        LittleEndian::write_i16(&mut buf[8..10], -1);
        assert!(matches!(
            SmfContainer::parse(&buf),
            Err(SmfError::NegativeClipCount(-1))
        ));
    }

    #[test]
    fn payload_shorter_than_trailer() {
        let mut buf = container(&[(1, 22050, &[0, 0])]);
        // Rewrite the declared length to 1 (< 2-byte trailer).
        let off = HEADER_LEN + 0x10;
        LittleEndian::write_i32(&mut buf[off..off + 4], 1);

        let smf = SmfContainer::parse(&buf).unwrap();
        let results: Vec<_> = smf.clips().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(SmfError::PayloadTooShort { index: 0, payload_len: 1 })
        ));
    }

    #[test]
    fn truncated_payload_is_an_error_not_a_short_read() {
        let mut buf = container(&[(1, 22050, &[0, 0, 1, 2, 3, 4])]);
        buf.truncate(buf.len() - 3);

        let smf = SmfContainer::parse(&buf).unwrap();
        let results: Vec<_> = smf.clips().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(SmfError::OutOfBounds { .. })));
    }

    #[test]
    fn count_overruns_records() {
        // Header claims two clips, body holds one: the second record's field
        // reads land past the end of the buffer.
        let mut buf = container(&[(1, 22050, &[0, 0])]);
        LittleEndian::write_i16(&mut buf[8..10], 2);

        let smf = SmfContainer::parse(&buf).unwrap();
        let results: Vec<_> = smf.clips().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(SmfError::OutOfBounds { index: 1, .. })));
    }

    #[test]
    fn iterator_fuses_after_error() {
        let mut buf = container(&[(1, 22050, &[0, 0]), (2, 22050, &[0, 0])]);
        // Corrupt clip 0's length so clip 1 can never be located.
        let off = HEADER_LEN + 0x10;
        LittleEndian::write_i32(&mut buf[off..off + 4], 1);

        let smf = SmfContainer::parse(&buf).unwrap();
        let mut clips = smf.clips();
        assert!(matches!(clips.next(), Some(Err(_))));
        assert!(clips.next().is_none());
    }

    #[test]
    fn negative_sound_id() {
        let buf = container(&[(-3, 22050, &[0, 0])]);
        let clips = collect(&buf);
        assert_eq!(clips[0].sound_id, -3);
    }
}
