//! RIFF/WAVE header inspection.
//!
//! Only enough of the container is understood to answer "how long is this
//! clip": the `fmt ` block for the byte rate and the `data` chunk size.
//! Everything else is skipped unread.

use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read, Seek};
use std::path::Path;
use thiserror::Error;

const FMT_BLOCK_LEN: u32 = 16;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("not a RIFF/WAVE file")]
    NotRiff,
    #[error("fmt chunk is {0} bytes, need at least 16")]
    FormatTooShort(u32),
    #[error("fmt chunk ends before its fixed fields")]
    TruncatedFormat,
    #[error("no fmt chunk (or zero byte rate)")]
    MissingFormat,
    #[error("no data chunk (or zero-length audio)")]
    MissingData,
}

/// What the header says about a clip 🎵
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSummary {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavSummary {
    /// `floor(data_size * 1000 / byte_rate)`, saturating at `u32::MAX`.
    pub fn duration_ms(&self) -> u32 {
        if self.byte_rate == 0 || self.data_size == 0 {
            return 0;
        }
        let ms = u64::from(self.data_size) * 1000 / u64::from(self.byte_rate);
        u32::try_from(ms).unwrap_or(u32::MAX)
    }
}

/// Duration of the clip at `path` in milliseconds, 0 on any failure.
pub fn duration_ms(path: &Path) -> u32 {
    match inspect(path) {
        Ok(summary) => summary.duration_ms(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no duration for clip");
            0
        }
    }
}

pub fn inspect(path: &Path) -> Result<WavSummary, WavError> {
    let file = File::open(path)?;
    read_summary(&mut BufReader::new(file))
}

/// Walk the chunk list of a RIFF/WAVE stream.
///
/// Skips go through `BufReader::seek_relative`, so short chunks are stepped
/// over inside the buffer. Chunks may come in any order. Unknown chunks are skipped, and every chunk
/// with an odd size is followed by one pad byte. Iteration ends at the first
/// short chunk header, which is how end of file shows up.
pub fn read_summary<R: Read + Seek>(reader: &mut BufReader<R>) -> Result<WavSummary, WavError> {
    let mut header = [0u8; 12];
    read_exact_or(reader, &mut header, WavError::NotRiff)?;
    if &header[0..4] != b"RIFF" || &header[8..12] != b"WAVE" {
        return Err(WavError::NotRiff);
    }

    let mut fmt: Option<[u8; 16]> = None;
    let mut data_size: u32 = 0;

    loop {
        let mut chunk_header = [0u8; 8];
        match reader.read_exact(&mut chunk_header) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let tag = &chunk_header[0..4];
        let size = le_u32(&chunk_header[4..8]);

        match tag {
            b"fmt " => {
                if size < FMT_BLOCK_LEN {
                    return Err(WavError::FormatTooShort(size));
                }
                let mut block = [0u8; 16];
                read_exact_or(reader, &mut block, WavError::TruncatedFormat)?;
                skip(reader, size - FMT_BLOCK_LEN)?;
                fmt = Some(block);
            }
            b"data" => {
                data_size = size;
                skip(reader, size)?;
            }
            _ => skip(reader, size)?,
        }

        if size & 1 == 1 {
            skip(reader, 1)?;
        }
    }

    let block = fmt.ok_or(WavError::MissingFormat)?;
    let summary = WavSummary {
        audio_format: le_u16(&block[0..2]),
        channels: le_u16(&block[2..4]),
        sample_rate: le_u32(&block[4..8]),
        byte_rate: le_u32(&block[8..12]),
        bits_per_sample: le_u16(&block[14..16]),
        data_size,
    };

    if summary.byte_rate == 0 {
        return Err(WavError::MissingFormat);
    }
    if summary.data_size == 0 {
        return Err(WavError::MissingData);
    }
    Ok(summary)
}

fn read_exact_or<R: Read>(reader: &mut R, buf: &mut [u8], short: WavError) -> Result<(), WavError> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(short),
        Err(e) => Err(e.into()),
    }
}

// Seeking past the end is allowed; the next header read then hits EOF.
fn skip<R: Seek>(reader: &mut BufReader<R>, len: u32) -> Result<(), WavError> {
    if len > 0 {
        reader.seek_relative(i64::from(len))?;
    }
    Ok(())
}

fn le_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
