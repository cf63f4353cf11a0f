//! WAV file I/O for offline processing.
//!
//! Reads any PCM or float WAV into mono f32 samples in [-1, 1] and writes
//! 16-bit mono output.

use crate::error::{PoiseError, Result};
use std::io::{Read, Seek, Write};
use std::path::Path;

/// Mono audio decoded from a WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl MonoAudio {
    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Reads a WAV file from disk, downmixing to mono.
pub fn read_mono(path: &Path) -> Result<MonoAudio> {
    let reader = hound::WavReader::open(path)?;
    decode(reader)
}

/// Reads WAV data from any reader, downmixing to mono.
pub fn read_mono_from<R: Read>(reader: R) -> Result<MonoAudio> {
    let reader = hound::WavReader::new(reader)?;
    decode(reader)
}

fn decode<R: Read>(mut reader: hound::WavReader<R>) -> Result<MonoAudio> {
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(PoiseError::Wav {
            message: "WAV header declares zero channels".to_string(),
        });
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(MonoAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Writes mono samples as a 16-bit PCM WAV file.
pub fn write_mono(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let writer = hound::WavWriter::create(path, wav_spec(sample_rate))?;
    encode(writer, samples)
}

/// Writes mono samples as 16-bit PCM WAV into any seekable writer.
pub fn write_mono_to<W: Write + Seek>(writer: W, samples: &[f32], sample_rate: u32) -> Result<()> {
    let writer = hound::WavWriter::new(writer, wav_spec(sample_rate))?;
    encode(writer, samples)
}

fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

fn encode<W: Write + Seek>(mut writer: hound::WavWriter<W>, samples: &[f32]) -> Result<()> {
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer.write_sample(value)?;
    }
    writer.finalize()?;
    Ok(())
}
