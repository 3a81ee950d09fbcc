// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! WAV export for rendered audio.

use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};

/// Write mono f32 samples as a 16-bit PCM WAV file
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path.as_ref(), spec)
        .with_context(|| format!("Failed to create WAV file: {:?}", path.as_ref()))?;

    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(value).context("Failed to write WAV sample")?;
    }

    writer.finalize().context("Failed to finalize WAV file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let samples = [0.0, 0.5, -0.5, 1.0, -2.0];
        write_wav(&path, &samples, 8000).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.spec().channels, 1);

        let read: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(read.len(), 5);
        assert_eq!(read[0], 0);
        assert_eq!(read[3], i16::MAX);
        // Out-of-range input is clamped
        assert_eq!(read[4], -i16::MAX);
    }

    #[test]
    fn test_write_wav_bad_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");
        assert!(write_wav(&path, &[0.0], 8000).is_err());
    }
}
