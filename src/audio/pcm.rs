use std::io::Cursor;

use crate::pipeline::WaveformBuffer;

/// RIFF + fmt + data chunk headers for 16-bit PCM.
pub const WAV_HEADER_LEN: usize = 44;

/// Asymmetric so both -1.0 and +1.0 land inside i16.
#[inline]
fn quantize(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode one cycle as a mono 16-bit WAV, tiled `repeat_count` times with no
/// crossfade. An empty buffer still yields a valid (empty) file.
pub fn encode_wav(wave: &WaveformBuffer, sample_rate: u32, repeat_count: usize) -> anyhow::Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let quantized: Vec<i16> = wave.samples().iter().map(|&s| quantize(s)).collect();

    let mut cursor = Cursor::new(Vec::with_capacity(
        WAV_HEADER_LEN + repeat_count * quantized.len() * 2,
    ));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        let mut samples = writer.get_i16_writer((repeat_count * quantized.len()) as u32);
        for _ in 0..repeat_count {
            for &s in &quantized {
                samples.write_sample(s);
            }
        }
        samples.flush()?;
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}
