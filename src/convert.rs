//! One-shot whole-buffer conversion.
//!
//! A complete, self-contained conversion: all input in one call, end of
//! stream always signalled, no state kept. For incremental input use
//! [`crate::push::PushConverter`]; to let the converter request input on
//! demand use [`crate::pull::PullConverter`].

use crate::engine::{ConverterType, Engine};
use crate::error::Result;
use crate::format::{self, Sample, SampleFormat};

/// Convert `input` into a freshly allocated buffer.
///
/// The buffer is sized from the conversion ratio plus one spare frame to
/// absorb the converter's rounding, then shrunk to what was actually
/// produced. `input` must hold whole frames (`input.len() % channels == 0`)
/// and `channels` must be at least 1.
pub fn convert<To, From>(
    input: &[From],
    converter_type: ConverterType,
    channels: usize,
    ratio: f64,
) -> Result<Vec<To>>
where
    To: Sample,
    From: Sample,
{
    let frames = ((input.len() / channels) as f64 * ratio).ceil() as usize + 1;
    let mut output = vec![To::default(); frames * channels];
    let written = convert_into(input, &mut output, converter_type, channels, ratio)?;
    output.truncate(written);
    Ok(output)
}

/// Convert `input` into a caller-supplied buffer.
///
/// Returns the number of samples written. Output beyond what the buffer can
/// hold is dropped by the converter, so size generously when the full
/// result matters.
pub fn convert_into<To, From>(
    input: &[From],
    output: &mut [To],
    converter_type: ConverterType,
    channels: usize,
    ratio: f64,
) -> Result<usize>
where
    To: Sample,
    From: Sample,
{
    let mut bridged = Vec::new();
    let input_floats: &[f32] = if From::FORMAT == SampleFormat::Float32 {
        format::as_float_slice(input)
    } else {
        bridged.reserve(input.len());
        bridged.extend(input.iter().map(|s| s.to_f32()));
        &bridged
    };

    if To::FORMAT == SampleFormat::Float32 {
        let output_floats = format::as_float_slice_mut(output);
        let outcome =
            Engine::process_once(converter_type, channels, input_floats, output_floats, ratio)?;
        Ok(outcome.frames_produced * channels)
    } else {
        let mut scratch = vec![0f32; output.len()];
        let outcome =
            Engine::process_once(converter_type, channels, input_floats, &mut scratch, ratio)?;
        let samples = outcome.frames_produced * channels;
        format::from_float(&scratch[..samples], &mut output[..samples]);
        Ok(samples)
    }
}
