//! Runtime-tagged conversion over raw byte buffers.
//!
//! For call sites that only learn their sample formats at run time: a
//! [`SampleFormat`] tag per side plus plain byte slices, dispatched into
//! the same generic paths the typed API uses. Byte lengths must divide
//! evenly into samples of the tagged format. All sizes returned are in
//! bytes.

use crate::convert::convert_into;
use crate::engine::ConverterType;
use crate::error::{Error, Result};
use crate::format::{Sample, SampleFormat};
use crate::pull::PullConverter;
use crate::push::PushConverter;
use std::borrow::Cow;

/// View a byte buffer as samples, copying only when the bytes are not
/// aligned for the element type.
fn input_samples<S: Sample>(bytes: &[u8]) -> Result<Cow<'_, [S]>> {
    if bytes.len() % std::mem::size_of::<S>() != 0 {
        return Err(Error::InvalidByteLength {
            format: S::FORMAT,
            len: bytes.len(),
        });
    }
    match bytemuck::try_cast_slice(bytes) {
        Ok(samples) => Ok(Cow::Borrowed(samples)),
        Err(_) => {
            let mut samples = vec![S::default(); bytes.len() / std::mem::size_of::<S>()];
            bytemuck::cast_slice_mut::<S, u8>(&mut samples).copy_from_slice(bytes);
            Ok(Cow::Owned(samples))
        }
    }
}

/// Run `op` against a byte buffer viewed as samples, returning the bytes
/// written. Misaligned buffers go through a scratch allocation.
fn with_output_samples<S: Sample>(
    bytes: &mut [u8],
    op: impl FnOnce(&mut [S]) -> Result<usize>,
) -> Result<usize> {
    if bytes.len() % std::mem::size_of::<S>() != 0 {
        return Err(Error::InvalidByteLength {
            format: S::FORMAT,
            len: bytes.len(),
        });
    }
    match bytemuck::try_cast_slice_mut(bytes) {
        Ok(samples) => {
            let written = op(samples)?;
            Ok(written * std::mem::size_of::<S>())
        }
        Err(_) => {
            let mut scratch = vec![S::default(); bytes.len() / std::mem::size_of::<S>()];
            let written = op(&mut scratch)?;
            let byte_count = written * std::mem::size_of::<S>();
            bytes[..byte_count].copy_from_slice(bytemuck::cast_slice(&scratch[..written]));
            Ok(byte_count)
        }
    }
}

/// One-shot conversion between runtime-tagged byte buffers. Returns the
/// number of bytes written to `output`.
pub fn convert_raw(
    from: SampleFormat,
    input: &[u8],
    to: SampleFormat,
    output: &mut [u8],
    converter_type: ConverterType,
    channels: usize,
    ratio: f64,
) -> Result<usize> {
    match from {
        SampleFormat::Int16 => convert_raw_from::<i16>(input, to, output, converter_type, channels, ratio),
        SampleFormat::Int32 => convert_raw_from::<i32>(input, to, output, converter_type, channels, ratio),
        SampleFormat::Float32 => convert_raw_from::<f32>(input, to, output, converter_type, channels, ratio),
    }
}

fn convert_raw_from<From: Sample>(
    input: &[u8],
    to: SampleFormat,
    output: &mut [u8],
    converter_type: ConverterType,
    channels: usize,
    ratio: f64,
) -> Result<usize> {
    let input = input_samples::<From>(input)?;
    match to {
        SampleFormat::Int16 => with_output_samples::<i16>(output, |out| {
            convert_into(&input, out, converter_type, channels, ratio)
        }),
        SampleFormat::Int32 => with_output_samples::<i32>(output, |out| {
            convert_into(&input, out, converter_type, channels, ratio)
        }),
        SampleFormat::Float32 => with_output_samples::<f32>(output, |out| {
            convert_into(&input, out, converter_type, channels, ratio)
        }),
    }
}

/// One-shot conversion between runtime-tagged formats, allocating the
/// output buffer. Sized from the ratio with slack, shrunk to what was
/// produced.
pub fn convert_raw_alloc(
    from: SampleFormat,
    input: &[u8],
    to: SampleFormat,
    converter_type: ConverterType,
    channels: usize,
    ratio: f64,
) -> Result<Vec<u8>> {
    let frames = input.len() / from.size_of() / channels;
    let samples = ((frames as f64 * ratio).ceil() as usize + 1) * channels;
    let mut output = vec![0u8; samples * to.size_of()];
    let written = convert_raw(from, input, to, &mut output, converter_type, channels, ratio)?;
    output.truncate(written);
    Ok(output)
}

impl PushConverter {
    /// Runtime-tagged form of [`convert_into`](PushConverter::convert_into)
    /// over byte buffers. Returns the bytes written to `output`.
    pub fn convert_raw(
        &mut self,
        from: SampleFormat,
        input: &[u8],
        to: SampleFormat,
        output: &mut [u8],
    ) -> Result<usize> {
        match from {
            SampleFormat::Int16 => push_raw_from::<i16>(self, input, to, output),
            SampleFormat::Int32 => push_raw_from::<i32>(self, input, to, output),
            SampleFormat::Float32 => push_raw_from::<f32>(self, input, to, output),
        }
    }

    /// Runtime-tagged form of [`convert`](PushConverter::convert),
    /// allocating the output buffer.
    pub fn convert_raw_alloc(
        &mut self,
        from: SampleFormat,
        input: &[u8],
        to: SampleFormat,
    ) -> Result<Vec<u8>> {
        let samples = self.frames_to_reserve(input.len() / from.size_of()) * self.channels();
        let mut output = vec![0u8; samples * to.size_of()];
        let written = self.convert_raw(from, input, to, &mut output)?;
        output.truncate(written);
        Ok(output)
    }
}

fn push_raw_from<From: Sample>(
    converter: &mut PushConverter,
    input: &[u8],
    to: SampleFormat,
    output: &mut [u8],
) -> Result<usize> {
    let input = input_samples::<From>(input)?;
    match to {
        SampleFormat::Int16 => {
            with_output_samples::<i16>(output, |out| converter.convert_into(&input, out))
        }
        SampleFormat::Int32 => {
            with_output_samples::<i32>(output, |out| converter.convert_into(&input, out))
        }
        SampleFormat::Float32 => {
            with_output_samples::<f32>(output, |out| converter.convert_into(&input, out))
        }
    }
}

impl<'a, From: Sample> PullConverter<'a, From> {
    /// Runtime-tagged form of
    /// [`convert_into`](PullConverter::convert_into) over a byte buffer.
    /// Returns the bytes written.
    pub fn convert_raw(&mut self, to: SampleFormat, output: &mut [u8]) -> Result<usize> {
        match to {
            SampleFormat::Int16 => with_output_samples::<i16>(output, |out| self.convert_into(out)),
            SampleFormat::Int32 => with_output_samples::<i32>(output, |out| self.convert_into(out)),
            SampleFormat::Float32 => {
                with_output_samples::<f32>(output, |out| self.convert_into(out))
            }
        }
    }
}
