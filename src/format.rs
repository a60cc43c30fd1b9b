//! Sample representations and the float bridge.
//!
//! The converter itself only speaks normalized `f32`. Integer samples are
//! scaled onto [-1, 1] on the way in and clamped back to the full integer
//! range on the way out, with the same scale factors libsamplerate uses for
//! its own array helpers, so round-trips stay within quantization error.

use crate::error::Error;

/// Runtime tag for the three supported sample representations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleFormat {
    Int16 = 0,
    Int32 = 1,
    Float32 = 2,
}

impl SampleFormat {
    /// Size of one sample of this format in bytes.
    pub fn size_of(self) -> usize {
        match self {
            SampleFormat::Int16 => std::mem::size_of::<i16>(),
            SampleFormat::Int32 => std::mem::size_of::<i32>(),
            SampleFormat::Float32 => std::mem::size_of::<f32>(),
        }
    }
}

impl TryFrom<u8> for SampleFormat {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self, Error> {
        match tag {
            0 => Ok(SampleFormat::Int16),
            1 => Ok(SampleFormat::Int32),
            2 => Ok(SampleFormat::Float32),
            _ => Err(Error::InvalidFormatCombination),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
}

/// A sample representation the conversion paths accept: exactly `i16`,
/// `i32`, or `f32`.
pub trait Sample:
    sealed::Sealed + bytemuck::Pod + Default + PartialEq + std::fmt::Debug + 'static
{
    const FORMAT: SampleFormat;

    fn to_f32(self) -> f32;
    fn from_f32(value: f32) -> Self;
}

impl Sample for i16 {
    const FORMAT: SampleFormat = SampleFormat::Int16;

    fn to_f32(self) -> f32 {
        self as f32 / 32768.0
    }

    fn from_f32(value: f32) -> Self {
        let scaled = value * 32768.0;
        if scaled >= 32767.0 {
            i16::MAX
        } else if scaled <= -32768.0 {
            i16::MIN
        } else {
            scaled.round_ties_even() as i16
        }
    }
}

impl Sample for i32 {
    const FORMAT: SampleFormat = SampleFormat::Int32;

    fn to_f32(self) -> f32 {
        self as f32 / 2147483648.0
    }

    fn from_f32(value: f32) -> Self {
        let scaled = value as f64 * 2147483648.0;
        if scaled >= 2147483647.0 {
            i32::MAX
        } else if scaled <= -2147483648.0 {
            i32::MIN
        } else {
            scaled.round_ties_even() as i32
        }
    }
}

impl Sample for f32 {
    const FORMAT: SampleFormat = SampleFormat::Float32;

    fn to_f32(self) -> f32 {
        self
    }

    fn from_f32(value: f32) -> Self {
        value
    }
}

/// Reinterpret a sample slice as `f32`. Only valid when `S` is `f32`;
/// callers guard on [`Sample::FORMAT`] so the layouts always line up.
pub(crate) fn as_float_slice<S: Sample>(samples: &[S]) -> &[f32] {
    debug_assert_eq!(S::FORMAT, SampleFormat::Float32);
    bytemuck::cast_slice(samples)
}

pub(crate) fn as_float_slice_mut<S: Sample>(samples: &mut [S]) -> &mut [f32] {
    debug_assert_eq!(S::FORMAT, SampleFormat::Float32);
    bytemuck::cast_slice_mut(samples)
}

/// Narrow converted output back to the caller's representation.
pub(crate) fn from_float<S: Sample>(input: &[f32], output: &mut [S]) {
    for (out, &value) in output.iter_mut().zip(input) {
        *out = S::from_f32(value);
    }
}
