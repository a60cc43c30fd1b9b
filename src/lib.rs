//! Streaming sample rate conversion on top of libsamplerate.
//!
//! Three ways to convert interleaved multi-channel audio between sample
//! rates, all sharing the same format bridge over `i16`/`i32`/`f32`:
//!
//! - [`convert`]: one-shot, whole buffer in, whole buffer out.
//! - [`PushConverter`]: incremental; feed chunks of any size, flush at the
//!   end of the stream.
//! - [`PullConverter`]: the converter requests input through a callback as
//!   it fills the output buffer you hand it.
//!
//! The interpolation itself (windowed sinc at three quality levels, linear,
//! zero order hold) is libsamplerate's; this crate owns the streaming state
//! around it: carry-over of unconsumed input, end-of-stream handling,
//! output sizing, and sample format bridging.

#[macro_use]
extern crate log;

pub mod convert;
mod engine;
pub mod error;
mod ffi;
pub mod format;
pub mod pull;
pub mod push;
pub mod raw;

pub use convert::{convert, convert_into};
pub use engine::ConverterType;
pub use error::{Error, Result};
pub use format::{Sample, SampleFormat};
pub use pull::PullConverter;
pub use push::PushConverter;
pub use raw::{convert_raw, convert_raw_alloc};

#[cfg(test)]
mod push_tests;
