//! Callback-driven streaming conversion.
//!
//! Instead of the caller pushing chunks, the converter asks for input on
//! demand: each [`PullConverter::convert_into`] call may invoke the
//! registered callback zero or more times until the output buffer is full
//! or the callback runs dry. The callback hands back borrowed slices, so
//! the source data is never copied when it is already `f32`.

use crate::engine::{ConverterType, Engine};
use crate::error::Result;
use crate::format::{self, Sample, SampleFormat};
use std::os::raw::{c_long, c_void};

/// Everything the input callback needs, boxed so its address survives
/// moves of the converter. The converter state holds a raw pointer to this
/// for the whole session, which is why the context is owned by exactly one
/// converter and never shared.
struct PullContext<'a, From: Sample> {
    callback: Box<dyn FnMut() -> &'a [From] + 'a>,
    /// Bridged copy of the current chunk when the source is not `f32`.
    scratch_in: Vec<f32>,
    /// Rolling tail of the previous chunk for the linear lookback shim.
    /// Holds at least one frame at all times.
    history: Vec<f32>,
    /// Stable non-null location to report when the callback returns no
    /// data; the converter rejects null even for zero-length reads.
    sentinel: f32,
    channels: usize,
    converter_type: ConverterType,
}

impl<'a, From: Sample> PullContext<'a, From> {
    /// Answer one input request from the converter: fetch a chunk, bridge
    /// it to `f32`, and report where to read and how many frames.
    fn fill(&mut self, data: *mut *const f32) -> c_long {
        let chunk = (self.callback)();
        if chunk.is_empty() {
            unsafe { *data = &self.sentinel };
            return 0;
        }

        let floats: &[f32] = if From::FORMAT == SampleFormat::Float32 {
            format::as_float_slice(chunk)
        } else {
            self.scratch_in.clear();
            self.scratch_in.extend(chunk.iter().map(|s| s.to_f32()));
            &self.scratch_in
        };

        // Same lookback shim as the push path
        // (libsndfile/libsamplerate#208): a single-frame chunk is exposed
        // one frame into [previous, current] so the linear converter's
        // read-behind stays inside owned memory.
        let frames = (chunk.len() / self.channels) as c_long;
        if self.converter_type == ConverterType::Linear && floats.len() == self.channels {
            let tail = self.history.len() - self.channels;
            self.history.drain(..tail);
            self.history.extend_from_slice(floats);
            unsafe { *data = self.history.as_ptr().add(self.channels) };
        } else {
            if self.converter_type == ConverterType::Linear {
                let last_frame = floats.len() - self.channels;
                self.history.clear();
                self.history.extend_from_slice(&floats[last_frame..]);
            }
            unsafe { *data = floats.as_ptr() };
        }
        frames
    }
}

unsafe extern "C" fn trampoline<From: Sample>(
    cb_data: *mut c_void,
    data: *mut *const f32,
) -> c_long {
    if data.is_null() || cb_data.is_null() {
        return 0;
    }
    let context = &mut *(cb_data as *mut PullContext<'_, From>);
    context.fill(data)
}

/// Sample rate converter that pulls its input through a callback.
///
/// The callback returns the next chunk of interleaved input, or an empty
/// slice once the source is exhausted. The converter's FIR lookahead can
/// keep producing output past the first empty chunk, so a stream is only
/// fully drained after repeated zero-length results from
/// [`convert_into`](PullConverter::convert_into).
///
/// Move-only: the converter state holds a back-reference to the session
/// context, so there is no meaningful way to clone a mid-stream session.
pub struct PullConverter<'a, From: Sample> {
    // Field order drops the engine before the context it points into.
    engine: Engine,
    context: Box<PullContext<'a, From>>,
    channels: usize,
    ratio: f64,
    scratch_out: Vec<f32>,
}

impl<'a, From: Sample> PullConverter<'a, From> {
    /// Create a pull converter around `callback`.
    ///
    /// Plain `fn` items coerce, so a function pointer works as well as a
    /// capturing closure. Panics if the underlying library rejects the
    /// configuration, as [`crate::push::PushConverter::new`] does.
    pub fn new<F>(
        callback: F,
        converter_type: ConverterType,
        channels: usize,
        ratio: f64,
    ) -> PullConverter<'a, From>
    where
        F: FnMut() -> &'a [From] + 'a,
    {
        let mut context = Box::new(PullContext {
            callback: Box::new(callback),
            scratch_in: Vec::new(),
            history: vec![0.0; channels],
            sentinel: 0.0,
            channels,
            converter_type,
        });
        let context_ptr = &mut *context as *mut PullContext<'a, From> as *mut c_void;
        let engine = Engine::new_callback(trampoline::<From>, converter_type, channels, context_ptr);

        PullConverter {
            engine,
            context,
            channels,
            ratio,
            scratch_out: Vec::new(),
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Fill `output` with converted frames, pulling input through the
    /// callback as needed. Returns the number of samples written, which may
    /// be less than the buffer holds once the source runs dry; a
    /// zero-length result signals (possibly partial) exhaustion. No
    /// internal looping: callers wanting a fixed total call repeatedly.
    pub fn convert_into<To: Sample>(&mut self, output: &mut [To]) -> Result<usize> {
        let frames_requested = output.len() / self.channels;

        if To::FORMAT == SampleFormat::Float32 {
            let output_floats = format::as_float_slice_mut(output);
            let produced = self
                .engine
                .callback_read(self.ratio, frames_requested, output_floats)?;
            Ok(produced * self.channels)
        } else {
            let mut scratch = std::mem::take(&mut self.scratch_out);
            scratch.resize(output.len(), 0.0);
            let result = self.engine.callback_read(self.ratio, frames_requested, &mut scratch);
            if let Ok(produced) = result {
                let samples = produced * self.channels;
                format::from_float(&scratch[..samples], &mut output[..samples]);
            }
            self.scratch_out = scratch;
            result.map(|produced| produced * self.channels)
        }
    }
}
