//! Owned handle around a libsamplerate converter state.
//!
//! Everything unsafe about talking to the library lives here: handle
//! lifetime, the non-null input pointer requirement for zero-length
//! buffers, and error-code translation. The streaming state machines in
//! [`crate::push`] and [`crate::pull`] stay in safe code.

use crate::error::{Error, Result};
use crate::ffi;
use std::ffi::CStr;
use std::os::raw::{c_int, c_long, c_void};

/// Conversion algorithm selector, matching libsamplerate's converter ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConverterType {
    /// Band-limited sinc interpolation, best quality, 144 dB SNR, 96% BW.
    SincBestQuality = 0,
    /// Band-limited sinc interpolation, medium quality, 121 dB SNR, 90% BW.
    SincMediumQuality = 1,
    /// Band-limited sinc interpolation, low quality, 97 dB SNR, 80% BW.
    SincFastest = 2,
    /// Zero order hold interpolator, very fast, poor quality.
    ZeroOrderHold = 3,
    /// Linear interpolator, blindingly fast, poor quality.
    Linear = 4,
}

/// What one processing call did: how much input it accepted and how much
/// output it generated, both in frames. Not persisted anywhere.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ProcessOutcome {
    pub frames_consumed: usize,
    pub frames_produced: usize,
}

/// Exclusively owned converter state. Dropped exactly once; cloning goes
/// through [`Engine::duplicate`], which deep-copies the filter state so the
/// two handles never share anything.
pub(crate) struct Engine {
    state: *mut ffi::SrcState,
    channels: usize,
    // Stands in for the input pointer on zero-length calls. The library
    // rejects null input even when no frames are readable.
    sentinel: f32,
}

impl Engine {
    /// Create a converter state.
    ///
    /// Panics if the library rejects the configuration: an unsupported
    /// algorithm id or a non-positive channel count cannot arise from
    /// runtime data, only from caller code.
    pub fn new(converter_type: ConverterType, channels: usize) -> Engine {
        let mut error: c_int = 0;
        let state =
            unsafe { ffi::src_new(converter_type as c_int, channels as c_int, &mut error) };
        if state.is_null() || error != 0 {
            panic!(
                "failed to create {:?} converter with {} channels: {}",
                converter_type,
                channels,
                strerror(error)
            );
        }

        debug!("created {converter_type:?} converter, {channels} channels");

        Engine {
            state,
            channels,
            sentinel: 0.0,
        }
    }

    /// Create a converter state in callback (pull) mode. `cb_data` must
    /// stay valid and address-stable for the life of the handle.
    ///
    /// Panics on misconfiguration, as [`Engine::new`] does.
    pub fn new_callback(
        func: ffi::SrcCallback,
        converter_type: ConverterType,
        channels: usize,
        cb_data: *mut c_void,
    ) -> Engine {
        let mut error: c_int = 0;
        let state = unsafe {
            ffi::src_callback_new(
                func,
                converter_type as c_int,
                channels as c_int,
                &mut error,
                cb_data,
            )
        };
        if state.is_null() || error != 0 {
            panic!(
                "failed to create {:?} pull converter with {} channels: {}",
                converter_type,
                channels,
                strerror(error)
            );
        }

        debug!("created {converter_type:?} pull converter, {channels} channels");

        Engine {
            state,
            channels,
            sentinel: 0.0,
        }
    }

    /// Deep copy of the converter, internal filter state included. The
    /// copy produces identical output to the original for identical input.
    ///
    /// Panics if the library cannot allocate the copy; like construction,
    /// this is not a condition valid runtime data can produce.
    pub fn duplicate(&self) -> Engine {
        let mut error: c_int = 0;
        let state = unsafe { ffi::src_clone(self.state, &mut error) };
        if state.is_null() || error != 0 {
            panic!("failed to clone converter state: {}", strerror(error));
        }
        Engine {
            state,
            channels: self.channels,
            sentinel: 0.0,
        }
    }

    /// Reset to the freshly-constructed state, keeping the configuration.
    pub fn reset(&mut self) -> Result<()> {
        let status = unsafe { ffi::src_reset(self.state) };
        if status != 0 {
            return Err(Error::Engine(strerror(status)));
        }
        Ok(())
    }

    /// One incremental processing call. `input` may start mid-allocation;
    /// the slice is handed to the library as-is. Returns how many frames
    /// were consumed and produced.
    pub fn process(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        ratio: f64,
        end_of_input: bool,
    ) -> Result<ProcessOutcome> {
        let data_in = if input.is_empty() {
            &self.sentinel as *const f32
        } else {
            input.as_ptr()
        };
        let mut data = ffi::SrcData {
            data_in,
            data_out: output.as_mut_ptr(),
            input_frames: (input.len() / self.channels) as c_long,
            output_frames: (output.len() / self.channels) as c_long,
            input_frames_used: 0,
            output_frames_gen: 0,
            end_of_input: end_of_input as c_int,
            src_ratio: ratio,
        };

        let status = unsafe { ffi::src_process(self.state, &mut data) };
        if status != 0 {
            return Err(Error::Engine(strerror(status)));
        }

        trace!(
            "process ratio {ratio}{}: consumed {}/{} frames, produced {}/{}",
            if end_of_input { " (eof)" } else { "" },
            data.input_frames_used,
            data.input_frames,
            data.output_frames_gen,
            data.output_frames,
        );

        Ok(ProcessOutcome {
            frames_consumed: data.input_frames_used as usize,
            frames_produced: data.output_frames_gen as usize,
        })
    }

    /// Pull converted frames through the registered callback. Returns the
    /// number of frames written to `output`; zero once the input source is
    /// exhausted and the lookahead has drained.
    pub fn callback_read(
        &mut self,
        ratio: f64,
        frames: usize,
        output: &mut [f32],
    ) -> Result<usize> {
        let produced =
            unsafe { ffi::src_callback_read(self.state, ratio, frames as c_long, output.as_mut_ptr()) };
        if produced < 0 {
            let code = unsafe { ffi::src_error(self.state) };
            return Err(Error::Engine(strerror(code)));
        }

        trace!("callback_read ratio {ratio}: produced {produced}/{frames} frames");

        Ok(produced as usize)
    }

    /// Stateless whole-buffer conversion, always end-of-stream.
    pub fn process_once(
        converter_type: ConverterType,
        channels: usize,
        input: &[f32],
        output: &mut [f32],
        ratio: f64,
    ) -> Result<ProcessOutcome> {
        let sentinel = 0f32;
        let data_in = if input.is_empty() {
            &sentinel as *const f32
        } else {
            input.as_ptr()
        };
        let mut data = ffi::SrcData {
            data_in,
            data_out: output.as_mut_ptr(),
            input_frames: (input.len() / channels) as c_long,
            output_frames: (output.len() / channels) as c_long,
            input_frames_used: 0,
            output_frames_gen: 0,
            end_of_input: 1,
            src_ratio: ratio,
        };

        let status =
            unsafe { ffi::src_simple(&mut data, converter_type as c_int, channels as c_int) };
        if status != 0 {
            return Err(Error::Engine(strerror(status)));
        }

        Ok(ProcessOutcome {
            frames_consumed: data.input_frames_used as usize,
            frames_produced: data.output_frames_gen as usize,
        })
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        unsafe { ffi::src_delete(self.state) };
    }
}

/// Translate a libsamplerate error code into its message.
pub(crate) fn strerror(code: c_int) -> String {
    let ptr = unsafe { ffi::src_strerror(code) };
    if ptr.is_null() {
        return format!("unknown error {code}");
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}
