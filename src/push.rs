//! Caller-driven streaming conversion.
//!
//! Input arrives in arbitrarily sized chunks across repeated calls. The
//! converter decides how much of the combined pending input it consumes
//! each time; the unconsumed tail is carried over to the next call, so
//! callers never have to track partial consumption themselves.

use crate::engine::{ConverterType, Engine};
use crate::error::Result;
use crate::format::{self, Sample, SampleFormat};

/// Incremental sample rate converter fed by the caller.
///
/// Feed chunks with [`convert`](PushConverter::convert) or
/// [`convert_into`](PushConverter::convert_into), then finish the stream
/// with [`flush`](PushConverter::flush). After a flush the converter state
/// is reset and the same instance can run a new, independent stream.
///
/// Cloning deep-copies the converter state, pending input, and counters;
/// the two instances produce identical output for identical input from the
/// moment of the clone, and may be driven independently afterwards.
pub struct PushConverter {
    engine: Engine,
    converter_type: ConverterType,
    channels: usize,
    ratio: f64,
    /// Interleaved input accepted but not yet consumed. Always a whole
    /// number of frames.
    carry: Vec<f32>,
    /// Previous consumed frame, kept for the linear lookback shim.
    history: Vec<f32>,
    scratch_out: Vec<f32>,
    frames_in: u64,
    frames_out: u64,
}

impl PushConverter {
    /// Create a converter for `channels`-channel interleaved audio at the
    /// given output/input rate ratio.
    ///
    /// Panics if the underlying library rejects the configuration (zero
    /// channels); that is a programming error, not a runtime condition.
    pub fn new(converter_type: ConverterType, channels: usize, ratio: f64) -> PushConverter {
        PushConverter {
            engine: Engine::new(converter_type, channels),
            converter_type,
            channels,
            ratio,
            carry: Vec::new(),
            history: vec![0.0; channels],
            scratch_out: Vec::new(),
            frames_in: 0,
            frames_out: 0,
        }
    }

    pub fn converter_type(&self) -> ConverterType {
        self.converter_type
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Feed one chunk and collect whatever output is ready, in a freshly
    /// allocated buffer sized by the running conversion estimate.
    ///
    /// An empty `input` marks the end of the stream, draining the
    /// converter's internal buffer; [`flush`](PushConverter::flush) is the
    /// named form of that call.
    pub fn convert<To, From>(&mut self, input: &[From]) -> Result<Vec<To>>
    where
        To: Sample,
        From: Sample,
    {
        let frames = self.frames_to_reserve(input.len());
        let mut output = vec![To::default(); frames * self.channels];
        let written = self.convert_into(input, &mut output)?;
        output.truncate(written);
        Ok(output)
    }

    /// Feed one chunk, writing output into a caller-supplied buffer.
    ///
    /// Returns the number of samples written. Input the converter did not
    /// consume this round (including for lack of output space) is retained
    /// and consumed on later calls.
    pub fn convert_into<To, From>(&mut self, input: &[From], output: &mut [To]) -> Result<usize>
    where
        To: Sample,
        From: Sample,
    {
        if From::FORMAT == SampleFormat::Float32 {
            self.carry.extend_from_slice(format::as_float_slice(input));
        } else {
            self.carry.extend(input.iter().map(|s| s.to_f32()));
        }
        // Counted on acceptance, not consumption, so the flush estimate
        // covers carried-over input too.
        self.frames_in += (input.len() / self.channels) as u64;

        let end_of_input = input.is_empty();

        if To::FORMAT == SampleFormat::Float32 {
            let output_floats = format::as_float_slice_mut(output);
            self.process_pending(output_floats, end_of_input)
        } else {
            let mut scratch = std::mem::take(&mut self.scratch_out);
            scratch.resize(output.len(), 0.0);
            let result = self.process_pending(&mut scratch, end_of_input);
            if let Ok(samples) = result {
                format::from_float(&scratch[..samples], &mut output[..samples]);
            }
            self.scratch_out = scratch;
            result
        }
    }

    /// End the stream, draining any internally buffered output.
    ///
    /// The converter resets afterwards and can be reused for a new stream.
    /// A second flush with no intervening input returns an empty buffer.
    pub fn flush<To: Sample>(&mut self) -> Result<Vec<To>> {
        self.convert::<To, f32>(&[])
    }

    /// [`flush`](PushConverter::flush) into a caller-supplied buffer.
    pub fn flush_into<To: Sample>(&mut self, output: &mut [To]) -> Result<usize> {
        self.convert_into::<To, f32>(&[], output)
    }

    /// Run the pending carry-over through the converter. Returns samples
    /// produced and drops the consumed prefix from the carry buffer.
    fn process_pending(&mut self, output: &mut [f32], end_of_input: bool) -> Result<usize> {
        let outcome = if self.converter_type == ConverterType::Linear
            && self.carry.len() == self.channels
        {
            // The linear converter reads one frame before the supplied
            // pointer when handed exactly one frame
            // (libsndfile/libsamplerate#208). Hand it a pointer one frame
            // into [previous, current] so the lookback lands on the frame
            // it actually wants, inside an allocation we own.
            if self.history.len() < self.channels {
                self.history.clear();
                self.history.resize(self.channels, 0.0);
            }
            let tail = self.history.len() - self.channels;
            self.history.drain(..tail);
            self.history.extend_from_slice(&self.carry);
            self.engine
                .process(&self.history[self.channels..], output, self.ratio, end_of_input)?
        } else {
            self.engine
                .process(&self.carry, output, self.ratio, end_of_input)?
        };

        if end_of_input {
            self.engine.reset()?;
        }

        let consumed = outcome.frames_consumed * self.channels;
        if self.converter_type == ConverterType::Linear {
            self.history.clear();
            if consumed > 0 {
                self.history
                    .extend_from_slice(&self.carry[consumed - self.channels..consumed]);
            }
        }
        self.carry.drain(..consumed);

        self.frames_out += outcome.frames_produced as u64;

        Ok(outcome.frames_produced * self.channels)
    }

    /// Output frames to allocate for a chunk of `samples` input samples.
    ///
    /// With input, the estimate follows the ratio; with none (flush), it is
    /// what the running totals say is still owed. One extra frame covers
    /// the converter's rounding either way.
    pub(crate) fn frames_to_reserve(&self, samples: usize) -> usize {
        let frames = if samples > 0 {
            ((samples / self.channels) as f64 * self.ratio).ceil() as usize
        } else {
            let expected = (self.frames_in as f64 * self.ratio).ceil() as u64;
            expected.saturating_sub(self.frames_out) as usize
        };
        frames + 1
    }
}

impl Clone for PushConverter {
    fn clone(&self) -> PushConverter {
        PushConverter {
            engine: self.engine.duplicate(),
            converter_type: self.converter_type,
            channels: self.channels,
            ratio: self.ratio,
            carry: self.carry.clone(),
            history: self.history.clone(),
            scratch_out: Vec::new(),
            frames_in: self.frames_in,
            frames_out: self.frames_out,
        }
    }
}
