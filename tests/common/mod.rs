//! Test infrastructure for src-stream integration tests.
//!
//! Signal generators, RMS comparison helpers, and reference drivers for
//! the push and pull conversion paths.

#![allow(dead_code)]

use src_stream::{ConverterType, PullConverter, PushConverter, Sample, SampleFormat};

/// Consecutive zero-length pull results before a stream counts as fully
/// drained. The converter's lookahead can deliver output after the first
/// empty callback, so one empty read is not enough; two is what the
/// underlying library needs in practice.
pub const DRAIN_EMPTY_READS: usize = 2;

/// Every algorithm the converter supports, for grid tests.
pub const ALL_TYPES: [ConverterType; 5] = [
    ConverterType::SincBestQuality,
    ConverterType::SincMediumQuality,
    ConverterType::SincFastest,
    ConverterType::ZeroOrderHold,
    ConverterType::Linear,
];

/// Ratio grid shared by the streaming tests: downsampling, identity, and
/// upsampling cases.
pub const ALL_RATIOS: [f64; 7] = [0.1, 0.5, 0.9, 1.0, 1.5, 2.0, 4.5];

/// Generate interleaved sine waves, one frequency per channel.
pub fn make_sine(hz: &[f32], sample_rate: f32, frames: usize) -> Vec<f32> {
    let channels = hz.len();
    let mut data = vec![0f32; frames * channels];
    for (i, frame) in data.chunks_mut(channels).enumerate() {
        for (sample, &f) in frame.iter_mut().zip(hz) {
            *sample = (f * i as f32 * 2.0 * std::f32::consts::PI / sample_rate).sin();
        }
    }
    data
}

/// Root-mean-square difference between two equally sized buffers.
pub fn rms_error<S>(a: &[S], b: &[S]) -> f64
where
    S: Sample + Into<f64>,
{
    assert_eq!(a.len(), b.len(), "rms over differently sized buffers");
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let diff = x.into() - y.into();
            diff * diff
        })
        .sum();
    (sum / a.len() as f64).sqrt()
}

pub fn to_decibels(value: f64, reference: f64) -> f64 {
    20.0 * (value / reference).abs().log10()
}

/// Quantization floor in dB for a conversion between two formats: the
/// noisier of the two representations bounds the achievable fidelity.
pub fn rms_limit_db(from: SampleFormat, to: SampleFormat) -> f64 {
    if from == SampleFormat::Int16 || to == SampleFormat::Int16 {
        -80.0
    } else if from == SampleFormat::Int32 || to == SampleFormat::Int32 {
        -160.0
    } else {
        -300.0
    }
}

/// Assert the RMS error between reference and output stays under the
/// quantization floor for the formats involved.
pub fn check_rms<To, From>(reference: &[To], output: &[To])
where
    To: Sample + Into<f64>,
    From: Sample,
{
    let limit = rms_limit_db(From::FORMAT, To::FORMAT);
    let full_scale = match To::FORMAT {
        SampleFormat::Int16 => i16::MAX as f64,
        SampleFormat::Int32 => i32::MAX as f64,
        SampleFormat::Float32 => 1.0,
    };
    let rms = to_decibels(rms_error(reference, output), full_scale);
    assert!(
        rms <= limit,
        "rms error {rms:.1} dB above the {limit:.0} dB floor for {:?} -> {:?}",
        From::FORMAT,
        To::FORMAT
    );
}

/// Push the whole input in one call, then flush. The reference result for
/// the streaming equivalence tests.
pub fn push_all(input: &[f32], channels: usize, ratio: f64, ty: ConverterType) -> Vec<f32> {
    push_chunked(input, channels, ratio, ty, input.len() / channels)
}

/// Push the input in `chunk_frames`-frame pieces, then flush.
pub fn push_chunked(
    input: &[f32],
    channels: usize,
    ratio: f64,
    ty: ConverterType,
    chunk_frames: usize,
) -> Vec<f32> {
    let mut converter = PushConverter::new(ty, channels, ratio);
    let mut output = Vec::new();
    for chunk in input.chunks(chunk_frames.max(1) * channels) {
        output.extend(converter.convert::<f32, f32>(chunk).expect("push convert"));
    }
    output.extend(converter.flush::<f32>().expect("push flush"));
    output
}

/// Make a pull callback that serves `input` in `chunk_frames`-frame pieces
/// (or everything at once when `chunk_frames` is `None`), then empties.
pub fn chunked_source<'a, S: Sample>(
    input: &'a [S],
    channels: usize,
    chunk_frames: Option<usize>,
) -> impl FnMut() -> &'a [S] {
    let mut remaining = input;
    move || {
        let take = match chunk_frames {
            Some(frames) => remaining.len().min(frames * channels),
            None => remaining.len(),
        };
        let (head, tail) = remaining.split_at(take);
        remaining = tail;
        head
    }
}

/// Pull the whole conversion in one `convert_into` call, with an output
/// buffer sized from the expected frame count.
pub fn pull_once(
    input: &[f32],
    channels: usize,
    ratio: f64,
    ty: ConverterType,
    chunk_frames: Option<usize>,
) -> Vec<f32> {
    let frames_expected = ((input.len() / channels) as f64 * ratio).ceil() as usize;
    let mut output = vec![0f32; frames_expected * channels];

    let source = chunked_source(input, channels, chunk_frames);
    let mut puller = PullConverter::new(source, ty, channels, ratio);
    let written = puller.convert_into(&mut output).expect("pull convert");
    output.truncate(written);
    output
}

/// Pull in `out_frames`-frame requests until the stream reports drained
/// (two consecutive empty reads), feeding input `in_frames` at a time.
pub fn pull_in_pieces(
    input: &[f32],
    channels: usize,
    ratio: f64,
    ty: ConverterType,
    in_frames: usize,
    out_frames: usize,
) -> Vec<f32> {
    let source = chunked_source(input, channels, Some(in_frames));
    let mut puller = PullConverter::new(source, ty, channels, ratio);

    let mut output = Vec::new();
    let mut buffer = vec![0f32; out_frames * channels];
    let mut empty_reads = 0;
    while empty_reads < DRAIN_EMPTY_READS {
        let written = puller.convert_into(&mut buffer).expect("pull convert");
        if written == 0 {
            empty_reads += 1;
        } else {
            empty_reads = 0;
            output.extend_from_slice(&buffer[..written]);
        }
    }
    output
}

/// Compare a streamed output against its reference, tolerating a one-frame
/// difference at the stream tail: the shorter buffer decides the compared
/// prefix, and the prefixes must match exactly.
pub fn assert_equal_with_tail_fudge(output: &[f32], reference: &[f32], channels: usize) {
    let diff = output.len().abs_diff(reference.len());
    assert!(
        diff <= channels,
        "output length {} and reference length {} differ by more than one frame",
        output.len(),
        reference.len()
    );
    let common = output.len().min(reference.len());
    assert_eq!(&output[..common], &reference[..common]);
}
