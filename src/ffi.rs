//! Raw FFI for libsamplerate.
//!
//! Only the entry points the streaming wrappers need are declared here;
//! everything else in the library stays behind [`crate::engine`].

use std::os::raw::{c_char, c_int, c_long, c_void};

/// Opaque converter state, only ever handled through a pointer.
#[repr(C)]
pub struct SrcState {
    private: [u8; 0],
}

/// Mirror of libsamplerate's `SRC_DATA`.
///
/// `input_frames`/`output_frames` are capacities; `input_frames_used` and
/// `output_frames_gen` are filled in by the library.
#[repr(C)]
pub struct SrcData {
    pub data_in: *const f32,
    pub data_out: *mut f32,
    pub input_frames: c_long,
    pub output_frames: c_long,
    pub input_frames_used: c_long,
    pub output_frames_gen: c_long,
    pub end_of_input: c_int,
    pub src_ratio: f64,
}

/// Input callback for the pull API. Must set `*data` to a readable buffer
/// (never null, even for zero frames) and return the frame count.
pub type SrcCallback =
    unsafe extern "C" fn(cb_data: *mut c_void, data: *mut *const f32) -> c_long;

#[link(name = "samplerate")]
extern "C" {
    pub fn src_new(converter_type: c_int, channels: c_int, error: *mut c_int) -> *mut SrcState;

    pub fn src_clone(state: *mut SrcState, error: *mut c_int) -> *mut SrcState;

    // Always returns null
    pub fn src_delete(state: *mut SrcState) -> *mut SrcState;

    pub fn src_process(state: *mut SrcState, data: *mut SrcData) -> c_int;

    pub fn src_reset(state: *mut SrcState) -> c_int;

    pub fn src_simple(data: *mut SrcData, converter_type: c_int, channels: c_int) -> c_int;

    pub fn src_callback_new(
        func: SrcCallback,
        converter_type: c_int,
        channels: c_int,
        error: *mut c_int,
        cb_data: *mut c_void,
    ) -> *mut SrcState;

    pub fn src_callback_read(
        state: *mut SrcState,
        src_ratio: f64,
        frames: c_long,
        data: *mut f32,
    ) -> c_long;

    pub fn src_error(state: *mut SrcState) -> c_int;

    pub fn src_strerror(error: c_int) -> *const c_char;
}
