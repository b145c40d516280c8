// SPDX-License-Identifier: MPL-2.0
//! Single-frame camera capture via FFmpeg (optional `camera` feature).
//!
//! Capture opens the configured device path (e.g. `/dev/video0`), decodes
//! the first video frame, and scales it to RGBA. This is the same
//! decode/scale path used for regular video files, so whether a device node
//! works depends on the demuxers compiled into the system FFmpeg.
//!
//! Without the `camera` feature the entry point reports capture as
//! unavailable instead of failing to link against FFmpeg.

use crate::error::{Error, Result};
use crate::media::ImageData;

/// Grabs one frame from the capture device at `device`.
///
/// # Errors
///
/// Returns [`Error::Capture`] if the device cannot be opened, contains no
/// video stream, or produces no decodable frame — or if camera support was
/// not compiled in.
#[cfg(not(feature = "camera"))]
pub fn capture_frame(device: &str) -> Result<ImageData> {
    let _ = device;
    Err(Error::Capture(
        "camera support is not built into this binary (enable the `camera` feature)".into(),
    ))
}

/// Grabs one frame from the capture device at `device`.
///
/// # Errors
///
/// Returns [`Error::Capture`] if the device cannot be opened, contains no
/// video stream, or produces no decodable frame.
#[cfg(feature = "camera")]
pub fn capture_frame(device: &str) -> Result<ImageData> {
    use std::path::PathBuf;

    init_ffmpeg()?;

    let path = PathBuf::from(device);
    let mut input_context = ffmpeg_next::format::input(&path)
        .map_err(|e| Error::Capture(format!("Failed to open capture device: {e}")))?;

    let (stream_index, parameters) = {
        let stream = input_context
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| Error::Capture("No video stream on capture device".into()))?;
        (stream.index(), stream.parameters())
    };

    let codec_context = ffmpeg_next::codec::context::Context::from_parameters(parameters)
        .map_err(|e| Error::Capture(format!("Failed to create decoder context: {e}")))?;
    let mut decoder = codec_context
        .decoder()
        .video()
        .map_err(|e| Error::Capture(format!("Failed to open video decoder: {e}")))?;

    let width = decoder.width();
    let height = decoder.height();

    let mut scaler = ffmpeg_next::software::scaling::Context::get(
        decoder.format(),
        width,
        height,
        ffmpeg_next::format::Pixel::RGBA,
        width,
        height,
        ffmpeg_next::software::scaling::Flags::BILINEAR,
    )
    .map_err(|e| Error::Capture(format!("Failed to create scaler: {e}")))?;

    // Feed packets until the decoder yields the first frame
    for (stream, packet) in input_context.packets() {
        if stream.index() != stream_index {
            continue;
        }

        if decoder.send_packet(&packet).is_err() {
            continue;
        }

        let mut decoded = ffmpeg_next::frame::Video::empty();
        if decoder.receive_frame(&mut decoded).is_ok() {
            let mut rgba_frame = ffmpeg_next::frame::Video::empty();
            scaler
                .run(&decoded, &mut rgba_frame)
                .map_err(|e| Error::Capture(format!("Scaling failed: {e}")))?;

            let rgba_bytes = extract_rgba_data(&rgba_frame);
            return Ok(ImageData::from_rgba(width, height, rgba_bytes));
        }
    }

    Err(Error::Capture("Capture device produced no frame".into()))
}

/// One-time FFmpeg library initialization.
#[cfg(feature = "camera")]
fn init_ffmpeg() -> Result<()> {
    use std::sync::Once;

    static FFMPEG_INIT: Once = Once::new();
    let mut init_result: Result<()> = Ok(());

    FFMPEG_INIT.call_once(|| {
        if let Err(e) = ffmpeg_next::init() {
            init_result = Err(Error::Capture(format!("FFmpeg initialization failed: {e}")));
        }
    });

    init_result
}

/// Extracts RGBA data from a decoded frame, handling stride correctly.
#[cfg(feature = "camera")]
#[allow(clippy::cast_possible_truncation)] // stride is always < u32::MAX for video frames
fn extract_rgba_data(frame: &ffmpeg_next::frame::Video) -> Vec<u8> {
    let width = frame.width();
    let height = frame.height();
    let data = frame.data(0);
    let stride = frame.stride(0);

    let mut rgba_bytes = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        let row_start = (y * stride as u32) as usize;
        let row_end = row_start + (width * 4) as usize;
        rgba_bytes.extend_from_slice(&data[row_start..row_end]);
    }

    rgba_bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "camera"))]
    #[test]
    fn capture_without_feature_reports_unavailable() {
        match capture_frame("/dev/video0") {
            Err(Error::Capture(message)) => assert!(message.contains("not built")),
            other => panic!("expected Capture error, got {other:?}"),
        }
    }

    #[cfg(feature = "camera")]
    #[test]
    fn capture_from_missing_device_errors() {
        let result = capture_frame("/nonexistent/video-device");
        assert!(matches!(result, Err(Error::Capture(_))));
    }
}
