//! Animated GIF export of animation playback

use crate::engine::animation::Animation;
use crate::io::configuration::VIEWER_MIN_FRAME_DELAY_MS;
use crate::io::error::{IfsError, Result, invalid_parameter};
use crate::io::persistence::create_parent;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame};
use std::path::Path;
use tracing::info;

/// Delay and keep-every-n factor for a requested frame delay
///
/// Viewers do not honor delays below `VIEWER_MIN_FRAME_DELAY_MS`; shorter
/// requests keep one frame in `n` at the minimum delay so the apparent speed
/// is preserved.
pub const fn frame_pacing(frame_delay_ms: u32) -> (u32, usize) {
    if frame_delay_ms >= VIEWER_MIN_FRAME_DELAY_MS {
        return (frame_delay_ms, 1);
    }
    let skip = if frame_delay_ms == 0 {
        1
    } else {
        VIEWER_MIN_FRAME_DELAY_MS.div_ceil(frame_delay_ms)
    };
    (VIEWER_MIN_FRAME_DELAY_MS, skip as usize)
}

/// Write the animation's playback sequence as a looping GIF
///
/// # Errors
///
/// Returns an error if:
/// - The animation has no frames
/// - The output file cannot be created
/// - GIF encoding fails
pub fn export_gif(animation: &Animation, path: &Path, frame_delay_ms: u32) -> Result<()> {
    if animation.is_empty() {
        return Err(invalid_parameter(
            "animation",
            &0,
            &"no frames to export",
        ));
    }
    let (delay_ms, skip) = frame_pacing(frame_delay_ms);

    let frames: Vec<Frame> = animation
        .playback()
        .step_by(skip)
        .map(|render| {
            Frame::from_parts(
                DynamicImage::ImageRgb8(render.clone()).into_rgba8(),
                0,
                0,
                Delay::from_numer_denom_ms(delay_ms, 1),
            )
        })
        .collect();
    let frame_count = frames.len();

    create_parent(path)?;
    let file = std::fs::File::create(path).map_err(|source| IfsError::FileSystem {
        path: path.to_path_buf(),
        operation: "create file",
        source,
    })?;

    let mut encoder = GifEncoder::new(file);
    encoder
        .set_repeat(Repeat::Infinite)
        .map_err(|source| IfsError::ImageExport {
            path: path.to_path_buf(),
            source,
        })?;
    encoder
        .encode_frames(frames)
        .map_err(|source| IfsError::ImageExport {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), frames = frame_count, delay_ms, "exported animation");
    Ok(())
}
