//! Blending between skeletons and the per-frame plans of animations
//!
//! Transitions ease between two skeletons with a cosine curve, rotations spin
//! the selected transform half a turn per cycle, and zooms follow the spiral
//! path from identity to the selected transform.

use crate::io::configuration::ZOOM_POINT_GROWTH_LIMIT;
use crate::io::error::{Result, invalid_parameter};
use crate::system::skeleton::Skeleton;
use crate::system::transform::Transform;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How corresponding transforms of two skeletons are blended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Blend {
    /// Coefficient-wise convex combination
    #[default]
    Linear,
    /// Log-polar blend around each transform's fixed point
    Spiral,
}

/// Blend two skeletons of equal size; `rate = 1` gives `s1`, `rate = 0` gives `s2`
///
/// Frames are always blended linearly.
///
/// # Errors
///
/// Returns an error if the skeletons have different sizes
pub fn blend_skeletons(s1: &Skeleton, s2: &Skeleton, rate: f64, blend: Blend) -> Result<Skeleton> {
    match blend {
        Blend::Linear => Skeleton::weighted_mix(s1, s2, rate),
        Blend::Spiral => {
            if s1.len() != s2.len() {
                return Err(invalid_parameter(
                    "transforms",
                    &s2.len(),
                    &format!("blending needs {} transforms", s1.len()),
                ));
            }
            let transforms = s1
                .transforms()
                .iter()
                .zip(s2.transforms())
                .map(|(t1, t2)| Transform::spiral_mix(t1, t2, rate))
                .collect();
            let frame = Transform::weighted_mix(s1.frame(), s2.frame(), rate);
            Skeleton::from_parts(frame, transforms, s1.selected())
        }
    }
}

/// Eased transition rate of render `step` in `0..=frames`
///
/// Follows `(1 − cos(πk/N))/2` for `k = step − N`, going from 1 at the first
/// render to 0 at the last.
pub fn transition_rate(step: usize, frames: usize) -> f64 {
    if frames == 0 {
        return 0.0;
    }
    let k = step as f64 - frames as f64;
    (1.0 - (PI * k / frames as f64).cos()) / 2.0
}

/// The `frames + 1` skeletons of a transition from `start` to `end`
///
/// # Errors
///
/// Returns an error if the skeletons have different sizes
pub fn transition_skeletons(
    start: &Skeleton,
    end: &Skeleton,
    frames: usize,
    blend: Blend,
) -> Result<Vec<Skeleton>> {
    (0..=frames)
        .map(|step| blend_skeletons(start, end, transition_rate(step, frames), blend))
        .collect()
}

/// Playback order of a transition: forward over all renders, then back
///
/// Yields `2·frames` indices into the `frames + 1` renders, so the loop
/// closes without repeating either end.
pub fn ping_pong_sequence(frames: usize) -> Vec<usize> {
    (0..=frames).chain((1..frames).rev()).collect()
}

/// The `2·frames` skeletons of one rotation cycle
///
/// Render `k` has its selected transform rotated by `k·π/frames`; the
/// rotation is recomputed from the start for each render.
pub fn rotation_skeletons(skeleton: &Skeleton, frames: usize) -> Vec<Skeleton> {
    if frames == 0 {
        return Vec::new();
    }
    let step = PI / frames as f64;
    (0..2 * frames)
        .map(|k| {
            let mut rotated = skeleton.clone();
            rotated.rotate_selected(step * k as f64);
            rotated
        })
        .collect()
}

/// View transform and point budget of one zoom frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomStep {
    /// Orbit points are mapped through the inverse of this transform
    pub view: Transform,
    /// Points to draw for this frame
    pub points: u64,
}

/// The `frames` steps zooming from the whole attractor into the selected piece
///
/// Step `k` views the orbit through `spiral_mix(selected, identity, k/frames)`.
/// The point budget grows with the magnification so deep frames stay as
/// dense as the first one, capped at `ZOOM_POINT_GROWTH_LIMIT` times
/// `points_per_frame`.
///
/// # Errors
///
/// Returns an error if the frame transform is selected
pub fn zoom_steps(
    skeleton: &Skeleton,
    frames: usize,
    points_per_frame: u64,
) -> Result<Vec<ZoomStep>> {
    if skeleton.selected() == 0 {
        return Err(invalid_parameter("selected", &0, &"the frame cannot be zoomed into"));
    }
    let target = *skeleton.selected_transform();
    let start_dilation = 1.0 / Transform::IDENTITY.surface();
    let end_dilation = 1.0 / target.surface();
    let other_dilation = 1.0 / (skeleton.sum_surfaces() - target.surface());

    Ok((0..frames)
        .map(|k| {
            let rate = k as f64 / frames as f64;
            let view = Transform::spiral_mix(&target, &Transform::IDENTITY, rate);
            let growth = if (end_dilation - start_dilation).abs() > f64::EPSILON {
                1.0 + (1.0 / view.surface() - start_dilation) / (end_dilation - start_dilation)
                    * end_dilation
                    / other_dilation
            } else {
                1.0
            };
            let growth = if growth.is_finite() {
                growth.clamp(0.0, ZOOM_POINT_GROWTH_LIMIT)
            } else {
                ZOOM_POINT_GROWTH_LIMIT
            };
            ZoomStep {
                view,
                points: (growth * points_per_frame as f64) as u64,
            }
        })
        .collect())
}
