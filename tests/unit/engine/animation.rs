//! Tests for transition, rotation and zoom animations

#[cfg(test)]
mod tests {
    use ifsforge::engine::animation::{
        AnimationSettings, render_rotation, render_transition, render_zoom, shared_bounds,
    };
    use ifsforge::render::density::DensityKind;
    use ifsforge::render::image::{Background, ImageSettings};
    use ifsforge::system::interpolation::Blend;
    use ifsforge::system::mode::Mode;
    use ifsforge::system::skeleton::{Preset, Skeleton};
    use ifsforge::system::transform::Transform;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn settings(frames: usize) -> AnimationSettings {
        AnimationSettings {
            frames,
            points_per_frame: 1_000,
            image: ImageSettings {
                width: 32,
                height: 24,
                density: DensityKind::Exact,
                background: Background::Black,
                ramp: None,
                seed: 0,
            },
            blend: Blend::Linear,
            seed: 11,
        }
    }

    // Tests transitions render N+1 frames played ping-pong
    // Verified by playing the renders forward only
    #[test]
    fn test_transition_ping_pong() {
        let start = Skeleton::preset(Preset::Dragon);
        let end = Skeleton::preset(Preset::Triangle);
        let mut calls = Vec::new();
        let mut record = |index: usize, total: usize| calls.push((index, total));
        let animation = render_transition(&Mode::Linear, &start, &end, &settings(3), &mut record);

        let Ok(animation) = animation else {
            panic!("transition failed");
        };
        assert_eq!(animation.renders().len(), 4);
        assert_eq!(animation.sequence(), &[0, 1, 2, 3, 2, 1]);
        assert_eq!(animation.len(), 6);
        assert_eq!(animation.playback().count(), 6);
        assert_eq!(calls, vec![(0, 4), (1, 4), (2, 4), (3, 4)]);
        assert!(animation.renders().iter().all(|r| r.dimensions() == (32, 24)));
    }

    // Tests mismatched skeleton sizes are rejected
    // Verified by truncating the longer skeleton
    #[test]
    fn test_transition_size_mismatch() {
        let start = Skeleton::preset(Preset::Dragon);
        let Ok(end) = Skeleton::regular(3) else {
            panic!("regular skeleton rejected");
        };
        let result = render_transition(&Mode::Linear, &start, &end, &settings(2), &mut |_, _| {});
        assert!(result.is_err());
    }

    // Tests rotations render 2N frames in order
    // Verified by rendering N frames for half a turn
    #[test]
    fn test_rotation_frames() {
        let skeleton = Skeleton::preset(Preset::Dragon);
        let animation = render_rotation(&Mode::Linear, &skeleton, &settings(3), &mut |_, _| {});
        let Ok(animation) = animation else {
            panic!("rotation failed");
        };
        assert_eq!(animation.renders().len(), 6);
        assert_eq!(animation.sequence(), &[0, 1, 2, 3, 4, 5]);
    }

    // Tests animations are reproducible for a fixed seed
    // Verified by seeding frames from the clock
    #[test]
    fn test_rotation_reproducible() {
        let skeleton = Skeleton::preset(Preset::Triangle);
        let render = || {
            render_rotation(&Mode::Linear, &skeleton, &settings(2), &mut |_, _| {})
                .map(|animation| animation.renders().to_vec())
                .ok()
        };
        let first = render();
        assert!(first.is_some());
        assert_eq!(first, render());
    }

    // Tests zooms render N frames and skip a selected frame transform
    // Verified by rejecting a selected frame transform
    #[test]
    fn test_zoom_frames() {
        let dragon = Skeleton::preset(Preset::Dragon);
        let parts = Skeleton::from_parts(*dragon.frame(), dragon.transforms().to_vec(), 0);
        let Ok(framed) = parts else {
            panic!("dragon parts rejected");
        };
        let animation = render_zoom(&Mode::Linear, &framed, &settings(4), &mut |_, _| {});
        let Ok(animation) = animation else {
            panic!("zoom failed");
        };
        assert_eq!(animation.renders().len(), 4);
        assert_eq!(animation.sequence(), &[0, 1, 2, 3]);
    }

    // Tests zero frames are rejected up front
    // Verified by returning an empty animation
    #[test]
    fn test_zero_frames_rejected() {
        let skeleton = Skeleton::preset(Preset::Dragon);
        assert!(settings(0).validate().is_err());
        assert!(render_rotation(&Mode::Linear, &skeleton, &settings(0), &mut |_, _| {}).is_err());
        assert!(render_zoom(&Mode::Linear, &skeleton, &settings(0), &mut |_, _| {}).is_err());
        assert!(AnimationSettings::default().validate().is_ok());
    }

    // Tests shared bounds cover every skeleton
    // Verified by framing only the first skeleton
    #[test]
    fn test_shared_bounds_cover_all() {
        let small = Skeleton::preset(Preset::Dragon);
        // Conjugating every map by a translation moves the attractor with it
        let moved: Vec<Transform> = small
            .transforms()
            .iter()
            .map(|t| Transform::new(t.a, t.b, t.c, t.d, t.e + 5.0 - 5.0 * t.a, t.f - 5.0 * t.b))
            .collect();
        let Ok(shifted) = Skeleton::from_parts(Transform::IDENTITY, moved, 1) else {
            panic!("shifted skeleton rejected");
        };
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = shared_bounds(&Mode::Linear, &[small, shifted], &mut rng);
        assert!(bounds.is_built());
        let (x_min, x_max, _, _) = bounds.bounds();
        assert!(x_max - x_min > 5.0, "bounds {x_min}..{x_max}");
    }
}
