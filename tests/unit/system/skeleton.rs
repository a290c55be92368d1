//! Tests for skeletons: construction, selection, the chaos game step and randomization

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use ifsforge::IfsError;
    use ifsforge::io::configuration::{DEMO_DIMENSION_RANGE, MAX_TRANSFORMS};
    use ifsforge::math::formula::FormulaPoint;
    use ifsforge::system::editing::Gesture;
    use ifsforge::system::mode::Mode;
    use ifsforge::system::skeleton::{OrbitPoint, Preset, Skeleton};
    use ifsforge::system::transform::Transform;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sierpinski() -> Skeleton {
        Skeleton::from_parts(
            Transform::IDENTITY,
            vec![
                Transform::new(0.5, 0.0, 0.0, 0.5, 0.0, 0.0),
                Transform::new(0.5, 0.0, 0.0, 0.5, 0.5, 0.0),
                Transform::new(0.5, 0.0, 0.0, 0.5, 0.25, 0.5),
            ],
            1,
        )
        .expect("three transforms are valid")
    }

    proptest! {
        // Tests probabilities form a distribution for any transforms
        // Verified by dividing by the transform count instead of the area sum
        #[test]
        fn test_probabilities_sum_to_one(
            coefficients in prop::collection::vec(prop::array::uniform6(-2.0_f64..2.0), 1..12)
        ) {
            let transforms = coefficients.into_iter().map(Transform::from_coefficients).collect();
            let skeleton = Skeleton::from_parts(Transform::IDENTITY, transforms, 1)
                .expect("count is within range");
            let sum: f64 = skeleton.probabilities().iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-6, "sum = {}", sum);
            prop_assert!(skeleton.probabilities().iter().all(|&p| p >= 0.0));
        }
    }

    // Tests degenerate transforms fall back to uniform weights
    // Verified by dividing by a zero area sum
    #[test]
    fn test_degenerate_probabilities_uniform() {
        let flat = Transform::new(1.0, 0.0, 1.0, 0.0, 0.0, 0.0);
        let skeleton = Skeleton::from_parts(Transform::IDENTITY, vec![flat; 4], 1)
            .expect("four transforms are valid");
        assert!(skeleton.probabilities().iter().all(|&p| (p - 0.25).abs() < 1e-12));
    }

    // Tests the Sierpinski similarity dimension
    // Verified by using areas instead of their square roots as ratios
    #[test]
    fn test_sierpinski_dimension() {
        let dimension = sierpinski().dimension();
        let expected = 3.0_f64.ln() / 2.0_f64.ln();
        assert!((dimension - expected).abs() < 1e-3, "dimension = {dimension}");
    }

    // Tests frame estimation covers the attractor support
    // Verified by skipping the build step
    #[test]
    fn test_find_frame_bounds_attractor() {
        let mut rng = StdRng::seed_from_u64(5);
        let bounds = sierpinski().find_frame(&Mode::Linear, 10_000, &mut rng);
        let width = bounds.width().expect("frame is built");
        let height = bounds.height().expect("frame is built");
        assert!(width > 0.9 && width <= 1.0 + 1e-9, "width = {width}");
        assert!(height > 0.9 && height <= 1.0 + 1e-9, "height = {height}");
        let (x_min, _, y_min, _) = bounds.bounds();
        assert!(x_min >= -1e-9 && y_min >= -1e-9);
    }

    // Tests an escaping formula orbit is reseeded and leaves a finite frame
    // Verified by never discarding bounds that reached infinity
    #[test]
    fn test_find_frame_discards_escaped_orbit() {
        // Doubles x while y is 0, halves it otherwise
        let formula = FormulaPoint::new(
            "+ * x - 2 * 1.5 < 0 abs y - 1 < 0 abs y",
            "y",
        )
        .expect("formula parses");
        let mode = Mode::Formula(formula);
        let skeleton = Skeleton::from_parts(Transform::IDENTITY, vec![Transform::IDENTITY], 1)
            .expect("one transform is valid");
        let mut rng = StdRng::seed_from_u64(13);

        let bounds = skeleton.find_frame(&mode, 5000, &mut rng);
        assert!(!bounds.has_infinity());
        let (x_min, x_max, y_min, y_max) = bounds.bounds();
        for bound in [x_min, x_max, y_min, y_max] {
            assert!(bound.is_finite() && bound.abs() <= 1.0, "bounds = {:?}", bounds.bounds());
        }
        assert!(bounds.width().expect("frame is built").is_finite());
        assert!(bounds.height().expect("frame is built").is_finite());
    }

    // Tests presets and regular skeletons
    // Verified by placing regular squares on the circle only
    #[test]
    fn test_presets_and_regular() {
        let dragon = Skeleton::preset(Preset::Dragon);
        assert_eq!(dragon.len(), 2);
        assert_eq!(dragon.selected(), 1);
        assert_eq!(dragon.probabilities(), [0.5, 0.5]);
        assert_eq!(Skeleton::default(), dragon);

        let grid = Skeleton::regular(4).expect("four is valid");
        let centers: Vec<(f64, f64)> = grid.transforms().iter().map(|t| (t.e, t.f)).collect();
        assert_eq!(centers, vec![(-0.25, -0.25), (0.25, -0.25), (-0.25, 0.25), (0.25, 0.25)]);
        assert!((grid.sum_surfaces() - 1.0).abs() < 1e-12);

        let circle = Skeleton::regular(3).expect("three is valid");
        for transform in circle.transforms() {
            assert!((transform.e.hypot(transform.f) - 0.5).abs() < 1e-12);
        }

        assert!(Skeleton::regular(0).is_err());
        assert!(Skeleton::regular(MAX_TRANSFORMS + 1).is_err());
    }

    // Tests selection cycles through the frame and transforms
    // Verified by using a plain remainder on negative shifts
    #[test]
    fn test_selection() {
        let mut skeleton = sierpinski();
        skeleton.shift_selected(-2);
        assert_eq!(skeleton.selected(), 3);
        skeleton.shift_selected(1);
        assert_eq!(skeleton.selected(), 0);
        assert_eq!(skeleton.selected_transform(), &Transform::IDENTITY);
        assert!(skeleton.select(4).is_err());
        skeleton.select(2).expect("index 2 exists");
        assert_eq!(skeleton.selected_transform().e, 0.5);

        let mut uneven = Skeleton::from_parts(
            Transform::IDENTITY,
            vec![
                Transform::new(0.2, 0.0, 0.0, 0.2, 0.0, 0.0),
                Transform::new(0.6, 0.0, 0.0, 0.6, 0.0, 0.0),
            ],
            0,
        )
        .expect("valid parts");
        uneven.select_biggest();
        assert_eq!(uneven.selected(), 2);
    }

    // Tests adding and removing transforms
    // Verified by allowing the last transform to be removed
    #[test]
    fn test_add_and_remove() {
        let mut skeleton = Skeleton::regular(1).expect("one is valid");
        assert!(skeleton.remove_selected().is_err(), "last transform must remain");

        skeleton
            .add(Transform::new(0.5, 0.0, 0.0, 0.5, 0.1, 0.1))
            .expect("room for more");
        assert_eq!(skeleton.len(), 2);
        assert_eq!(skeleton.selected(), 2);

        skeleton.remove_selected().expect("two transforms remain");
        assert_eq!(skeleton.len(), 1);
        assert_eq!(skeleton.selected(), 1);

        let mut full = Skeleton::regular(MAX_TRANSFORMS).expect("maximum is valid");
        assert!(full.add(Transform::IDENTITY).is_err());
        full.select(0).expect("frame is selectable");
        assert!(full.remove_selected().is_err(), "the frame cannot be removed");
    }

    // Tests removal from the middle swaps the last transform in
    // Verified by shifting every later transform down
    #[test]
    fn test_remove_middle_swaps_last() {
        let mut skeleton = sierpinski();
        skeleton.select(1).expect("index 1 exists");
        skeleton.remove_selected().expect("three transforms");
        assert_eq!(skeleton.len(), 2);
        assert_eq!(skeleton.transforms()[0].f, 0.5);
        assert_eq!(skeleton.selected(), 1);
    }

    // Tests formula mode picks uniformly and labels by index
    // Verified by reusing the area-weighted label
    #[test]
    fn test_formula_mode_color_label() {
        let mode = Mode::Formula(FormulaPoint::new("x", "y").expect("formulas parse"));
        let skeleton = sierpinski();
        let mut rng = StdRng::seed_from_u64(9);
        let mut point = OrbitPoint::new(0.1, 0.2);
        for _ in 0..100 {
            point = skeleton.next_point(&mode, point, &mut rng);
            assert_eq!((point.x, point.y), (0.1, 0.2));
            assert!((0.0..=1.0).contains(&point.color));
        }
    }

    // Tests linear orbits stay inside the attractor hull
    // Verified by selecting past the last transform
    #[test]
    fn test_settle_stays_on_attractor() {
        let skeleton = sierpinski();
        let mut rng = StdRng::seed_from_u64(2);
        let point = skeleton.settle(&Mode::Linear, OrbitPoint::default(), 1000, &mut rng);
        assert!((0.0..=1.0).contains(&point.x) && (0.0..=1.0).contains(&point.y));
        assert!((0.0..=1.0).contains(&point.color));
    }

    // Tests randomization keeps the transform count and produces contracting maps
    // Verified by removing the divergence retry
    #[test]
    fn test_randomize_linear() {
        let mut skeleton = Skeleton::regular(3).expect("three is valid");
        let mut rng = StdRng::seed_from_u64(21);
        skeleton.randomize(&Mode::Linear, &mut rng).expect("linear randomization succeeds");
        assert_eq!(skeleton.len(), 3);
        assert!(skeleton.transforms().iter().all(Transform::is_contracting));
        assert_eq!(skeleton.frame(), &Transform::IDENTITY);

        let before = skeleton.clone();
        skeleton.modify_for_demo(&Mode::Linear, &mut rng);
        let changed = before
            .transforms()
            .iter()
            .zip(skeleton.transforms())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 1);
    }

    // Tests diverging random draws are redrawn until the orbit stays bounded
    // Verified by accepting the first draw
    #[test]
    fn test_randomize_retries_diverging_draws() {
        // Bounded exactly when |a| < 1; a is drawn from [-1.8, 1.8]
        let formula = FormulaPoint::new("* a + x 1", "y").expect("formula parses");
        let mode = Mode::Formula(formula);
        for seed in 0..8 {
            let mut skeleton =
                Skeleton::from_parts(Transform::IDENTITY, vec![Transform::IDENTITY], 1)
                    .expect("one transform is valid");
            let mut rng = StdRng::seed_from_u64(seed);
            skeleton.randomize(&mode, &mut rng).expect("a bounded draw exists");
            let a = skeleton.transforms()[0].a;
            assert!(a.abs() < 1.0 + 1e-6, "seed {seed} accepted a = {a}");
        }
    }

    // Tests randomization gives up with an error when every draw diverges
    // Verified by looping until a bounded draw appears
    #[test]
    fn test_randomize_gives_up_on_divergence() {
        let formula = FormulaPoint::new("+ 1 * 2 x", "y").expect("formula parses");
        let mode = Mode::Formula(formula);
        let mut skeleton = Skeleton::regular(2).expect("two is valid");
        let mut rng = StdRng::seed_from_u64(3);
        let result = skeleton.randomize(&mode, &mut rng);
        assert!(matches!(result, Err(IfsError::Computation { operation: "randomize", .. })));
    }

    // Tests demo skeletons are small and of plausible dimension
    // Verified by skipping the dimension check
    #[test]
    fn test_random_for_demo() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..5 {
            let mut skeleton = Skeleton::default();
            skeleton.random_for_demo(&Mode::Linear, &mut rng).expect("demo succeeds");
            assert!((2..=3).contains(&skeleton.len()));
            let dimension = skeleton.dimension();
            assert!(dimension >= DEMO_DIMENSION_RANGE.0 && dimension <= DEMO_DIMENSION_RANGE.1);

            let mut julia = Skeleton::default();
            julia.random_for_demo(&Mode::Julia, &mut rng).expect("demo succeeds");
            assert!((1..=2).contains(&julia.len()));
        }
    }

    // Tests reshaping resets the frame or squares the selection
    // Verified by ignoring the mode's square edge
    #[test]
    fn test_reshape_selected() {
        let mut skeleton = Skeleton::default();
        skeleton.reshape_selected(&Mode::Linear);
        let reshaped = skeleton.selected_transform();
        assert_eq!((reshaped.a, reshaped.b, reshaped.c, reshaped.d), (0.5, 0.0, 0.0, 0.5));

        skeleton.set_frame(Transform::new(2.0, 0.0, 0.0, 2.0, 1.0, 1.0));
        skeleton.select(0).expect("frame is selectable");
        skeleton.reshape_selected(&Mode::Linear);
        assert_eq!(skeleton.frame(), &Transform::IDENTITY);
    }

    // Tests gestures update probabilities unless the centre moves
    // Verified by recomputing probabilities only on moves
    #[test]
    fn test_gesture_updates_probabilities() {
        let mut skeleton = sierpinski();
        skeleton.apply_gesture(Gesture::MoveCenter, 0.3, 0.3, &Mode::Linear);
        assert!((skeleton.probabilities()[0] - 1.0 / 3.0).abs() < 1e-12);

        let moved = *skeleton.selected_transform();
        let (base_x, base_y) = moved.base_corner();
        let target_x = moved.e + (base_x - moved.e) * 0.5;
        let target_y = moved.f + (base_y - moved.f) * 0.5;
        skeleton.apply_gesture(Gesture::Dilation, target_x, target_y, &Mode::Linear);
        assert!(skeleton.probabilities()[0] < 1.0 / 3.0);
        let sum: f64 = skeleton.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    // Tests rotating the selection and the frame
    // Verified by rotating every transform
    #[test]
    fn test_rotate_selected() {
        let mut skeleton = sierpinski();
        skeleton.rotate_selected(std::f64::consts::PI);
        assert!((skeleton.transforms()[0].a + 0.5).abs() < 1e-12);
        assert_eq!(skeleton.transforms()[1].a, 0.5);
    }

    // Tests subframe takes over the selection and validates sizes
    // Verified by mapping the selected slot instead of resetting it
    #[test]
    fn test_subframe() {
        let mut skeleton = sierpinski();
        let mut other = sierpinski();
        other.select(2).expect("index 2 exists");
        skeleton.subframe(&other).expect("sizes match");
        assert_eq!(skeleton.selected(), 2);
        assert_eq!(skeleton.transforms()[1], Transform::IDENTITY);
        assert!((skeleton.transforms()[0].a - 1.0).abs() < 1e-12);
        assert!((skeleton.transforms()[0].e + 1.0).abs() < 1e-12);

        other.select(0).expect("frame is selectable");
        assert!(skeleton.subframe(&other).is_err());
        assert!(skeleton.subframe(&Skeleton::default()).is_err());
    }

    // Tests a singular pivot leaves the skeleton untouched
    // Verified by replacing transforms one at a time before the failure
    #[test]
    fn test_subframe_singular_pivot_keeps_skeleton() {
        let mut target = Skeleton::from_parts(
            Transform::IDENTITY,
            vec![
                Transform::new(0.5, 0.0, 0.0, 0.5, 0.1, 0.2),
                Transform::new(0.4, 0.1, 0.0, 0.3, 0.3, 0.0),
            ],
            2,
        )
        .expect("two transforms are valid");
        let pivot_owner = Skeleton::from_parts(
            Transform::IDENTITY,
            vec![
                Transform::new(1.0, 0.0, 1.0, 0.0, 0.0, 0.0),
                Transform::new(0.5, 0.0, 0.0, 0.5, 0.0, 0.0),
            ],
            1,
        )
        .expect("two transforms are valid");
        let before = target.clone();

        let result = target.subframe(&pivot_owner);
        assert!(matches!(result, Err(IfsError::SingularTransform { .. })));
        assert_eq!(target.transforms(), before.transforms());
        assert_eq!(target.selected(), 2);
        assert_eq!(target.probabilities(), before.probabilities());
    }

    // Tests skeleton blending requires equal sizes and blends frames
    // Verified by keeping the first frame
    #[test]
    fn test_weighted_mix() {
        let mut first = Skeleton::default();
        first.set_frame(Transform::new(3.0, 0.0, 0.0, 3.0, 0.0, 0.0));
        let second = Skeleton::preset(Preset::Triangle);
        let mixed = Skeleton::weighted_mix(&first, &second, 0.5).expect("sizes match");
        assert!((mixed.frame().a - 2.0).abs() < 1e-12);
        assert!(Skeleton::weighted_mix(&first, &sierpinski(), 0.5).is_err());
    }
}
