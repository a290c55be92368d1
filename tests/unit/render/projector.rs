//! Tests for projection and the Julia deferral stack

#[cfg(test)]
mod tests {
    use ifsforge::render::projector::{JuliaMemo, Projector};
    use ifsforge::system::bounds::MinMax;
    use ifsforge::system::transform::Transform;

    fn unit_box() -> MinMax {
        let mut bounds = MinMax::new();
        bounds.include_point(-1.0, -1.0);
        bounds.include_point(1.0, 1.0);
        bounds.build();
        bounds
    }

    fn projector(frame: &Transform) -> Projector {
        match Projector::new(&unit_box(), 100, 100, frame) {
            Ok(projector) => projector,
            Err(error) => panic!("projector rejected: {error}"),
        }
    }

    // Tests the box is centred and fills 96% of the limiting axis
    // Verified by scaling to the full raster
    #[test]
    fn test_projection_centres_box() {
        let projector = projector(&Transform::IDENTITY);
        assert!(!projector.has_view());
        assert!((projector.scale() - 96.0 / 2.000_01).abs() < 1e-9);
        assert_eq!(projector.project(0.0, 0.0), Some((50, 50)));
        assert_eq!(projector.project(1.0, 1.0), Some((97, 2)));
        assert_eq!(projector.project(-1.0, -1.0), Some((2, 97)));
    }

    // Tests the wider side limits the scale
    // Verified by always fitting the height
    #[test]
    fn test_projection_limiting_axis() {
        let mut bounds = MinMax::new();
        bounds.include_point(0.0, 0.0);
        bounds.include_point(4.0, 1.0);
        bounds.build();
        let wide = Projector::new(&bounds, 100, 100, &Transform::IDENTITY);
        assert!(wide.is_ok_and(|p| (p.scale() - 96.0 / 4.000_01).abs() < 1e-9));
    }

    // Tests non-finite points have no pixel
    // Verified by casting NaN to 0
    #[test]
    fn test_non_finite_points_skipped() {
        let projector = projector(&Transform::IDENTITY);
        assert_eq!(projector.project(f64::NAN, 0.0), None);
        assert_eq!(projector.project(0.0, f64::INFINITY), None);
    }

    // Tests a modified frame zooms the view
    // Verified by ignoring the frame
    #[test]
    fn test_frame_zooms_view() {
        let half = Transform::new(0.5, 0.0, 0.0, 0.5, 0.0, 0.0);
        let zoomed = projector(&half);
        assert!(zoomed.has_view());
        assert_eq!(zoomed.project(0.5, 0.5), projector(&Transform::IDENTITY).project(1.0, 1.0));
    }

    // Tests construction failures
    // Verified by defaulting unbuilt boxes to the unit square
    #[test]
    fn test_projector_errors() {
        let mut open = MinMax::new();
        open.include_point(0.0, 0.0);
        assert!(Projector::new(&open, 10, 10, &Transform::IDENTITY).is_err());

        let mut empty = MinMax::new();
        empty.build();
        assert!(Projector::new(&empty, 10, 10, &Transform::IDENTITY).is_err());

        let mut escaped = MinMax::new();
        escaped.include_point(0.0, 0.0);
        escaped.include_point(f64::INFINITY, 1.0);
        escaped.build();
        assert!(Projector::new(&escaped, 10, 10, &Transform::IDENTITY).is_err());

        let singular = Transform::new(1.0, 1.0, 1.0, 1.0, 0.0, 0.0);
        assert!(Projector::new(&unit_box(), 10, 10, &singular).is_err());
    }

    // Tests memory is shared between animation frames
    // Verified by giving every frame the single-image budget
    #[test]
    fn test_memo_capacity() {
        assert_eq!(JuliaMemo::new(1).capacity(), 2_000_000);
        assert_eq!(JuliaMemo::new(0).capacity(), 2_000_000);
        assert_eq!(JuliaMemo::new(50).capacity(), 200_000);
    }

    // Tests deferral, resumption and threshold growth
    // Verified by deferring the landing point instead of its opposite
    #[test]
    fn test_memo_defers_and_resumes() {
        let mut memo = JuliaMemo::new(1);
        assert_eq!(memo.threshold(), 1);

        assert_eq!(memo.handle(0.25, -0.5, 0), (0.25, -0.5));
        assert_eq!(memo.len(), 1);

        assert_eq!(memo.handle(0.1, 0.1, 3), (-0.25, 0.5));
        assert!(memo.is_empty());

        assert_eq!(memo.handle(0.1, 0.1, 3), (0.1, 0.1));
        assert_eq!(memo.threshold(), 2);

        memo.handle(1.0, 1.0, 0);
        memo.reset();
        assert!(memo.is_empty());
        assert_eq!(memo.threshold(), 1);
    }

    // Tests the threshold stops at its ceiling
    // Verified by letting the threshold grow without bound
    #[test]
    fn test_memo_threshold_ceiling() {
        let mut memo = JuliaMemo::new(1);
        for _ in 0..1000 {
            memo.handle(0.0, 0.0, u32::MAX);
        }
        assert_eq!(memo.threshold(), 254);
    }
}
