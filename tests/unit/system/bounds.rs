//! Tests for the orbit bounding box

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use ifsforge::IfsError;
    use ifsforge::system::bounds::MinMax;

    // Tests derived quantities require a built box
    // Verified by computing extents on the fly
    #[test]
    fn test_quantities_fail_before_build() {
        let mut bounds = MinMax::new();
        bounds.include_point(1.0, 2.0);
        assert!(matches!(
            bounds.width(),
            Err(IfsError::FrameNotBuilt { quantity: "width" })
        ));
        assert!(bounds.height().is_err());
        assert!(bounds.center().is_err());
    }

    // Tests extents after building
    // Verified by swapping width and height
    #[test]
    fn test_build_derives_extents() {
        let mut bounds = MinMax::new();
        for (x, y) in [(-1.0, 0.5), (3.0, -0.5), (0.0, 1.5)] {
            bounds.include_point(x, y);
        }
        bounds.build();
        assert!(bounds.is_built());
        assert_eq!(bounds.width().expect("built"), 4.0);
        assert_eq!(bounds.height().expect("built"), 2.0);
        assert_eq!(bounds.center().expect("built"), (1.0, 0.5));

        bounds.include_point(100.0, 100.0);
        assert_eq!(bounds.bounds(), (-1.0, 3.0, -0.5, 1.5), "built boxes are frozen");
    }

    // Tests emptiness, infinity and union
    // Verified by merging empty boxes as infinite corners
    #[test]
    fn test_merge_and_infinity() {
        let mut first = MinMax::new();
        assert!(first.is_empty());
        assert!(!first.has_infinity(), "an empty box is not infinite");

        first.include_point(0.0, 0.0);
        let mut second = MinMax::new();
        second.include_point(2.0, -2.0);
        first.merge(&second);
        first.merge(&MinMax::new());
        assert_eq!(first.bounds(), (0.0, 2.0, -2.0, 0.0));

        first.include_point(f64::INFINITY, 0.0);
        assert!(first.has_infinity());
        first.include_point(f64::NAN, f64::NAN);
        assert_eq!(first.bounds().0, 0.0);
    }
}
