//! Tests for the density raster and its finalisation

#[cfg(test)]
mod tests {
    use ifsforge::render::density::DensityKind;
    use ifsforge::render::image::{Background, DensityImage, ImageSettings, RasterSink};
    use ifsforge::render::palette::{BuiltinRamp, ColorRamp};

    fn settings(background: Background, ramp: Option<ColorRamp>) -> ImageSettings {
        ImageSettings {
            width: 4,
            height: 3,
            density: DensityKind::Exact,
            background,
            ramp,
            seed: 7,
        }
    }

    fn image(background: Background, ramp: Option<ColorRamp>) -> DensityImage {
        match DensityImage::new(&settings(background, ramp)) {
            Ok(image) => image,
            Err(error) => panic!("valid settings rejected: {error}"),
        }
    }

    // Tests raster size validation
    // Verified by accepting zero-sized rasters
    #[test]
    fn test_settings_validation() {
        let mut bad = settings(Background::Black, None);
        bad.width = 0;
        assert!(DensityImage::new(&bad).is_err());
        bad.width = 10_001;
        assert!(DensityImage::new(&bad).is_err());
        bad.width = 4;
        bad.height = 0;
        assert!(bad.validate().is_err());
        assert!(settings(Background::White, None).validate().is_ok());
    }

    // Tests coordinates outside the raster are dropped
    // Verified by wrapping negative indices
    #[test]
    fn test_out_of_range_plots_ignored() {
        let mut raster = image(Background::Black, None);
        raster.plot(-1, 0);
        raster.plot(0, -1);
        raster.plot(4, 0);
        raster.plot(0, 3);
        raster.set_color(-1, 0, 0.5);
        assert_eq!(raster.hit_count(-1, 0), 0);
        assert_eq!(raster.hit_count(4, 0), 0);
        assert_eq!(raster.density().levels().iter().copied().max(), Some(0));
        assert_eq!((raster.width(), raster.height()), (4, 3));
    }

    // Tests grayscale finalisation on both backgrounds
    // Verified by skipping inversion for white backgrounds
    #[test]
    fn test_render_grayscale() {
        let mut black = image(Background::Black, None);
        let mut white = image(Background::White, None);
        for raster in [&mut black, &mut white] {
            raster.plot(1, 2);
            raster.plot(1, 2);
            raster.plot(3, 0);
        }

        let dark = black.render();
        assert_eq!(dark.dimensions(), (4, 3));
        assert_eq!(dark.get_pixel(1, 2).0, [255, 255, 255]);
        assert_eq!(dark.get_pixel(0, 0).0, [0, 0, 0]);
        let middle = dark.get_pixel(3, 0).0[0];
        assert!(middle > 0 && middle < 255);

        let light = white.render();
        assert_eq!(light.get_pixel(1, 2).0, [0, 0, 0]);
        assert_eq!(light.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(light.get_pixel(3, 0).0[0], 255 - middle);
    }

    // Tests colour averaging weights by hit count
    // Verified by overwriting the average with the newest sample
    #[test]
    fn test_render_colored() {
        let mut raster = image(Background::Black, Some(ColorRamp::builtin(BuiltinRamp::Fast)));
        assert!(raster.is_colored());
        raster.plot(0, 0);
        raster.set_color(0, 0, 0.0);
        assert_eq!(raster.render().get_pixel(0, 0).0, [255, 255, 0]);

        raster.plot(0, 0);
        raster.set_color(0, 0, 1.0);
        // average of (1, 1, 0) and (0, 0.5, 1)
        assert_eq!(raster.render().get_pixel(0, 0).0, [127, 191, 127]);
    }

    // Tests clearing removes hits and colours
    // Verified by clearing only the density buffer
    #[test]
    fn test_clear() {
        let mut raster = image(Background::Black, Some(ColorRamp::default()));
        raster.plot(2, 1);
        raster.set_color(2, 1, 0.3);
        raster.clear();
        assert_eq!(raster.hit_count(2, 1), 0);
        assert_eq!(raster.render().get_pixel(2, 1).0, [0, 0, 0]);
        assert_eq!(raster.background(), Background::Black);
    }
}
