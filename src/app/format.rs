// format.rs
use image::codecs::pnm::{PnmSubtype, SampleEncoding};
use image::{ColorType, DynamicImage, ImageOutputFormat};
use std::fmt;

/// Output formats offered in the format selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    #[default]
    Jpeg,
    Jpg,
    Png,
    WebP,
    Gif,
    Bmp,
    Ico,
    Tiff,
    Ppm,
    Tga,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 10] = [
        TargetFormat::Jpeg,
        TargetFormat::Jpg,
        TargetFormat::Png,
        TargetFormat::WebP,
        TargetFormat::Gif,
        TargetFormat::Bmp,
        TargetFormat::Ico,
        TargetFormat::Tiff,
        TargetFormat::Ppm,
        TargetFormat::Tga,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::Jpg => "JPG",
            TargetFormat::Png => "PNG",
            TargetFormat::WebP => "WEBP",
            TargetFormat::Gif => "GIF",
            TargetFormat::Bmp => "BMP",
            TargetFormat::Ico => "ICO",
            TargetFormat::Tiff => "TIFF",
            TargetFormat::Ppm => "PPM",
            TargetFormat::Tga => "TGA",
        }
    }

    /// File extension of converted files: the format name, lower-cased.
    pub fn extension(self) -> String {
        self.name().to_lowercase()
    }

    pub fn supports_alpha(self) -> bool {
        !matches!(self, TargetFormat::Jpeg | TargetFormat::Jpg | TargetFormat::Ppm)
    }

    pub fn is_lossy(self) -> bool {
        matches!(self, TargetFormat::Jpeg | TargetFormat::Jpg | TargetFormat::WebP)
    }

    /// Quality used for lossy output when none is chosen.
    pub fn default_quality(self) -> u8 {
        match self {
            TargetFormat::WebP => 80,
            _ => 75,
        }
    }

    /// Encoder settings for the `image` crate. `None` for WebP, which goes
    /// through libwebp instead.
    pub fn output_format(self, quality: u8) -> Option<ImageOutputFormat> {
        let format = match self {
            TargetFormat::Jpeg | TargetFormat::Jpg => ImageOutputFormat::Jpeg(quality.clamp(1, 100)),
            TargetFormat::Png => ImageOutputFormat::Png,
            TargetFormat::WebP => return None,
            TargetFormat::Gif => ImageOutputFormat::Gif,
            TargetFormat::Bmp => ImageOutputFormat::Bmp,
            TargetFormat::Ico => ImageOutputFormat::Ico,
            TargetFormat::Tiff => ImageOutputFormat::Tiff,
            TargetFormat::Ppm => ImageOutputFormat::Pnm(PnmSubtype::Pixmap(SampleEncoding::Binary)),
            TargetFormat::Tga => ImageOutputFormat::Tga,
        };
        Some(format)
    }

    /// Converts `image` into a pixel layout the encoder for this format
    /// accepts. Alpha is dropped for formats without an alpha channel.
    pub fn fit_color(self, image: DynamicImage) -> DynamicImage {
        let color = image.color();
        if !self.supports_alpha() && color.has_alpha() {
            return DynamicImage::ImageRgb8(image.to_rgb8());
        }

        let accepted = match self {
            TargetFormat::Jpeg | TargetFormat::Jpg => matches!(color, ColorType::L8 | ColorType::Rgb8),
            TargetFormat::Ppm => color == ColorType::Rgb8,
            TargetFormat::WebP => matches!(color, ColorType::Rgb8 | ColorType::Rgba8),
            TargetFormat::Png | TargetFormat::Ico => !matches!(color, ColorType::Rgb32F | ColorType::Rgba32F),
            TargetFormat::Tiff => matches!(
                color,
                ColorType::L8
                    | ColorType::Rgb8
                    | ColorType::Rgba8
                    | ColorType::L16
                    | ColorType::Rgb16
                    | ColorType::Rgba16
            ),
            TargetFormat::Gif => matches!(color, ColorType::Rgb8 | ColorType::Rgba8),
            TargetFormat::Bmp | TargetFormat::Tga => matches!(
                color,
                ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8
            ),
        };

        if accepted {
            image
        } else if color.has_alpha() {
            DynamicImage::ImageRgba8(image.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(image.to_rgb8())
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extensions offered by the input picker's image filter.
pub const INPUT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "ico", "tif", "tiff", "ppm", "pgm", "pbm", "pam",
    "tga", "dds", "hdr", "exr", "ff", "qoi",
];

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    #[test]
    fn extensions_are_lowercased_names() {
        assert_eq!(TargetFormat::Jpeg.extension(), "jpeg");
        assert_eq!(TargetFormat::Jpg.extension(), "jpg");
        assert_eq!(TargetFormat::Tiff.extension(), "tiff");
        assert_eq!(TargetFormat::WebP.extension(), "webp");
    }

    #[test]
    fn only_jpeg_family_and_ppm_lack_alpha() {
        let without: Vec<_> = TargetFormat::ALL
            .into_iter()
            .filter(|format| !format.supports_alpha())
            .collect();
        assert_eq!(without, vec![TargetFormat::Jpeg, TargetFormat::Jpg, TargetFormat::Ppm]);
    }

    #[test]
    fn webp_defaults_to_a_higher_quality_than_jpeg() {
        assert_eq!(TargetFormat::WebP.default_quality(), 80);
        assert_eq!(TargetFormat::Jpeg.default_quality(), 75);
        assert_eq!(TargetFormat::Jpg.default_quality(), 75);
    }

    #[test]
    fn webp_has_no_image_crate_encoder() {
        assert!(TargetFormat::WebP.output_format(80).is_none());
        assert!(matches!(
            TargetFormat::Jpg.output_format(0),
            Some(ImageOutputFormat::Jpeg(1))
        ));
    }

    #[test]
    fn fit_color_flattens_alpha_for_jpeg() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 0])));
        let fitted = TargetFormat::Jpeg.fit_color(image);
        assert_eq!(fitted.color(), ColorType::Rgb8);
        assert_eq!(fitted.dimensions(), (4, 3));
    }

    #[test]
    fn fit_color_keeps_alpha_for_png() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4])));
        assert_eq!(TargetFormat::Png.fit_color(image).color(), ColorType::Rgba8);
    }

    #[test]
    fn fit_color_reduces_depth_for_eight_bit_encoders() {
        let image = DynamicImage::ImageRgba16(image::ImageBuffer::new(2, 2));
        assert_eq!(TargetFormat::Bmp.fit_color(image.clone()).color(), ColorType::Rgba8);
        assert_eq!(TargetFormat::Tiff.fit_color(image).color(), ColorType::Rgba16);
    }

    #[test]
    fn fit_color_expands_grayscale_for_ppm() {
        let image = DynamicImage::ImageLuma8(image::GrayImage::new(3, 3));
        assert_eq!(TargetFormat::Ppm.fit_color(image.clone()).color(), ColorType::Rgb8);
        assert_eq!(TargetFormat::Jpeg.fit_color(image).color(), ColorType::L8);
    }
}
