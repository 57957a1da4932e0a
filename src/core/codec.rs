use crate::utils::error::{RasterError, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage, GrayImage, ImageEncoder, ImageFormat, ImageReader};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::ColorType as TiffColorType;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Raster held in memory between decode and encode.
#[derive(Debug, Clone)]
pub struct DecodedImage(DynamicImage);

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn color(&self) -> ColorType {
        self.0.color()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

pub fn decode(bytes: &[u8]) -> Result<DecodedImage> {
    if bytes.is_empty() {
        return Err(RasterError::invalid_argument("raster data cannot be empty"));
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RasterError::UnreadableFormat {
            message: e.to_string(),
        })?;

    let format = reader.format();
    let float_raster = if format == Some(ImageFormat::Tiff) {
        decode_float_tiff(bytes)?
    } else {
        None
    };

    let image = match float_raster {
        Some(image) => image,
        None => reader.decode().map_err(|e| RasterError::UnreadableFormat {
            message: format!(
                "the file may be corrupted or not a supported raster ({:?}): {}",
                format, e
            ),
        })?,
    };

    tracing::debug!(
        "Decoded raster {}x{} ({:?})",
        image.width(),
        image.height(),
        image.color()
    );
    Ok(DecodedImage(image))
}

/// GDAL 的 nodata 標籤（ASCII）
const GDAL_NODATA_TAG: u16 = 42113;
const SAMPLE_FORMAT_FLOAT: u16 = 3;

fn is_single_band_float<R: Read + Seek>(decoder: &mut Decoder<R>) -> bool {
    let gray = matches!(
        decoder.colortype(),
        Ok(TiffColorType::Gray(32)) | Ok(TiffColorType::Gray(64))
    );
    let float = decoder
        .find_tag_unsigned_vec::<u16>(Tag::SampleFormat)
        .ok()
        .flatten()
        .is_some_and(|formats| formats.first() == Some(&SAMPLE_FORMAT_FLOAT));
    gray && float
}

/// 單波段 32/64-bit 浮點 TIFF（人口柵格）線性拉伸為 L8，image 無對應色彩型別。
/// nodata 與 NaN 不參與拉伸，輸出為 0。非浮點 TIFF 回傳 None 交給 image 解碼。
fn decode_float_tiff(bytes: &[u8]) -> Result<Option<DynamicImage>> {
    let Ok(mut decoder) = Decoder::new(Cursor::new(bytes)) else {
        return Ok(None);
    };
    if !is_single_band_float(&mut decoder) {
        return Ok(None);
    }

    let unreadable = |e: tiff::TiffError| RasterError::UnreadableFormat {
        message: format!("floating point TIFF could not be read: {}", e),
    };
    let (width, height) = decoder.dimensions().map_err(unreadable)?;
    let nodata = decoder
        .get_tag_ascii_string(Tag::Unknown(GDAL_NODATA_TAG))
        .ok()
        .and_then(|text| {
            text.trim_matches(|c: char| c == '\0' || c.is_whitespace())
                .parse::<f64>()
                .ok()
        });

    let samples: Vec<f64> = match decoder.read_image().map_err(unreadable)? {
        DecodingResult::F32(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::F64(values) => values,
        _ => {
            return Err(RasterError::UnreadableFormat {
                message: "TIFF declares float samples but decoded as integers".to_string(),
            })
        }
    };

    let is_valid = |v: f64| v.is_finite() && nodata.is_none_or(|nd| v != nd);
    let (min, max) = samples
        .iter()
        .copied()
        .filter(|v| is_valid(*v))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    let pixels: Vec<u8> = samples
        .iter()
        .map(|&v| {
            if !is_valid(v) {
                0
            } else if range > 0.0 {
                ((v - min) / range * 255.0).round() as u8
            } else {
                255
            }
        })
        .collect();

    tracing::debug!(
        "Decoded float raster {}x{} (range {}..{}, nodata {:?})",
        width,
        height,
        min,
        max,
        nodata
    );
    GrayImage::from_raw(width, height, pixels)
        .map(|gray| Some(DynamicImage::ImageLuma8(gray)))
        .ok_or_else(|| RasterError::UnreadableFormat {
            message: format!(
                "float raster does not hold one sample per pixel ({}x{})",
                width, height
            ),
        })
}

/// 16-bit 與浮點樣本降為 8-bit，保留通道配置
fn to_eight_bit(image: &DynamicImage) -> DynamicImage {
    match image.color() {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => image.clone(),
        ColorType::L16 => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorType::La16 => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        color if color.has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

pub fn encode_png(image: &DecodedImage) -> Result<Vec<u8>> {
    let image = to_eight_bit(&image.0);

    let mut buffer: Vec<u8> = Vec::new();
    PngEncoder::new_with_quality(&mut buffer, CompressionType::Default, FilterType::Adaptive)
        .write_image(
            image.as_bytes(),
            image.width(),
            image.height(),
            image.color().into(),
        )
        .map_err(|e| RasterError::EncodeFailure {
            message: e.to_string(),
        })?;

    Ok(buffer)
}

pub fn convert(bytes: &[u8]) -> Result<Vec<u8>> {
    let image = decode(bytes)?;
    let png = encode_png(&image)?;
    tracing::info!(
        "Successfully converted raster to PNG. Output size: {} bytes",
        png.len()
    );
    Ok(png)
}

pub fn convert_reader<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    convert(&bytes)
}

pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(RasterError::invalid_argument(format!(
            "raster file must exist: {}",
            path.display()
        )));
    }

    tracing::info!("Converting raster file to PNG: {}", path.display());
    convert_reader(std::fs::File::open(path)?)
}

pub fn save_as_png<P: AsRef<Path>>(bytes: &[u8], output: P) -> Result<()> {
    let png = convert(bytes)?;
    std::fs::write(output.as_ref(), png)?;
    tracing::info!("PNG file saved successfully: {}", output.as_ref().display());
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_convert_tiff_to_png() {
        let png = convert(&rgb_tiff(5, 3)).unwrap();

        assert_eq!(&png[..8], &PNG_SIGNATURE);
        let decoded = decode(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (5, 3));
        assert_eq!(decoded.color(), ColorType::Rgb8);
    }

    #[test]
    fn test_sixteen_bit_input_becomes_eight_bit_png() {
        let png = convert(&gray16_tiff(4, 4)).unwrap();

        let decoded = decode(&png).unwrap();
        assert_eq!(decoded.color(), ColorType::L8);
    }

    #[test]
    fn test_float32_population_raster_is_stretched_to_gray() {
        let samples = [0.0, 50.0, 100.0, -99999.0, f32::NAN, 25.0];
        let tiff = gray_f32_tiff(3, 2, &samples, Some("-99999"));

        let png = convert(&tiff).unwrap();

        assert_eq!(&png[..8], &PNG_SIGNATURE);
        let decoded = decode(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
        assert_eq!(decoded.color(), ColorType::L8);
        assert_eq!(decoded.as_bytes(), &[0, 128, 255, 0, 0, 64]);
    }

    #[test]
    fn test_float32_raster_without_nodata_tag() {
        let tiff = gray_f32_tiff(2, 1, &[1.5, 3.5], None);

        let decoded = decode(&tiff).unwrap();
        assert_eq!(decoded.color(), ColorType::L8);
        assert_eq!(decoded.as_bytes(), &[0, 255]);

        let flat = decode(&gray_f32_tiff(2, 1, &[7.0, 7.0], None)).unwrap();
        assert_eq!(flat.as_bytes(), &[255, 255]);
    }

    #[test]
    fn test_repeated_decode_is_pixel_identical() {
        let tiff = rgb_tiff(8, 8);
        let first = decode(&tiff).unwrap();
        let second = decode(&tiff).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());

        let png_first = decode(&convert(&tiff).unwrap()).unwrap();
        let png_second = decode(&convert(&tiff).unwrap()).unwrap();
        assert_eq!(png_first.as_bytes(), png_second.as_bytes());
    }

    #[test]
    fn test_empty_buffer_is_invalid_argument() {
        assert!(matches!(
            convert(&[]),
            Err(RasterError::InvalidArgument { .. })
        ));
        assert!(matches!(
            convert_reader(std::io::empty()),
            Err(RasterError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_garbage_is_unreadable_format() {
        assert!(matches!(
            convert(b"definitely not a raster"),
            Err(RasterError::UnreadableFormat { .. })
        ));

        // 有 TIFF 標頭但內容截斷
        let mut truncated = rgb_tiff(16, 16);
        truncated.truncate(12);
        assert!(matches!(
            convert(&truncated),
            Err(RasterError::UnreadableFormat { .. })
        ));
    }

    #[test]
    fn test_file_and_reader_entry_points_match_buffer() {
        let tiff = rgb_tiff(6, 2);
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("map.tif");
        std::fs::write(&input, &tiff).unwrap();

        let from_buffer = decode(&convert(&tiff).unwrap()).unwrap();
        let from_file = decode(&convert_file(&input).unwrap()).unwrap();
        let from_reader = decode(&convert_reader(Cursor::new(tiff.clone())).unwrap()).unwrap();

        assert_eq!(from_buffer.as_bytes(), from_file.as_bytes());
        assert_eq!(from_buffer.as_bytes(), from_reader.as_bytes());
    }

    #[test]
    fn test_missing_file_is_invalid_argument() {
        assert!(matches!(
            convert_file("/nonexistent/raster.tif"),
            Err(RasterError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_save_as_png() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.png");

        save_as_png(&rgb_tiff(3, 3), &output).unwrap();

        let written = std::fs::read(&output).unwrap();
        assert_eq!(&written[..8], &PNG_SIGNATURE);
    }
}
