// image_processing.rs
use crate::app::error::{ConvertError, Result};
use crate::app::format::TargetFormat;
use crate::utils::{get_memory_usage, measure_time, Logger};
use image::error::{EncodingError, ImageFormatHint};
use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageError, ImageFormat};
use std::io::{self, Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Everything a batch run needs besides the input list.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionSettings {
    pub format: TargetFormat,
    pub output_directory: PathBuf,
    /// `None` uses the format's own default.
    pub quality: Option<u8>,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            format: TargetFormat::default(),
            output_directory: crate::utils::default_output_directory(),
            quality: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConversionRequest<'a> {
    pub input: &'a Path,
    pub format: TargetFormat,
    pub output_directory: &'a Path,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConversionResult {
    Success(PathBuf),
    Failure { input: PathBuf, reason: String },
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success(_))
    }

    /// Line shown in the results box.
    pub fn report_line(&self) -> String {
        match self {
            ConversionResult::Success(output) => format!(
                "✔ Converted: {}",
                output.file_name().unwrap_or(output.as_os_str()).to_string_lossy()
            ),
            ConversionResult::Failure { input, reason } => {
                format!("✘ Failed: {}\nReason: {}", input.display(), reason)
            }
        }
    }
}

pub struct BatchReport {
    pub results: Vec<ConversionResult>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|result| result.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

pub fn completion_message(elapsed: Duration) -> String {
    format!("Conversion completed in {:.2} seconds.", elapsed.as_secs_f64())
}

/// `{output_directory}/{base name}.{format extension}`
pub fn output_path(input: &Path, format: TargetFormat, output_directory: &Path) -> PathBuf {
    let base_name = input.file_stem().unwrap_or_default().to_string_lossy();
    output_directory.join(format!("{}.{}", base_name, format.extension()))
}

/// Converts every input in order, one at a time. A failing input is
/// recorded and the batch moves on; `on_result` sees each result as soon
/// as it is known.
pub fn convert_images<F>(
    input_files: &[PathBuf],
    settings: &ConversionSettings,
    logger: &Logger,
    mut on_result: F,
) -> BatchReport
where
    F: FnMut(usize, &ConversionResult),
{
    logger.log(format!(
        "Converting {} file(s) to {} into {}",
        input_files.len(),
        settings.format,
        settings.output_directory.display()
    ));
    logger.log(get_memory_usage());

    let start_time = Instant::now();
    let mut results = Vec::with_capacity(input_files.len());

    for (index, input_path) in input_files.iter().enumerate() {
        let request = ConversionRequest {
            input: input_path,
            format: settings.format,
            output_directory: &settings.output_directory,
        };

        let result = match convert_image(&request, settings.quality, logger) {
            Ok(output) => {
                logger.log(format!("Saved {}", output.display()));
                ConversionResult::Success(output)
            }
            Err(e) => {
                logger.warn(format!("Conversion failed for {}: {}", input_path.display(), e));
                ConversionResult::Failure {
                    input: input_path.clone(),
                    reason: e.to_string(),
                }
            }
        };

        on_result(index, &result);
        results.push(result);
    }

    let elapsed = start_time.elapsed();
    logger.log(format!("Conversion process completed in {:?}", elapsed));
    logger.log(get_memory_usage());

    BatchReport { results, elapsed }
}

/// Decodes one input and writes it in the requested format. Returns the
/// path of the written file.
pub fn convert_image(request: &ConversionRequest<'_>, quality: Option<u8>, logger: &Logger) -> Result<PathBuf> {
    let (loaded, load_duration) = measure_time(|| load_image(request.input));
    let image = loaded.map_err(|source| ConvertError::Decode {
        path: request.input.to_path_buf(),
        source,
    })?;
    logger.log(format!("Loading {} took {:?}", request.input.display(), load_duration));

    let output = output_path(request.input, request.format, request.output_directory);
    if is_same_file(&output, request.input) {
        return Err(ConvertError::Encode {
            path: output,
            source: ImageError::IoError(io::Error::new(
                ErrorKind::AlreadyExists,
                "output would overwrite the input file",
            )),
        });
    }

    if !request.format.supports_alpha() && image.color().has_alpha() {
        logger.log(format!("Dropping alpha channel of {} for {}", request.input.display(), request.format));
    }
    let image = request.format.fit_color(image);
    let quality = quality.unwrap_or_else(|| request.format.default_quality());

    let (saved, save_duration) = measure_time(|| save_image(&image, request.format, quality, &output));
    saved.map_err(|source| ConvertError::Encode {
        path: output.clone(),
        source,
    })?;
    logger.log(format!("Encoding {} took {:?}", output.display(), save_duration));

    Ok(output)
}

fn is_same_file(output: &Path, input: &Path) -> bool {
    match (std::fs::canonicalize(output), std::fs::canonicalize(input)) {
        (Ok(output), Ok(input)) => output == input,
        _ => output == input,
    }
}

fn load_image(path: &Path) -> std::result::Result<DynamicImage, ImageError> {
    ImageReader::open(path)?.with_guessed_format()?.decode()
}

fn save_image(
    image: &DynamicImage,
    format: TargetFormat,
    quality: u8,
    output_path: &Path,
) -> std::result::Result<(), ImageError> {
    // Encode fully before touching the destination so a rejected image
    // leaves nothing behind.
    let bytes = match format.output_format(quality) {
        Some(output_format) => {
            let mut buffer = Cursor::new(Vec::new());
            image.write_to(&mut buffer, output_format)?;
            buffer.into_inner()
        }
        None => encode_to_webp(image, quality)?,
    };
    std::fs::write(output_path, bytes)?;
    Ok(())
}

fn encode_to_webp(image: &DynamicImage, quality: u8) -> std::result::Result<Vec<u8>, ImageError> {
    let encoder = webp::Encoder::from_image(image).map_err(|e| {
        ImageError::Encoding(EncodingError::new(
            ImageFormatHint::Exact(ImageFormat::WebP),
            e.to_string(),
        ))
    })?;
    let webp = encoder.encode(f32::from(quality.clamp(1, 100)));
    Ok(webp.to_vec())
}
