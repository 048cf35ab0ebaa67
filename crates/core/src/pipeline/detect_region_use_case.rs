use std::path::Path;
use std::time::Instant;

use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::pipeline::pipeline_logger::{elapsed_ms, NullPipelineLogger, PipelineLogger};
use crate::region::domain::region_detector::RegionDetector;
use crate::region::domain::region_label::RegionVerdict;
use crate::shared::analysis_result::AnalysisResult;
use crate::shared::constants::REGION_OUTPUT_SUFFIX;
use crate::shared::frame::Frame;
use crate::shared::output_path::derive_output_path;

/// Single-image bright-region pipeline: read → detect/overlay → write.
pub struct DetectRegionUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    detector: Box<dyn RegionDetector>,
    logger: Box<dyn PipelineLogger>,
}

impl DetectRegionUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        detector: Box<dyn RegionDetector>,
    ) -> Self {
        Self {
            reader,
            writer,
            detector,
            logger: Box::new(NullPipelineLogger),
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn execute(&mut self, input_path: &Path) -> AnalysisResult<RegionVerdict> {
        let start = Instant::now();
        let mut frame = match self.reader.read(input_path) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("{e}");
                return AnalysisResult::new(None, RegionVerdict::LoadFailed);
            }
        };
        self.logger.timing("load", elapsed_ms(start));

        let output_path = derive_output_path(input_path, REGION_OUTPUT_SUFFIX);
        let result = match self.analyze(&mut frame, &output_path) {
            Ok(verdict) => AnalysisResult::new(Some(output_path), verdict),
            Err(e) => {
                log::warn!("Region analysis of {} failed: {e}", input_path.display());
                AnalysisResult::new(
                    Some(input_path.to_path_buf()),
                    RegionVerdict::ProcessingFailed,
                )
            }
        };

        self.logger.summary();
        result
    }

    fn analyze(
        &mut self,
        frame: &mut Frame,
        output_path: &Path,
    ) -> Result<RegionVerdict, Box<dyn std::error::Error>> {
        let t = Instant::now();
        let detection = self.detector.detect(frame)?;
        self.logger.timing("detect", elapsed_ms(t));

        self.logger.metric("threshold", detection.threshold);
        if let Some(region) = &detection.largest {
            self.logger.metric("region_area", region.area());
        }

        let t = Instant::now();
        self.writer.write(output_path, frame)?;
        self.logger.timing("save", elapsed_ms(t));

        let verdict = detection.label();
        self.logger.info(&format!("{verdict} → {}", output_path.display()));
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::domain::image_io_error::ImageIoError;
    use crate::imaging::infrastructure::image_file_reader::ImageFileReader;
    use crate::imaging::infrastructure::image_file_writer::ImageFileWriter;
    use crate::pipeline::pipeline_logger::StdoutPipelineLogger;
    use crate::region::domain::region_candidate::RegionCandidate;
    use crate::region::domain::region_detector::RegionDetection;
    use crate::region::infrastructure::threshold_region_detector::ThresholdRegionDetector;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubImageReader {
        frame: Option<Frame>,
    }

    impl ImageReader for StubImageReader {
        fn read(&self, path: &Path) -> Result<Frame, ImageIoError> {
            self.frame.clone().ok_or_else(|| ImageIoError::Decode {
                path: path.to_path_buf(),
                source: image::ImageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "missing",
                )),
            })
        }
    }

    struct StubImageWriter {
        written: Arc<Mutex<Vec<(PathBuf, Frame)>>>,
    }

    impl StubImageWriter {
        fn new() -> Self {
            Self {
                written: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl ImageWriter for StubImageWriter {
        fn write(&self, path: &Path, frame: &Frame) -> Result<(), ImageIoError> {
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), frame.clone()));
            Ok(())
        }
    }

    struct StubDetector {
        area: Option<f64>,
        fail: bool,
    }

    impl RegionDetector for StubDetector {
        fn detect(
            &self,
            _frame: &mut Frame,
        ) -> Result<RegionDetection, Box<dyn std::error::Error>> {
            if self.fail {
                return Err("contour extraction failed".into());
            }
            let largest = self.area.map(|a| {
                let side = a.sqrt() as i32;
                RegionCandidate::new(vec![(0, 0), (side, 0), (side, side), (0, side)])
            });
            Ok(RegionDetection {
                detected: self.area.is_some_and(|a| a > 100.0),
                largest,
                threshold: 200.0,
                max_value: 250.0,
            })
        }
    }

    /// Forwards to a shared [`StdoutPipelineLogger`] so tests can inspect it.
    struct SharedLogger(Arc<Mutex<StdoutPipelineLogger>>);

    impl PipelineLogger for SharedLogger {
        fn timing(&mut self, stage: &str, duration_ms: f64) {
            self.0.lock().unwrap().timing(stage, duration_ms);
        }
        fn metric(&mut self, name: &str, value: f64) {
            self.0.lock().unwrap().metric(name, value);
        }
        fn info(&mut self, message: &str) {
            self.0.lock().unwrap().info(message);
        }
    }

    // --- Helpers ---

    fn make_frame(w: u32, h: u32) -> Frame {
        Frame::new(vec![128; (w * h * 3) as usize], w, h, 3)
    }

    fn write_png(path: &Path, img: &image::RgbImage) {
        img.save(path).unwrap();
    }

    fn bright_disk(w: u32, h: u32, r: i64) -> image::RgbImage {
        let (cx, cy) = (w as i64 / 2, h as i64 / 2);
        image::RgbImage::from_fn(w, h, |x, y| {
            let d2 = (x as i64 - cx).pow(2) + (y as i64 - cy).pow(2);
            if d2 <= r * r {
                image::Rgb([250, 250, 250])
            } else {
                image::Rgb([20, 20, 20])
            }
        })
    }

    // --- Tests ---

    #[test]
    fn test_detection_is_saved_with_suffix() {
        let writer = StubImageWriter::new();
        let written = writer.written.clone();

        let mut uc = DetectRegionUseCase::new(
            Box::new(StubImageReader {
                frame: Some(make_frame(30, 30)),
            }),
            Box::new(writer),
            Box::new(StubDetector {
                area: Some(400.0),
                fail: false,
            }),
        );
        let result = uc.execute(Path::new("scans/brain.png"));

        assert_eq!(result.label, RegionVerdict::AnomalyDetected);
        let expected = PathBuf::from("scans/brain_tumor_processed.png");
        assert_eq!(result.processed_image_path, Some(expected.clone()));
        assert_eq!(written.lock().unwrap()[0].0, expected);
    }

    #[test]
    fn test_small_region_is_no_anomaly() {
        let mut uc = DetectRegionUseCase::new(
            Box::new(StubImageReader {
                frame: Some(make_frame(30, 30)),
            }),
            Box::new(StubImageWriter::new()),
            Box::new(StubDetector {
                area: Some(64.0),
                fail: false,
            }),
        );
        assert_eq!(uc.execute(Path::new("a.png")).label, RegionVerdict::NoAnomaly);
    }

    #[test]
    fn test_detector_error_returns_original_path() {
        let writer = StubImageWriter::new();
        let written = writer.written.clone();

        let mut uc = DetectRegionUseCase::new(
            Box::new(StubImageReader {
                frame: Some(make_frame(30, 30)),
            }),
            Box::new(writer),
            Box::new(StubDetector {
                area: None,
                fail: true,
            }),
        );
        let result = uc.execute(Path::new("scan.png"));

        assert_eq!(result.label, RegionVerdict::ProcessingFailed);
        assert_eq!(result.label.to_string(), "Processing error");
        assert_eq!(result.processed_image_path, Some(PathBuf::from("scan.png")));
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_load_failure_has_no_path() {
        let mut uc = DetectRegionUseCase::new(
            Box::new(StubImageReader { frame: None }),
            Box::new(StubImageWriter::new()),
            Box::new(StubDetector {
                area: None,
                fail: false,
            }),
        );
        let result = uc.execute(Path::new("gone.png"));

        assert_eq!(result.label, RegionVerdict::LoadFailed);
        assert_eq!(result.processed_image_path, None);
        assert_eq!(result.to_string(), "-\tError loading image");
    }

    #[test]
    fn test_logger_receives_stages_and_metrics() {
        let shared = Arc::new(Mutex::new(StdoutPipelineLogger::new()));

        let mut uc = DetectRegionUseCase::new(
            Box::new(StubImageReader {
                frame: Some(make_frame(30, 30)),
            }),
            Box::new(StubImageWriter::new()),
            Box::new(StubDetector {
                area: Some(400.0),
                fail: false,
            }),
        )
        .with_logger(Box::new(SharedLogger(shared.clone())));
        uc.execute(Path::new("a.png"));

        let logger = shared.lock().unwrap();
        for stage in ["load", "detect", "save"] {
            assert!(logger.timings_for(stage).is_some(), "missing stage {stage}");
        }
        assert_eq!(logger.metrics_for("region_area"), Some(&[400.0][..]));
        assert_eq!(logger.metrics_for("threshold"), Some(&[200.0][..]));
    }

    #[test]
    fn test_end_to_end_bright_disk() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scan.png");
        write_png(&input, &bright_disk(120, 90, 20));

        let mut uc = DetectRegionUseCase::new(
            Box::new(ImageFileReader::new()),
            Box::new(ImageFileWriter::new()),
            Box::new(ThresholdRegionDetector::new()),
        );
        let result = uc.execute(&input);

        let output = dir.path().join("scan_tumor_processed.png");
        assert_eq!(result.label.to_string(), "Anomaly detected");
        assert_eq!(result.processed_image_path, Some(output.clone()));
        let saved = image::open(&output).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (120, 90));
        assert_ne!(saved, bright_disk(120, 90, 20));
    }

    #[test]
    fn test_end_to_end_uniform_gray_saved_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("flat.png");
        let gray = image::RgbImage::from_pixel(50, 40, image::Rgb([128, 128, 128]));
        write_png(&input, &gray);

        let mut uc = DetectRegionUseCase::new(
            Box::new(ImageFileReader::new()),
            Box::new(ImageFileWriter::new()),
            Box::new(ThresholdRegionDetector::new()),
        );
        let result = uc.execute(&input);

        assert_eq!(result.label, RegionVerdict::NoAnomaly);
        let output = result.processed_image_path.unwrap();
        assert_eq!(image::open(&output).unwrap().to_rgb8(), gray);
    }

    #[test]
    fn test_end_to_end_reprocessing_output_stacks_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("scan.png");
        write_png(&input, &bright_disk(100, 100, 20));

        let mut uc = DetectRegionUseCase::new(
            Box::new(ImageFileReader::new()),
            Box::new(ImageFileWriter::new()),
            Box::new(ThresholdRegionDetector::new()),
        );
        let first = uc.execute(&input).processed_image_path.unwrap();
        let first_bytes = std::fs::read(&first).unwrap();

        let second = uc.execute(&first).processed_image_path.unwrap();

        assert_eq!(
            second,
            dir.path().join("scan_tumor_processed_tumor_processed.png")
        );
        assert!(second.exists());
        assert_eq!(std::fs::read(&first).unwrap(), first_bytes);
    }

    #[test]
    fn test_end_to_end_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut uc = DetectRegionUseCase::new(
            Box::new(ImageFileReader::new()),
            Box::new(ImageFileWriter::new()),
            Box::new(ThresholdRegionDetector::new()),
        );
        let result = uc.execute(&dir.path().join("nope.png"));

        assert_eq!(result.processed_image_path, None);
        assert_eq!(result.label, RegionVerdict::LoadFailed);
    }
}
