use std::path::Path;
use std::time::Instant;

use crate::emotion::domain::emotion_classifier::classify;
use crate::emotion::domain::emotion_label::{EmotionLabel, EmotionVerdict};
use crate::emotion::domain::landmark_overlay::LandmarkOverlay;
use crate::emotion::domain::landmark_provider::LandmarkProvider;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::pipeline::pipeline_logger::{elapsed_ms, NullPipelineLogger, PipelineLogger};
use crate::shared::analysis_result::AnalysisResult;
use crate::shared::constants::EMOTION_OUTPUT_SUFFIX;
use crate::shared::frame::Frame;
use crate::shared::output_path::derive_output_path;

/// Single-image emotion pipeline: read → landmarks → classify → overlay → write.
///
/// Never fails: load errors yield no path, later errors yield the input path
/// with [`EmotionVerdict::ProcessingFailed`].
pub struct DetectEmotionUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    provider: Box<dyn LandmarkProvider>,
    overlay: Box<dyn LandmarkOverlay>,
    logger: Box<dyn PipelineLogger>,
}

impl DetectEmotionUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        provider: Box<dyn LandmarkProvider>,
        overlay: Box<dyn LandmarkOverlay>,
    ) -> Self {
        Self {
            reader,
            writer,
            provider,
            overlay,
            logger: Box::new(NullPipelineLogger),
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn execute(&mut self, input_path: &Path) -> AnalysisResult<EmotionVerdict> {
        let start = Instant::now();
        let mut frame = match self.reader.read(input_path) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("{e}");
                return AnalysisResult::new(None, EmotionVerdict::LoadFailed);
            }
        };
        self.logger.timing("load", elapsed_ms(start));

        let output_path = derive_output_path(input_path, EMOTION_OUTPUT_SUFFIX);
        let result = match self.analyze(&mut frame, &output_path) {
            Ok(label) => AnalysisResult::new(Some(output_path), EmotionVerdict::Emotion(label)),
            Err(e) => {
                log::warn!("Emotion analysis of {} failed: {e}", input_path.display());
                AnalysisResult::new(
                    Some(input_path.to_path_buf()),
                    EmotionVerdict::ProcessingFailed,
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
    ) -> Result<EmotionLabel, Box<dyn std::error::Error>> {
        let t = Instant::now();
        let landmarks = self.provider.extract_landmarks(frame)?;
        self.logger.timing("landmarks", elapsed_ms(t));

        let label = match landmarks {
            Some(landmarks) => {
                self.logger.metric("landmark_count", landmarks.len() as f64);

                let t = Instant::now();
                let label = classify(&landmarks);
                self.logger.timing("classify", elapsed_ms(t));

                let t = Instant::now();
                self.overlay.draw(frame, &landmarks)?;
                self.logger.timing("overlay", elapsed_ms(t));
                label
            }
            None => {
                self.logger.info("No face found, saving image unmodified");
                EmotionLabel::Neutral
            }
        };

        let t = Instant::now();
        self.writer.write(output_path, frame)?;
        self.logger.timing("save", elapsed_ms(t));

        self.logger.info(&format!("{label} → {}", output_path.display()));
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::domain::landmark_set::{LandmarkSet, Point2, FACE_MESH_POINTS};
    use crate::imaging::domain::image_io_error::ImageIoError;
    use crate::imaging::infrastructure::image_file_reader::ImageFileReader;
    use crate::imaging::infrastructure::image_file_writer::ImageFileWriter;
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
        fail: bool,
    }

    impl StubImageWriter {
        fn new() -> Self {
            Self {
                written: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }
        }
    }

    impl ImageWriter for StubImageWriter {
        fn write(&self, path: &Path, frame: &Frame) -> Result<(), ImageIoError> {
            if self.fail {
                return Err(ImageIoError::UnsupportedFrame {
                    channels: frame.channels(),
                });
            }
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), frame.clone()));
            Ok(())
        }
    }

    enum StubLandmarks {
        Face(LandmarkSet),
        NoFace,
        Fails,
    }

    struct StubProvider {
        result: StubLandmarks,
    }

    impl LandmarkProvider for StubProvider {
        fn extract_landmarks(
            &mut self,
            _frame: &Frame,
        ) -> Result<Option<LandmarkSet>, Box<dyn std::error::Error>> {
            match &self.result {
                StubLandmarks::Face(set) => Ok(Some(set.clone())),
                StubLandmarks::NoFace => Ok(None),
                StubLandmarks::Fails => Err("inference failed".into()),
            }
        }
    }

    /// Paints the first pixel white and records each call.
    struct MarkingOverlay {
        calls: Arc<Mutex<usize>>,
    }

    impl MarkingOverlay {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(0)),
            }
        }
    }

    impl LandmarkOverlay for MarkingOverlay {
        fn draw(
            &self,
            frame: &mut Frame,
            _landmarks: &LandmarkSet,
        ) -> Result<(), Box<dyn std::error::Error>> {
            *self.calls.lock().unwrap() += 1;
            frame.data_mut()[..3].fill(255);
            Ok(())
        }
    }

    // --- Helpers ---

    fn make_frame(w: u32, h: u32) -> Frame {
        Frame::new(vec![128; (w * h * 3) as usize], w, h, 3)
    }

    /// A full mesh with the mouth set by `top`, `bottom`, `left`, `right`.
    fn face(
        top: (f64, f64),
        bottom: (f64, f64),
        left: (f64, f64),
        right: (f64, f64),
    ) -> LandmarkSet {
        let mut points = vec![Point2::new(0.5, 0.5); FACE_MESH_POINTS];
        points[13] = Point2::new(top.0, top.1);
        points[14] = Point2::new(bottom.0, bottom.1);
        points[61] = Point2::new(left.0, left.1);
        points[291] = Point2::new(right.0, right.1);
        LandmarkSet::new(points).unwrap()
    }

    fn use_case(
        frame: Option<Frame>,
        writer: StubImageWriter,
        landmarks: StubLandmarks,
        overlay: MarkingOverlay,
    ) -> DetectEmotionUseCase {
        DetectEmotionUseCase::new(
            Box::new(StubImageReader { frame }),
            Box::new(writer),
            Box::new(StubProvider { result: landmarks }),
            Box::new(overlay),
        )
    }

    // --- Tests ---

    #[test]
    fn test_face_is_classified_drawn_and_saved() {
        let writer = StubImageWriter::new();
        let written = writer.written.clone();
        let overlay = MarkingOverlay::new();
        let calls = overlay.calls.clone();
        // Wide open mouth
        let landmarks = face((0.5, 0.5), (0.5, 0.75), (0.25, 0.6), (0.75, 0.6));

        let result = use_case(
            Some(make_frame(40, 30)),
            writer,
            StubLandmarks::Face(landmarks),
            overlay,
        )
        .execute(Path::new("faces/me.jpg"));

        assert_eq!(result.label, EmotionVerdict::Emotion(EmotionLabel::Surprised));
        assert_eq!(
            result.processed_image_path,
            Some(PathBuf::from("faces/me_processed.jpg"))
        );
        assert_eq!(*calls.lock().unwrap(), 1);

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, PathBuf::from("faces/me_processed.jpg"));
        assert_eq!(&written[0].1.data()[..3], &[255, 255, 255]);
    }

    #[test]
    fn test_no_face_saves_unmodified_neutral() {
        let writer = StubImageWriter::new();
        let written = writer.written.clone();
        let overlay = MarkingOverlay::new();
        let calls = overlay.calls.clone();
        let frame = make_frame(20, 20);

        let result = use_case(Some(frame.clone()), writer, StubLandmarks::NoFace, overlay)
            .execute(Path::new("empty.png"));

        assert_eq!(result.label, EmotionVerdict::Emotion(EmotionLabel::Neutral));
        assert_eq!(
            result.processed_image_path,
            Some(PathBuf::from("empty_processed.png"))
        );
        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(written.lock().unwrap()[0].1, frame);
    }

    #[test]
    fn test_load_failure_has_no_path() {
        let writer = StubImageWriter::new();
        let written = writer.written.clone();

        let result = use_case(None, writer, StubLandmarks::NoFace, MarkingOverlay::new())
            .execute(Path::new("missing.png"));

        assert_eq!(result.label, EmotionVerdict::LoadFailed);
        assert_eq!(result.processed_image_path, None);
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_provider_error_returns_original_path() {
        let writer = StubImageWriter::new();
        let written = writer.written.clone();

        let result = use_case(
            Some(make_frame(10, 10)),
            writer,
            StubLandmarks::Fails,
            MarkingOverlay::new(),
        )
        .execute(Path::new("in.png"));

        assert_eq!(result.label, EmotionVerdict::ProcessingFailed);
        assert_eq!(result.processed_image_path, Some(PathBuf::from("in.png")));
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_save_error_returns_original_path() {
        let mut writer = StubImageWriter::new();
        writer.fail = true;

        let result = use_case(
            Some(make_frame(10, 10)),
            writer,
            StubLandmarks::NoFace,
            MarkingOverlay::new(),
        )
        .execute(Path::new("in.png"));

        assert_eq!(result.label, EmotionVerdict::ProcessingFailed);
        assert_eq!(result.processed_image_path, Some(PathBuf::from("in.png")));
    }

    #[test]
    fn test_end_to_end_no_face_keeps_pixels_and_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("portrait.png");
        let img = image::RgbImage::from_fn(16, 12, |x, y| {
            image::Rgb([x as u8 * 10, y as u8 * 10, 77])
        });
        img.save(&input).unwrap();
        let input_bytes = std::fs::read(&input).unwrap();

        let mut uc = DetectEmotionUseCase::new(
            Box::new(ImageFileReader::new()),
            Box::new(ImageFileWriter::new()),
            Box::new(StubProvider {
                result: StubLandmarks::NoFace,
            }),
            Box::new(MarkingOverlay::new()),
        );
        let result = uc.execute(&input);

        let output = dir.path().join("portrait_processed.png");
        assert_eq!(result.processed_image_path, Some(output.clone()));
        assert_eq!(result.to_string(), format!("{}\tNeutral", output.display()));
        assert_eq!(image::open(&output).unwrap().to_rgb8(), img);
        assert_eq!(std::fs::read(&input).unwrap(), input_bytes);
    }

    #[test]
    fn test_end_to_end_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.png");
        std::fs::write(&input, b"not an image").unwrap();

        let mut uc = DetectEmotionUseCase::new(
            Box::new(ImageFileReader::new()),
            Box::new(ImageFileWriter::new()),
            Box::new(StubProvider {
                result: StubLandmarks::NoFace,
            }),
            Box::new(MarkingOverlay::new()),
        );
        let result = uc.execute(&input);

        assert_eq!(result.processed_image_path, None);
        assert_eq!(result.label.to_string(), "Error loading image");
        assert!(!dir.path().join("notes_processed.png").exists());
    }
}
