pub mod detect_emotion_use_case;
pub mod detect_region_use_case;
pub mod pipeline_logger;
