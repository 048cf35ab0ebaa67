pub mod emotion_classifier;
pub mod emotion_label;
pub mod landmark_overlay;
pub mod landmark_provider;
pub mod landmark_set;
pub mod mesh_topology;
