pub mod region_candidate;
pub mod region_detector;
pub mod region_label;
