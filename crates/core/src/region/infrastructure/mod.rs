pub mod gaussian;
pub mod heatmap;
pub mod threshold_region_detector;
