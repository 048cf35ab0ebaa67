pub mod analysis_result;
pub mod constants;
pub mod drawing;
pub mod frame;
pub mod model_resolver;
pub mod output_path;
