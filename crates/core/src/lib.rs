pub mod emotion;
pub mod imaging;
pub mod pipeline;
pub mod region;
pub mod shared;
