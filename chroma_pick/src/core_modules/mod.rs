pub mod clipboard;
pub mod color;
pub mod contrast;
pub mod coordinate_mapper;
pub mod export;
pub mod history;
pub mod image_loader;
pub mod palette;
pub mod ramp;
pub mod raster;
pub mod storage;
