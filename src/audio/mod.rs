pub mod catalog;
pub mod media;
pub mod prepare;
pub mod resample;
pub mod select;
