pub mod ffmpeg;
pub mod memory;
pub mod mux;
pub mod platform;
