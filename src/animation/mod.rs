pub mod ease;
pub mod preview;
pub mod timeline;
pub mod tween;
