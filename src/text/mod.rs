pub mod reflow;
pub mod typing;
