//! Input processing module
//! Handles file detection, record decoding, and input management

pub mod decoder;
pub mod file_detector;
pub mod manager;

pub use manager::InputManager;
