pub mod artifact;
pub mod playlist;
pub mod progress;
