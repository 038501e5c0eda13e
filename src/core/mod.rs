pub mod decoder;
pub mod merge;
pub mod pcm;
pub mod resample;
pub mod wav;
