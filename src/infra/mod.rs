pub mod http;
pub mod playback;
pub mod storage;
