#[cfg(feature = "http-webrtc")]
pub mod webrtc;
