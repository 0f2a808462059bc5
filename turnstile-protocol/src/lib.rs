#[cfg(any(feature = "http", feature = "http-webrtc"))]
pub mod http;
