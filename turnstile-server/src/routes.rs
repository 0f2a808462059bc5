pub mod root;
pub mod webrtc;
