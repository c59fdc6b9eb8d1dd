pub mod fragment_encoder;
pub mod session_control;
pub mod session_delegate;
pub mod source_provider;
