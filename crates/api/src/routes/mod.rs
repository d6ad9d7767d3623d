pub mod email;
pub mod export;
pub mod transcribe;
