#[cfg(feature = "openai")]
pub mod openai;
