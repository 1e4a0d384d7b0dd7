/// Directory-backed resource source.
pub mod file_source;

#[cfg(feature = "http")]
/// HTTP-backed resource source.
pub mod http_source;
