/// Filesystem transport.
pub mod fs;
/// HTTP transport.
#[cfg(feature = "http")]
pub mod http;
