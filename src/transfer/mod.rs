pub mod downloader;
pub mod uploader;

pub use downloader::Downloader;
pub use uploader::Uploader;

/// Files move across the wire in chunks of this size; neither side ever
/// buffers a whole file.
pub const CHUNK_SIZE: usize = 4096;
