use std::io::Write;

/// Read access to uploaded objects.
pub trait ObjectStore {
    /// Streams the object body into `sink` and returns the number of bytes written.
    fn download_object(
        &self,
        bucket: &str,
        key: &str,
        sink: &mut dyn Write,
    ) -> Result<u64, String>;
}
