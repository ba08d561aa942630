pub mod archive;
pub mod write;

pub use archive::{FeedArchive, Table};
pub use write::FeedWriter;

#[cfg(test)]
pub(crate) mod testutil {
    use std::io::Write;

    use tempfile::NamedTempFile;
    use zip::write::{ExtendedFileOptions, FileOptions};
    use zip::CompressionMethod;

    /// Build a zip on disk from `(entry name, entry text)` pairs, in order.
    pub fn make_zip(entries: &[(&str, &str)]) -> NamedTempFile {
        let tmp = NamedTempFile::new().unwrap();
        let mut zip = zip::ZipWriter::new(tmp.reopen().unwrap());
        for (name, content) in entries {
            let options = FileOptions::<ExtendedFileOptions>::default()
                .compression_method(CompressionMethod::Stored);
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        tmp
    }
}
