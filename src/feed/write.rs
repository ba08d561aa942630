use anyhow::{Context, Result};
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;
use zip::write::{ExtendedFileOptions, FileOptions};
use zip::{CompressionMethod, DateTime, ZipWriter};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Serialize one table to CSV bytes: BOM, header row, then records in
/// header column order.
pub fn serialize_table(header: &[String], records: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.extend_from_slice(UTF8_BOM);
    {
        let mut wtr = csv::WriterBuilder::new().from_writer(&mut buf);
        wtr.write_record(header).context("writing header row")?;
        for record in records {
            wtr.write_record(record).context("writing record")?;
        }
        wtr.flush().context("flushing csv writer")?;
    }
    Ok(buf)
}

/// Writes merged tables into the output zip, one deflated entry per
/// table. Entry timestamps are pinned so identical runs produce
/// byte-identical archives.
pub struct FeedWriter {
    path: PathBuf,
    zip: ZipWriter<File>,
}

impl FeedWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .with_context(|| format!("creating output archive {}", path.display()))?;
        Ok(Self {
            path,
            zip: ZipWriter::new(file),
        })
    }

    pub fn write_table(
        &mut self,
        name: &str,
        header: &[String],
        records: &[Vec<String>],
    ) -> Result<()> {
        let bytes = serialize_table(header, records)
            .with_context(|| format!("serializing table {}", name))?;
        let options = FileOptions::<ExtendedFileOptions>::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());
        self.zip
            .start_file(name, options)
            .with_context(|| format!("starting entry {} in {}", name, self.path.display()))?;
        self.zip
            .write_all(&bytes)
            .with_context(|| format!("writing entry {} in {}", name, self.path.display()))?;
        debug!(table = %name, bytes = bytes.len(), "wrote table entry");
        Ok(())
    }

    pub fn finish(self) -> Result<()> {
        self.zip
            .finish()
            .with_context(|| format!("finalizing {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedArchive;
    use tempfile::NamedTempFile;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn serializes_with_bom_and_header_first() -> Result<()> {
        let header = row(&["stop_id", "stop_name"]);
        let bytes = serialize_table(&header, &[row(&["S1", "Alpha"])])?;
        assert_eq!(&bytes[..3], UTF8_BOM);
        assert_eq!(&bytes[3..], b"stop_id,stop_name\nS1,Alpha\n");
        Ok(())
    }

    #[test]
    fn quotes_fields_containing_separators() -> Result<()> {
        let header = row(&["route_id", "route_long_name"]);
        let bytes = serialize_table(&header, &[row(&["R1", "Alpha, Beta"])])?;
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.contains("\"Alpha, Beta\""));
        Ok(())
    }

    #[test]
    fn written_archive_reads_back() -> Result<()> {
        let tmp = NamedTempFile::new()?;
        let mut writer = FeedWriter::create(tmp.path())?;
        writer.write_table(
            "agency.txt",
            &row(&["agency_id", "agency_name"]),
            &[row(&["A1", "Metro"])],
        )?;
        writer.finish()?;

        let archive = FeedArchive::open(tmp.path())?;
        let mut table = archive.read_table("agency.txt")?.unwrap();
        assert_eq!(table.header(), ["agency_id", "agency_name"]);
        let rows: Vec<_> = table.records().collect::<csv::Result<_>>()?;
        assert_eq!(&rows[0][1], "Metro");
        Ok(())
    }
}
