use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::{
    collections::HashMap,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};
use tracing::debug;
use zip::ZipArchive;

/// One source feed: a zip of `.txt` CSV tables, buffered into memory at
/// open. Entries are decoded once (lossy UTF-8, BOM stripped) so that
/// every later `read_table` is a cheap re-scan of the buffered text.
pub struct FeedArchive {
    path: PathBuf,
    tables: HashMap<String, String>,
    names: Vec<String>,
}

impl FeedArchive {
    /// Open `path` and buffer every table entry. Entries that are not
    /// files or don't end in `.txt` are not tables and are skipped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file =
            File::open(&path).with_context(|| format!("opening archive {}", path.display()))?;
        let mut archive = ZipArchive::new(file)
            .with_context(|| format!("reading zip archive {}", path.display()))?;

        let mut tables = HashMap::new();
        let mut names = Vec::new();
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .with_context(|| format!("entry #{} in {}", i, path.display()))?;
            let name = entry.name().to_string();
            if !entry.is_file() || !name.to_lowercase().ends_with(".txt") {
                debug!(archive = %path.display(), entry = %name, "skipping non-table entry");
                continue;
            }
            let mut buf = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut buf)
                .with_context(|| format!("reading {} from {}", name, path.display()))?;
            let text = String::from_utf8_lossy(&buf).into_owned();
            let text = text.strip_prefix('\u{feff}').unwrap_or(&text).to_string();
            names.push(name.clone());
            tables.insert(name, text);
        }

        Ok(Self {
            path,
            tables,
            names,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Table names in archive order.
    pub fn table_names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Open a fresh single-pass reader over `table`. Returns `Ok(None)`
    /// when the archive has no such table; `Err` when the entry exists
    /// but its header can't be parsed.
    pub fn read_table(&self, table: &str) -> Result<Option<Table<'_>>> {
        let text = match self.tables.get(table) {
            Some(t) => t,
            None => return Ok(None),
        };
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());
        let header: Vec<String> = rdr
            .headers()
            .with_context(|| format!("parsing header of {} in {}", table, self.path.display()))?
            .iter()
            .map(str::to_string)
            .collect();
        // a zero-byte entry parses as a single empty column; treat as empty header
        let header = if header.len() == 1 && header[0].is_empty() {
            Vec::new()
        } else {
            header
        };
        Ok(Some(Table { header, rdr }))
    }
}

/// A lazily-read table: header plus a single-pass record stream.
pub struct Table<'a> {
    header: Vec<String>,
    rdr: csv::Reader<&'a [u8]>,
}

impl<'a> Table<'a> {
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Ordered records as they occur in the source entry.
    pub fn records(&mut self) -> impl Iterator<Item = csv::Result<StringRecord>> + use<'a, '_> {
        self.rdr.records()
    }
}
