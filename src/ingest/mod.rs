// src/ingest/mod.rs
pub mod decode;
pub mod table;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{Read, Seek},
    path::Path,
};
use tracing::{debug, info, instrument, warn};
use zip::ZipArchive;

use crate::{config::Settings, error::PipelineError};

pub use decode::decode_bytes;
pub use table::{render_table, render_tables};

/// Parsed CSV content. Row 0 is the header row.
///
/// Every data row is padded with empty strings (or truncated) to the header's width,
/// but the width the row had in the source is remembered so callers can still refuse
/// rows that were too short to begin with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowMatrix {
    rows: Vec<Vec<String>>,
    #[serde(skip)]
    source_widths: Vec<usize>,
}

/// One data row borrowed from a [`RowMatrix`].
#[derive(Debug, Clone, Copy)]
pub struct DataRow<'a> {
    /// Position in the matrix (the header is row 0).
    pub index: usize,
    pub cells: &'a [String],
    /// Cell count before padding/truncation.
    pub source_width: usize,
}

impl<'a> DataRow<'a> {
    pub fn cell(&self, idx: usize) -> &'a str {
        self.cells.get(idx).map_or("", String::as_str)
    }

    /// Trimmed cell, or "" when the column is absent.
    pub fn trimmed(&self, idx: Option<usize>) -> &'a str {
        idx.map_or("", |i| self.cell(i).trim())
    }
}

impl RowMatrix {
    pub fn from_records(records: Vec<Vec<String>>) -> Self {
        let mut rows = records.into_iter();
        let Some(header) = rows.next() else {
            return Self::default();
        };
        let width = header.len();
        let mut out = Vec::with_capacity(rows.len() + 1);
        let mut source_widths = Vec::with_capacity(rows.len() + 1);
        source_widths.push(width);
        out.push(header);
        for mut row in rows {
            source_widths.push(row.len());
            row.resize(width, String::new());
            out.push(row);
        }
        Self {
            rows: out,
            source_widths,
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn data_rows(&self) -> impl Iterator<Item = DataRow<'_>> {
        self.rows
            .iter()
            .zip(&self.source_widths)
            .enumerate()
            .skip(1)
            .map(|(index, (cells, &source_width))| DataRow {
                index,
                cells,
                source_width,
            })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse comma-delimited, quote-aware text. Empty input gives an empty matrix.
pub fn parse_csv(file: &str, text: &str) -> Result<RowMatrix, PipelineError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| PipelineError::Csv {
            file: file.to_string(),
            record: idx,
            message: e.to_string(),
        })?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(RowMatrix::from_records(records))
}

/// A single CSV input, successfully parsed or not.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedFile {
    /// Lowercased base filename; the key role resolution matches against.
    pub name: String,
    /// Name as it appeared on disk or in the archive.
    pub source: String,
    pub outcome: Result<RowMatrix, PipelineError>,
}

impl LoadedFile {
    pub fn matrix(&self) -> Option<&RowMatrix> {
        self.outcome.as_ref().ok()
    }
}

/// Decode and parse one file's raw bytes. Failures stay attached to the file.
pub fn load_bytes(source: &str, bytes: &[u8], settings: &Settings) -> LoadedFile {
    let name = base_name(source).to_lowercase();
    let outcome = decode_bytes(&name, bytes, &settings.encodings)
        .and_then(|(text, _)| parse_csv(&name, &text));
    match &outcome {
        Ok(m) => debug!(file = %name, rows = m.len(), "parsed"),
        Err(e) => warn!(file = %name, error = %e, "could not load file"),
    }
    LoadedFile {
        name,
        source: source.to_string(),
        outcome,
    }
}

/// Read every `.csv` member of a ZIP archive, skipping directories and `__MACOSX`
/// metadata, in archive order.
#[instrument(level = "info", skip(zip_path, settings), fields(path = %zip_path.as_ref().display()))]
pub fn load_zip<P: AsRef<Path>>(zip_path: P, settings: &Settings) -> Result<Vec<LoadedFile>> {
    let file = File::open(&zip_path)
        .with_context(|| format!("Failed to open ZIP file: {:?}", zip_path.as_ref()))?;
    load_zip_reader(file, settings)
        .with_context(|| format!("Failed to read ZIP archive: {:?}", zip_path.as_ref()))
}

pub fn load_zip_reader<R: Read + Seek>(reader: R, settings: &Settings) -> Result<Vec<LoadedFile>> {
    let mut archive = ZipArchive::new(reader)?;
    let mut files = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to access ZIP entry #{}", i))?;
        let name = entry.name().to_string();
        if !entry.is_file() || is_archive_metadata(&name) || !is_csv(&name) {
            continue;
        }
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buf)
            .with_context(|| format!("Failed to read {} into memory", name))?;
        files.push(load_bytes(&name, &buf, settings));
    }

    if files.is_empty() {
        warn!("no CSV files found in ZIP archive");
    } else {
        info!(count = files.len(), "loaded CSV members");
    }
    Ok(files)
}

/// Read standalone CSV files from disk. A file that cannot be read is kept as a
/// failed entry so the rest still load.
pub fn load_csv_files<P: AsRef<Path>>(paths: &[P], settings: &Settings) -> Vec<LoadedFile> {
    paths
        .iter()
        .map(|p| {
            let p = p.as_ref();
            let source = p.to_string_lossy();
            match fs::read(p) {
                Ok(bytes) => load_bytes(&source, &bytes, settings),
                Err(e) => unreadable(&source, e.to_string()),
            }
        })
        .collect()
}

/// Load a mixed list of `.zip` and `.csv` paths; anything else is skipped with a warning.
/// Unreadable inputs come back as failed entries rather than ending the load.
pub fn load_inputs<P: AsRef<Path>>(paths: &[P], settings: &Settings) -> Vec<LoadedFile> {
    let mut files = Vec::new();
    for p in paths {
        let p = p.as_ref();
        let lower = p.to_string_lossy().to_lowercase();
        if lower.ends_with(".zip") {
            match load_zip(p, settings) {
                Ok(members) => files.extend(members),
                Err(e) => files.push(unreadable(&p.to_string_lossy(), format!("{e:#}"))),
            }
        } else if lower.ends_with(".csv") {
            files.extend(load_csv_files(&[p], settings));
        } else {
            warn!(path = %p.display(), "not a ZIP or CSV file, skipping");
        }
    }
    files
}

fn unreadable(source: &str, message: String) -> LoadedFile {
    let name = base_name(source).to_lowercase();
    warn!(file = %name, error = %message, "could not read input");
    LoadedFile {
        outcome: Err(PipelineError::Io {
            file: name.clone(),
            message,
        }),
        name,
        source: source.to_string(),
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn is_csv(name: &str) -> bool {
    name.to_lowercase().ends_with(".csv")
}

fn is_archive_metadata(name: &str) -> bool {
    name.starts_with("__MACOSX") || name.contains("/__MACOSX/")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::{tempdir, NamedTempFile};
    use zip::write::FileOptions;
    use zip::CompressionMethod;

    pub(crate) fn build_zip(members: &[(&str, &[u8])]) -> anyhow::Result<Vec<u8>> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options: FileOptions<'_, ()> =
                FileOptions::default().compression_method(CompressionMethod::Stored);
            for (name, data) in members {
                zip.start_file(*name, options)?;
                zip.write_all(data)?;
            }
            zip.finish()?;
        }
        Ok(buf)
    }

    #[test]
    fn short_rows_padded_long_rows_truncated() {
        let m = parse_csv("t.csv", "a,b,c\n1\n1,2,3,4\n").unwrap();
        assert_eq!(m.rows()[1], vec!["1", "", ""]);
        assert_eq!(m.rows()[2], vec!["1", "2", "3"]);
        let widths: Vec<usize> = m.data_rows().map(|r| r.source_width).collect();
        assert_eq!(widths, vec![1, 4]);
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let m = parse_csv("t.csv", "Name,Note\n\"Lee, Sam\",\"said \"\"hi\"\"\"\n").unwrap();
        assert_eq!(m.rows()[1], vec!["Lee, Sam", "said \"hi\""]);
    }

    #[test]
    fn empty_input_is_empty_matrix() {
        let m = parse_csv("t.csv", "").unwrap();
        assert!(m.is_empty());
        assert!(m.header().is_empty());
        assert_eq!(m.data_rows().count(), 0);
    }

    #[test]
    fn load_bytes_lowercases_base_name() {
        let f = load_bytes("export/Lines_With_Low_Call_Volume.CSV", b"a\n1\n", &Settings::default());
        assert_eq!(f.name, "lines_with_low_call_volume.csv");
        assert_eq!(f.matrix().map(RowMatrix::len), Some(2));
    }

    #[test]
    fn zip_skips_metadata_and_non_csv() -> anyhow::Result<()> {
        let bytes = build_zip(&[
            ("report/rooftop_information.csv", b"Rooftop Name,CSM Owner\nA,B\n"),
            ("__MACOSX/report/._rooftop_information.csv", b"\x00\x05\x16\x07"),
            ("readme.txt", b"hello"),
            ("bad.csv", b"\xff\xfe"),
        ])?;
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(&bytes)?;

        let settings = Settings::default().with_encoding_labels(&["utf-8"])?;
        let files = load_zip(tmp.path(), &settings)?;
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["rooftop_information.csv", "bad.csv"]);
        assert!(files[0].matrix().is_some());
        assert!(matches!(files[1].outcome, Err(PipelineError::Decoding { .. })));
        Ok(())
    }

    #[test]
    fn load_inputs_mixes_zip_and_csv() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let zip_path = dir.path().join("bundle.zip");
        fs::write(&zip_path, build_zip(&[("a.csv", b"x\n1\n")])?)?;
        let csv_path = dir.path().join("B.csv");
        fs::write(&csv_path, "y\n2\n")?;
        let txt_path = dir.path().join("notes.txt");
        fs::write(&txt_path, "ignored")?;

        let files = load_inputs(&[zip_path, csv_path, txt_path], &Settings::default());
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
        Ok(())
    }

    #[test]
    fn missing_csv_does_not_drop_the_others() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let lines = dir.path().join("lines_with_low_call_volume.csv");
        fs::write(&lines, "Rooftop Name\nAcme\n")?;
        let missing = dir.path().join("desk_phones.csv");
        let rooftops = dir.path().join("rooftop_information.csv");
        fs::write(&rooftops, "Rooftop Name,CSM Owner\nAcme,Sam\n")?;

        let files = load_inputs(&[lines, missing, rooftops], &Settings::default());
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["lines_with_low_call_volume.csv", "desk_phones.csv", "rooftop_information.csv"]
        );
        assert!(files[0].matrix().is_some());
        assert!(matches!(
            &files[1].outcome,
            Err(PipelineError::Io { file, .. }) if file == "desk_phones.csv"
        ));
        assert!(files[2].matrix().is_some());
        Ok(())
    }

    #[test]
    fn corrupt_zip_in_inputs_is_recorded() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let bad_zip = dir.path().join("Export.zip");
        fs::write(&bad_zip, b"not a zip")?;
        let csv_path = dir.path().join("rooftop_information.csv");
        fs::write(&csv_path, "Rooftop Name,CSM Owner\nAcme,Sam\n")?;

        let files = load_inputs(&[bad_zip, csv_path], &Settings::default());
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "export.zip");
        assert!(matches!(files[0].outcome, Err(PipelineError::Io { .. })));
        assert!(files[1].matrix().is_some());
        Ok(())
    }

    #[test]
    fn corrupt_zip_is_an_error() -> anyhow::Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"not a zip")?;
        assert!(load_zip(tmp.path(), &Settings::default()).is_err());
        Ok(())
    }
}
