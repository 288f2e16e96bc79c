//! CSV file dataset adapter.

use crate::domain::dataset::Dataset;
use crate::domain::error::TvlError;
use crate::domain::record::{is_valid_tvl, parse_calendar_date, TvlRecord, DATE_FORMAT};
use crate::ports::dataset_port::DatasetPort;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const HEADER: [&str; 3] = ["date", "tvl", "asset_type"];

pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(&self, content: &str) -> Result<Dataset, TvlError> {
        if content.trim().is_empty() {
            return Ok(Dataset::new());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| TvlError::Csv {
                    reason: format!("{}: missing {} column", self.path.display(), name),
                })
        };
        let date_col = column("date")?;
        let tvl_col = column("tvl")?;
        let asset_col = column("asset_type")?;

        let mut records = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            // header is line 1
            let line = idx + 2;
            let record = result?;

            let Some(date) = record.get(date_col).and_then(parse_calendar_date) else {
                warn!(line, "dropping row with unparseable date");
                continue;
            };
            let Some(tvl) = record
                .get(tvl_col)
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| is_valid_tvl(*v))
            else {
                warn!(line, "dropping row with invalid tvl");
                continue;
            };
            let asset_type = match record.get(asset_col) {
                Some(a) if !a.is_empty() => a.to_string(),
                _ => {
                    warn!(line, "dropping row with empty asset_type");
                    continue;
                }
            };

            records.push(TvlRecord {
                date,
                tvl,
                asset_type,
            });
        }

        Ok(Dataset::from_records(records))
    }

    fn render(dataset: &Dataset, out: impl Write) -> Result<(), TvlError> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(HEADER)?;
        for r in dataset.records() {
            let date = r.date.format(DATE_FORMAT).to_string();
            let tvl = r.tvl.to_string();
            wtr.write_record([date.as_str(), tvl.as_str(), r.asset_type.as_str()])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl DatasetPort for CsvStore {
    fn load(&self) -> Result<Dataset, TvlError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no dataset yet, starting empty");
                return Ok(Dataset::new());
            }
            Err(e) => return Err(e.into()),
        };
        let dataset = self.parse(&content)?;
        debug!(path = %self.path.display(), rows = dataset.len(), "loaded dataset");
        Ok(dataset)
    }

    fn persist(&self, dataset: &Dataset) -> Result<(), TvlError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        // NamedTempFile is created 0600
        if let Some(perms) = target_permissions(&self.path)? {
            tmp.as_file().set_permissions(perms)?;
        }
        Self::render(dataset, tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| TvlError::Io(e.error))?;

        debug!(path = %self.path.display(), rows = dataset.len(), "persisted dataset");
        Ok(())
    }
}

/// Permissions of the existing file, or a world-readable default for a new one.
fn target_permissions(path: &Path) -> Result<Option<fs::Permissions>, TvlError> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.permissions())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(default_permissions()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}
