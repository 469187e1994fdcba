//! CSV files written next to the Markdown reports

use std::path::Path;

use tracing::debug;

use crate::error::ReportError;

/// Write `header` and `rows` to `path`, creating parent directories.
///
/// Rows shorter than the header are padded with empty fields.
pub fn write_table<S: AsRef<str>>(
    path: &Path,
    header: &[String],
    rows: &[Vec<S>],
) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        let fields = (0..header.len()).map(|i| row.get(i).map(AsRef::as_ref).unwrap_or(""));
        writer.write_record(fields)?;
    }
    writer.flush()?;

    debug!("Wrote {} rows to {:?}", rows.len(), path);
    Ok(())
}
