use crate::constants::{IMPORT_HEADER, MATCHES_HEADER};
use crate::error::Result;
use crate::types::Match;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer)
}

/// Mastodon "follows" import format: one row per unique handle, sorted.
pub fn write_import_list<W, I, S>(writer: W, handles: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let rows: BTreeSet<String> = handles.into_iter().map(Into::into).collect();

    let mut wtr = csv_writer(writer);
    wtr.write_record(IMPORT_HEADER)?;
    for handle in &rows {
        wtr.write_record([handle.as_str(), "true", "false", ""])?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

/// Audit trail: one row per match, sorted by (Mastodon handle, Bluesky handle).
pub fn write_audit_list<W: Write>(writer: W, matches: &[Match]) -> Result<usize> {
    let mut sorted: Vec<&Match> = matches.iter().collect();
    sorted.sort_by(|a, b| {
        (&a.mastodon_handle, &a.bluesky_handle).cmp(&(&b.mastodon_handle, &b.bluesky_handle))
    });

    let mut wtr = csv_writer(writer);
    wtr.write_record(MATCHES_HEADER)?;
    for m in &sorted {
        wtr.write_record([
            m.bluesky_handle.as_str(),
            m.bluesky_display_name.as_str(),
            m.mastodon_handle.as_str(),
            m.source.as_str(),
            m.verified.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(sorted.len())
}

pub fn write_import_csv<I, S>(path: &Path, handles: I) -> Result<usize>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let rows = write_import_list(File::create(path)?, handles)?;
    info!("Wrote {} import rows to {}", rows, path.display());
    Ok(rows)
}

pub fn write_matches_csv(path: &Path, matches: &[Match]) -> Result<usize> {
    let rows = write_audit_list(File::create(path)?, matches)?;
    info!("Wrote {} match rows to {}", rows, path.display());
    Ok(rows)
}
