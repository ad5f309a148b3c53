// Primitives for reading CSV files.

use csv::ByteRecord;
use vote_concentration::mentions::Post;

use crate::vgeo::config_reader::{Encoding, TableLayout};
use crate::vgeo::io_common::{decode_field, find_column, make_record, ColumnIndexes};
use crate::vgeo::*;

fn decode_record(
    record: &ByteRecord,
    encoding: Encoding,
    path: &str,
    lineno: u64,
) -> VgeoResult<Vec<String>> {
    record
        .iter()
        .map(|b| decode_field(b, encoding, path, lineno))
        .collect()
}

fn open_reader(path: &str, separator: u8) -> VgeoResult<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })
}

fn read_header(
    rdr: &mut csv::Reader<std::fs::File>,
    encoding: Encoding,
    path: &str,
) -> VgeoResult<Vec<String>> {
    let header = rdr
        .byte_headers()
        .context(CsvLineParseSnafu { path, lineno: 1u64 })?
        .clone();
    decode_record(&header, encoding, path, 1)
}

pub fn read_csv_votes(
    path: &str,
    layout: &TableLayout,
    data_source: DataSource,
) -> VgeoResult<Vec<VoteRecord>> {
    let mut rdr = open_reader(path, layout.separator)?;
    let header = read_header(&mut rdr, layout.encoding, path)?;
    debug!("read_csv_votes: header: {:?}", header);
    let cols = ColumnIndexes::locate(&header, layout, data_source, path)?;

    let mut res: Vec<VoteRecord> = Vec::new();
    for (idx, line_r) in rdr.byte_records().enumerate() {
        // The header is the first line.
        let lineno = idx as u64 + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let fields = decode_record(&line, layout.encoding, path, lineno)?;
        res.push(make_record(&fields, &cols, layout, path, lineno)?);
    }
    info!("read_csv_votes: read {} rows from {}", res.len(), path);
    Ok(res)
}

/// Reads the posts of the candidates. The file is expected in UTF-8.
pub fn read_csv_posts(
    path: &str,
    separator: u8,
    candidate_column: &str,
    content_column: &str,
) -> VgeoResult<Vec<Post>> {
    let mut rdr = open_reader(path, separator)?;
    let header = read_header(&mut rdr, Encoding::Utf8, path)?;
    let candidate_idx = find_column(&header, candidate_column).context(MissingColumnSnafu {
        column: candidate_column,
        path,
    })?;
    let content_idx = find_column(&header, content_column).context(MissingColumnSnafu {
        column: content_column,
        path,
    })?;

    let mut res: Vec<Post> = Vec::new();
    for (idx, line_r) in rdr.byte_records().enumerate() {
        let lineno = idx as u64 + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let fields = decode_record(&line, Encoding::Utf8, path, lineno)?;
        let candidate = fields
            .get(candidate_idx)
            .context(LineTooShortSnafu { path, lineno })?
            .trim()
            .to_string();
        let content = fields
            .get(content_idx)
            .context(LineTooShortSnafu { path, lineno })?
            .to_string();
        if candidate.is_empty() {
            warn!("read_csv_posts: {}:{}: post without candidate, skipping", path, lineno);
            continue;
        }
        res.push(Post { candidate, content });
    }
    info!("read_csv_posts: read {} posts from {}", res.len(), path);
    Ok(res)
}
