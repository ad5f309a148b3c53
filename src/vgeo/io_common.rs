use std::path::Path;

use crate::vgeo::config_reader::{Encoding, TableLayout};
use crate::vgeo::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Decodes a raw field. Latin-1 maps every byte to the code point of the
/// same value.
pub fn decode_field(bytes: &[u8], encoding: Encoding, path: &str, lineno: u64) -> VgeoResult<String> {
    match encoding {
        Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        Encoding::Utf8 => Ok(std::str::from_utf8(bytes)
            .context(InvalidUtf8Snafu { path, lineno })?
            .to_string()),
    }
}

/// Finds a column by name, ignoring the case and a byte order mark.
pub fn find_column(header: &[String], name: &str) -> Option<usize> {
    header
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name))
}

fn require_column(header: &[String], name: &str, path: &str) -> VgeoResult<usize> {
    find_column(header, name).context(MissingColumnSnafu {
        column: name,
        path,
    })
}

/// Positions of the columns of a vote table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnIndexes {
    location: usize,
    candidate: usize,
    party: usize,
    electoral_unit: usize,
    count: usize,
    // Only the official results carry the status of the candidates.
    status: Option<usize>,
}

impl ColumnIndexes {
    pub fn locate(
        header: &[String],
        layout: &TableLayout,
        data_source: DataSource,
        path: &str,
    ) -> VgeoResult<ColumnIndexes> {
        let status = match data_source {
            DataSource::Tse => Some(require_column(header, &layout.status, path)?),
            DataSource::Twitter => find_column(header, &layout.status),
        };
        let res = ColumnIndexes {
            location: require_column(header, &layout.location, path)?,
            candidate: require_column(header, &layout.candidate, path)?,
            party: require_column(header, &layout.party, path)?,
            electoral_unit: require_column(header, &layout.electoral_unit, path)?,
            count: require_column(header, &layout.count, path)?,
            status,
        };
        debug!("ColumnIndexes::locate: {}: {:?}", simplify_file_name(path), res);
        Ok(res)
    }
}

/// Builds a vote record out of the decoded fields of a line.
pub fn make_record(
    fields: &[String],
    cols: &ColumnIndexes,
    layout: &TableLayout,
    path: &str,
    lineno: u64,
) -> VgeoResult<VoteRecord> {
    let get = |idx: usize| -> VgeoResult<String> {
        fields
            .get(idx)
            .map(|s| s.trim().to_string())
            .context(LineTooShortSnafu { path, lineno })
    };
    let location = get(cols.location)?;
    let candidate = get(cols.candidate)?;
    if location.is_empty() || candidate.is_empty() {
        whatever!(
            "{}:{}: the location and the candidate cannot be empty",
            simplify_file_name(path),
            lineno
        );
    }
    let count = parse_count(&get(cols.count)?, path, lineno)?;
    let status = match cols.status {
        Some(idx) => Some(get(idx)?),
        None => None,
    };
    let elected_status = match status {
        Some(s) if s == layout.elected_label => ElectedStatus::Elected,
        _ => ElectedStatus::NotElected,
    };
    Ok(VoteRecord {
        location,
        candidate,
        party: get(cols.party)?,
        electoral_unit: get(cols.electoral_unit)?,
        count,
        elected_status,
    })
}

/// Reads a count. Spreadsheets store integers as floats: `12.0` is accepted,
/// `12.5` and negative numbers are not.
pub fn parse_count(s: &str, path: &str, lineno: u64) -> VgeoResult<u64> {
    let s = s.trim();
    if let Ok(x) = s.parse::<u64>() {
        return Ok(x);
    }
    match s.parse::<f64>() {
        Ok(x) if x.is_finite() && x >= 0.0 && x.fract() == 0.0 => Ok(x as u64),
        _ => InvalidCountSnafu {
            path,
            lineno,
            content: s,
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_fields() {
        let s = decode_field(b"S\xe3o Paulo", Encoding::Latin1, "f.csv", 2).unwrap();
        assert_eq!(s, "São Paulo");
        assert!(decode_field(b"S\xe3o", Encoding::Utf8, "f.csv", 2).is_err());
    }

    #[test]
    fn columns_ignore_case() {
        let header: Vec<String> = vec!["\u{feff}NM_MUNICIPIO".to_string(), "qt".to_string()];
        assert_eq!(find_column(&header, "nm_municipio"), Some(0));
        assert_eq!(find_column(&header, "sg_ue"), None);
    }

    #[test]
    fn counts() {
        assert_eq!(parse_count(" 42 ", "f.csv", 2).unwrap(), 42);
        assert_eq!(parse_count("12.0", "f.csv", 2).unwrap(), 12);
        assert!(parse_count("12.5", "f.csv", 2).is_err());
        assert!(parse_count("-3", "f.csv", 2).is_err());
        assert!(parse_count("", "f.csv", 2).is_err());
    }
}
