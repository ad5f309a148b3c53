use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::vgeo::config_reader::TableLayout;
use crate::vgeo::io_common::{make_record, ColumnIndexes};
use crate::vgeo::*;

/// Reads a vote table from a worksheet. The first row holds the names of the
/// columns.
pub fn read_excel_votes(
    path: &str,
    layout: &TableLayout,
    data_source: DataSource,
) -> VgeoResult<Vec<VoteRecord>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match &layout.excel_worksheet_name {
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut iter = wrange.rows();
    let header_row = iter.next().context(EmptyExcelSnafu { path })?;
    let header: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| read_cell(cell, path, 1, idx))
        .collect::<VgeoResult<Vec<String>>>()?;
    debug!("read_excel_votes: header: {:?}", header);
    let cols = ColumnIndexes::locate(&header, layout, data_source, path)?;

    let mut res: Vec<VoteRecord> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = idx as u64 + 2;
        if row.iter().all(|c| matches!(c, DataType::Empty)) {
            debug!("read_excel_votes: skipping empty row {}", lineno);
            continue;
        }
        let fields: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, cell)| read_cell(cell, path, lineno, col))
            .collect::<VgeoResult<Vec<String>>>()?;
        res.push(make_record(&fields, &cols, layout, path, lineno)?);
    }
    info!("read_excel_votes: read {} rows from {}", res.len(), path);
    Ok(res)
}

fn read_cell(cell: &DataType, path: &str, lineno: u64, column: usize) -> VgeoResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        DataType::Empty => Ok("".to_string()),
        _ => ExcelWrongCellTypeSnafu {
            path,
            lineno,
            column,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vgeo::config_reader::FileSource;
    use rust_xlsxwriter::Workbook;

    const HEADER: [&str; 6] = [
        "nm_municipio",
        "nm_urna_candidato",
        "sg_partido",
        "sg_ue",
        "qt_votos_nom_validos",
        "ds_sit_totalizacao",
    ];

    fn votes_workbook(dir: &std::path::Path) -> String {
        let rows = [
            ("Santos", "ANA", "P1", "SP", 120.0, "Eleito"),
            ("Campinas", "ANA", "P1", "SP", 30.0, "Eleito"),
            ("Santos", "BRUNO", "P2", "SP", 7.0, "Suplente"),
        ];
        let mut workbook = Workbook::new();
        let notes = workbook.add_worksheet();
        notes.set_name("Notas").unwrap();
        notes.write_string(0, 0, "generated").unwrap();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Votos").unwrap();
        for (col, h) in HEADER.iter().enumerate() {
            sheet.write_string(0, col as u16, *h).unwrap();
        }
        for (idx, (loc, cand, party, unit, count, status)) in rows.iter().enumerate() {
            let r = idx as u32 + 1;
            sheet.write_string(r, 0, *loc).unwrap();
            sheet.write_string(r, 1, *cand).unwrap();
            sheet.write_string(r, 2, *party).unwrap();
            sheet.write_string(r, 3, *unit).unwrap();
            sheet.write_number(r, 4, *count).unwrap();
            sheet.write_string(r, 5, *status).unwrap();
        }
        let path = dir.join("votes.xlsx");
        workbook.save(&path).unwrap();
        path.display().to_string()
    }

    fn layout(worksheet: Option<&str>) -> TableLayout {
        FileSource {
            data_source: "tse".to_string(),
            provider: Some("xlsx".to_string()),
            file_path: None,
            separator: None,
            encoding: None,
            excel_worksheet_name: worksheet.map(|s| s.to_string()),
            columns: None,
            elected_label: None,
            expected_output: None,
        }
        .layout(DataSource::Tse)
        .unwrap()
    }

    #[test]
    fn named_worksheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = votes_workbook(dir.path());
        let rows = read_excel_votes(&path, &layout(Some("Votos")), DataSource::Tse).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].location, "Santos");
        assert_eq!(rows[0].count, 120);
        assert_eq!(rows[0].elected_status, ElectedStatus::Elected);
        assert_eq!(rows[2].candidate, "BRUNO");
        assert_eq!(rows[2].elected_status, ElectedStatus::NotElected);
    }

    #[test]
    fn first_worksheet_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = votes_workbook(dir.path());
        // The first sheet has no vote columns.
        let res = read_excel_votes(&path, &layout(None), DataSource::Tse);
        assert!(matches!(res, Err(VgeoError::MissingColumn { .. })));
    }

    #[test]
    fn missing_worksheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = votes_workbook(dir.path());
        let res = read_excel_votes(&path, &layout(Some("Planilha1")), DataSource::Tse);
        assert!(matches!(res, Err(VgeoError::MissingWorksheet { .. })));
    }
}
