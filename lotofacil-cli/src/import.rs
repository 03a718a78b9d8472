use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::{info, warn};

use lotofacil_core::extract::RawCell;

pub struct ImportResult {
    pub total_records: u32,
    pub errors: u32,
    /// Une entrée par ligne lue, y compris les lignes illisibles (vides), pour
    /// que les index restent ceux du fichier.
    pub rows: Vec<Vec<RawCell>>,
}

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Classeur (xlsx, xls, ods…) selon l'extension, CSV sinon.
pub fn import_file(path: &Path, delimiter: u8) -> Result<ImportResult> {
    if is_spreadsheet(path) {
        import_spreadsheet(path)
    } else {
        import_csv(path, delimiter)
    }
}

/// Lit la première feuille du classeur.
pub fn import_spreadsheet(path: &Path) -> Result<ImportResult> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Impossible d'ouvrir le classeur {:?}", path))?;
    let range = workbook
        .worksheet_range_at(0)
        .with_context(|| format!("Aucune feuille dans {:?}", path))?
        .with_context(|| format!("Impossible de lire la première feuille de {:?}", path))?;
    info!(rows = range.height(), cols = range.width(), "feuille chargée");
    Ok(read_sheet_rows(&range))
}

fn cell_from_sheet(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::Int(n) => RawCell::Integer(*n),
        Data::Float(f) => RawCell::Float(*f),
        Data::String(s) => RawCell::from_text(s),
        other => RawCell::from_text(&other.to_string()),
    }
}

/// La première ligne est un en-tête. Les cellules numériques gardent leur type.
pub fn read_sheet_rows(range: &Range<Data>) -> ImportResult {
    let rows: Vec<Vec<RawCell>> = range
        .rows()
        .skip(1)
        .map(|row| row.iter().map(cell_from_sheet).collect())
        .collect();
    ImportResult {
        total_records: rows.len() as u32,
        errors: 0,
        rows,
    }
}

pub fn import_csv(path: &Path, delimiter: u8) -> Result<ImportResult> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    Ok(read_records(file, delimiter))
}

/// La première ligne est un en-tête. Toutes les cellules sont lues comme du texte.
pub fn read_records<R: Read>(reader: R, delimiter: u8) -> ImportResult {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let mut result = ImportResult {
        total_records: 0,
        errors: 0,
        rows: Vec::new(),
    };

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => {
                result.rows.push(record.iter().map(RawCell::from_text).collect());
            }
            Err(e) => {
                warn!("Erreur lecture ligne {}: {}", result.total_records, e);
                result.errors += 1;
                result.rows.push(Vec::new());
            }
        }
    }

    result
}
