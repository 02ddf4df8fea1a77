//! # Workbook Templates
//!
//! Writes a bundle into a single `.xlsx` workbook with worksheets
//! `Template`, `Dictionary` and `Values`. Header rows are bold.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::bundle::TemplateBundle;
use crate::error::TemplateError;
use crate::TemplateWriter;

/// Worksheet names, in workbook order.
pub const SHEET_NAMES: [&str; 3] = ["Template", "Dictionary", "Values"];

/// Writes a [`TemplateBundle`] as a three-sheet workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookTemplateWriter;

impl TemplateWriter for WorkbookTemplateWriter {
    fn write(&self, output: &Path, bundle: &TemplateBundle) -> Result<Vec<PathBuf>, TemplateError> {
        build_workbook(bundle)
            .and_then(|mut workbook| workbook.save(output))
            .map_err(|e| TemplateError::write(output, e))?;

        tracing::info!(
            workbook = %output.display(),
            columns = bundle.columns.len(),
            "wrote workbook template"
        );
        Ok(vec![output.to_path_buf()])
    }
}

fn build_workbook(bundle: &TemplateBundle) -> Result<Workbook, XlsxError> {
    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();

    let [template, dictionary, values] = SHEET_NAMES;

    let sheet = workbook.add_worksheet();
    sheet.set_name(template)?;
    write_row(sheet, 0, &bundle.columns, Some(&header))?;

    let sheet = workbook.add_worksheet();
    sheet.set_name(dictionary)?;
    write_row(sheet, 0, bundle.dictionary_header(), Some(&header))?;
    for (index, row) in bundle.dictionary_rows().enumerate() {
        write_row(sheet, row_number(index + 1)?, &row, None)?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name(values)?;
    write_row(sheet, 0, bundle.values_header(), Some(&header))?;
    for (index, row) in bundle.value_rows().enumerate() {
        write_row(sheet, row_number(index + 1)?, &row, None)?;
    }

    Ok(workbook)
}

fn row_number(index: usize) -> Result<u32, XlsxError> {
    u32::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

fn write_row<S: AsRef<str>>(
    sheet: &mut Worksheet,
    row: u32,
    cells: &[S],
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    for (index, cell) in cells.iter().enumerate() {
        let col = u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)?;
        let text = cell.as_ref();
        if text.is_empty() {
            continue;
        }
        match format {
            Some(format) => sheet.write_string_with_format(row, col, text, format)?,
            None => sheet.write_string(row, col, text)?,
        };
    }
    Ok(())
}
