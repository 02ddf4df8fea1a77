//! # CSV Templates
//!
//! Writes a bundle as three sibling files. For an output path of
//! `out/biospecimen.csv`:
//!
//! - `out/biospecimen_template.csv`: the data-entry header row.
//! - `out/biospecimen_dictionary.csv`: the column dictionary.
//! - `out/biospecimen_values.csv`: the value lists.

use std::path::{Path, PathBuf};

use crate::bundle::TemplateBundle;
use crate::error::TemplateError;
use crate::TemplateWriter;

/// Writes a [`TemplateBundle`] as three CSV files.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTemplateWriter;

impl CsvTemplateWriter {
    /// The template, dictionary and values paths derived from `output`.
    pub fn file_paths(output: &Path) -> [PathBuf; 3] {
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("template");
        let extension = output
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv");
        let sibling = |suffix: &str| output.with_file_name(format!("{stem}_{suffix}.{extension}"));
        [sibling("template"), sibling("dictionary"), sibling("values")]
    }
}

impl TemplateWriter for CsvTemplateWriter {
    fn write(&self, output: &Path, bundle: &TemplateBundle) -> Result<Vec<PathBuf>, TemplateError> {
        let [template, dictionary, values] = Self::file_paths(output);

        write_table(&template, &bundle.columns, std::iter::empty::<Vec<String>>())?;
        write_table(&dictionary, bundle.dictionary_header(), bundle.dictionary_rows())?;
        write_table(&values, bundle.values_header(), bundle.value_rows())?;

        tracing::info!(
            template = %template.display(),
            columns = bundle.columns.len(),
            "wrote CSV template"
        );
        Ok(vec![template, dictionary, values])
    }
}

fn write_table<H, R>(
    path: &Path,
    header: &[H],
    rows: impl Iterator<Item = R>,
) -> Result<(), TemplateError>
where
    H: AsRef<[u8]>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_path(path).map_err(|e| TemplateError::write(path, e))?;
    writer
        .write_record(header)
        .map_err(|e| TemplateError::write(path, e))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| TemplateError::write(path, e))?;
    }
    writer.flush().map_err(|e| TemplateError::write(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_append_suffix_before_extension() {
        let [t, d, v] = CsvTemplateWriter::file_paths(Path::new("/out/biospecimen.csv"));
        assert_eq!(t, PathBuf::from("/out/biospecimen_template.csv"));
        assert_eq!(d, PathBuf::from("/out/biospecimen_dictionary.csv"));
        assert_eq!(v, PathBuf::from("/out/biospecimen_values.csv"));
    }

    #[test]
    fn paths_default_to_csv_extension() {
        let [t, ..] = CsvTemplateWriter::file_paths(Path::new("/out/assay"));
        assert_eq!(t, PathBuf::from("/out/assay_template.csv"));
    }
}
