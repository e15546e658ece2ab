//! The extractor seam and input handling shared by host languages.

use std::fs;
use std::path::{Path, PathBuf};

use ddlsync_schema::{Schema, SchemaBuilder, SchemaError, SchemaResult, TableBuilder};
use tracing::debug;

/// Turns source declarations of one host language into tables.
///
/// Implementors only provide [`extract_source`](Self::extract_source);
/// file and directory handling and model validation come for free.
pub trait SourceExtractor {
    /// File extension of source files, without the dot.
    fn extension(&self) -> &str;

    /// Extract the tables declared in `source`, in declaration order.
    /// `file` is used for error locations.
    fn extract_source(&self, source: &str, file: Option<&str>) -> SchemaResult<Vec<TableBuilder>>;

    /// Extract a schema from a source string.
    fn extract_str(&self, source: &str) -> SchemaResult<Schema> {
        build(self.extract_source(source, None)?)
    }

    /// Extract a schema from one file.
    fn extract_file(&self, path: &Path) -> SchemaResult<Schema> {
        build(file_tables(self, path)?)
    }

    /// Extract a schema from a file, or from every source file below a
    /// directory. Files are visited in path order.
    fn extract_path(&self, path: &Path) -> SchemaResult<Schema> {
        if !path.is_dir() {
            return self.extract_file(path);
        }
        let mut tables = Vec::new();
        for file in source_files(path, self.extension())? {
            tables.extend(file_tables(self, &file)?);
        }
        build(tables)
    }
}

fn file_tables<E: SourceExtractor + ?Sized>(
    extractor: &E,
    path: &Path,
) -> SchemaResult<Vec<TableBuilder>> {
    let source = read(path)?;
    let tables = extractor.extract_source(&source, Some(&path.display().to_string()))?;
    debug!(file = %path.display(), tables = tables.len(), "extracted file");
    Ok(tables)
}

fn build(tables: Vec<TableBuilder>) -> SchemaResult<Schema> {
    let mut schema = SchemaBuilder::new();
    for table in tables {
        if schema.has_table(table.name()) {
            return Err(SchemaError::validation(
                table.name(),
                "table is declared more than once",
            ));
        }
        schema.add_table(table);
    }
    schema.build()
}

fn read(path: &Path) -> SchemaResult<String> {
    fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Files with `extension` below `dir`, sorted by path.
pub(crate) fn source_files(dir: &Path, extension: &str) -> SchemaResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|source| SchemaError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        for entry in entries {
            let path = entry
                .map_err(|source| SchemaError::Io {
                    path: dir.display().to_string(),
                    source,
                })?
                .path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|e| e == extension) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
