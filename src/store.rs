use std::fs;
use std::io::Write;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::{Builder, NamedTempFile};

use crate::batch::BatchTables;
use crate::domain::TableKind;
use crate::error::BgcError;
use crate::table::Table;

/// Output directory holding one CSV file per table kind.
#[derive(Debug, Clone)]
pub struct TableStore {
    root: Utf8PathBuf,
}

impl TableStore {
    pub fn new(root: &Path) -> Result<Self, BgcError> {
        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|err| BgcError::Filesystem(err.to_string()))?
                .join(root)
        };
        let root = Utf8PathBuf::from_path_buf(root)
            .map_err(|path| BgcError::Filesystem(format!("invalid output path {}", path.display())))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn table_path(&self, kind: TableKind) -> Utf8PathBuf {
        self.root.join(kind.file_name())
    }

    pub fn ensure_root(&self) -> Result<(), BgcError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| BgcError::Filesystem(err.to_string()))
    }

    /// Writes `file_name` through a temp file in the root and renames it into
    /// place, so readers never see a half-written file.
    pub fn write_with<T, F>(
        &self,
        file_name: &str,
        write: F,
    ) -> Result<(Utf8PathBuf, T), BgcError>
    where
        F: FnOnce(&mut NamedTempFile) -> Result<T, BgcError>,
    {
        self.ensure_root()?;
        let path = self.root.join(file_name);
        let write_error = |message: String| BgcError::TableWrite {
            table: file_name.to_string(),
            message,
        };

        let mut temp = Builder::new()
            .prefix(&format!(".{file_name}"))
            .suffix(".tmp")
            .tempfile_in(self.root.as_std_path())
            .map_err(|err| write_error(err.to_string()))?;
        let value = write(&mut temp)?;
        temp.flush().map_err(|err| write_error(err.to_string()))?;
        temp.persist(path.as_std_path())
            .map_err(|err| write_error(err.to_string()))?;
        Ok((path, value))
    }

    pub fn write_named(&self, file_name: &str, table: &Table) -> Result<Utf8PathBuf, BgcError> {
        let (path, ()) = self.write_with(file_name, |file| {
            table.write_csv(file).map_err(|err| BgcError::TableWrite {
                table: file_name.to_string(),
                message: err.to_string(),
            })
        })?;
        Ok(path)
    }

    pub fn write_table(&self, kind: TableKind, table: &Table) -> Result<Utf8PathBuf, BgcError> {
        self.write_named(&kind.file_name(), table)
    }

    pub fn write_all(&self, tables: &BatchTables) -> Result<Vec<Utf8PathBuf>, BgcError> {
        tables
            .iter()
            .map(|(kind, table)| self.write_table(kind, table))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let temp = tempfile::tempdir().unwrap();
        let store = TableStore::new(temp.path()).unwrap();
        assert!(
            store
                .table_path(TableKind::MibigEntries)
                .ends_with("mibig_entries.csv")
        );
        assert!(
            store
                .table_path(TableKind::ClusterBlast)
                .ends_with("cluster_blast.csv")
        );
    }
}
