use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::info;

use growthlytics_core::analytics::{InputTables, TableSource};
use growthlytics_core::install::InstallOrigin;

use crate::error::IngestError;
use crate::ingest::{read_costs, read_installs, read_mapping, read_revenues};
use crate::schema::{install_schema, TableSchema, COSTS, MAPPING, REVENUES};

/// Reads the six input tables by fixed file name from one directory.
#[derive(Debug, Clone)]
pub struct CsvBackend {
    data_dir: PathBuf,
}

impl CsvBackend {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn open(&self, schema: &TableSchema) -> Result<File, IngestError> {
        let path = self.data_dir.join(schema.file_name);
        File::open(&path).map_err(|source| IngestError::Open {
            table: schema.name,
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load(&self) -> Result<InputTables, IngestError> {
        let mut tables = InputTables::default();
        for origin in InstallOrigin::ALL {
            let installs = read_installs(origin, self.open(install_schema(origin))?)?;
            info!(
                table = install_schema(origin).name,
                rows = installs.len(),
                "Loaded install table"
            );
            match origin {
                InstallOrigin::Google => tables.installs_google = installs,
                InstallOrigin::Rest => tables.installs_rest = installs,
                InstallOrigin::Organic => tables.installs_organic = installs,
            }
        }

        tables.mapping = read_mapping(self.open(&MAPPING)?)?;
        tables.costs = read_costs(self.open(&COSTS)?)?;
        tables.revenues = read_revenues(self.open(&REVENUES)?)?;
        info!(
            mapping = tables.mapping.len(),
            costs = tables.costs.len(),
            revenues = tables.revenues.len(),
            "Loaded ledger tables"
        );

        Ok(tables)
    }
}

impl TableSource for CsvBackend {
    fn read_tables(&self) -> anyhow::Result<InputTables> {
        Ok(self.load()?)
    }
}
