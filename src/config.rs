use std::path::PathBuf;

use anyhow::bail;

use crate::csv_store::CsvStore;
use crate::db::PgStore;
use crate::store::EntityStore;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Postgres { url: String, max_connections: u32 },
    Csv { dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source: Source,
}

impl Config {
    /// A CSV directory wins over a database URL, so a `DATABASE_URL` left in
    /// the environment does not get in the way of reading local files.
    pub fn resolve(
        database_url: Option<String>,
        csv_dir: Option<PathBuf>,
        max_connections: u32,
    ) -> anyhow::Result<Self> {
        let source = match (csv_dir, database_url) {
            (Some(dir), _) => Source::Csv { dir },
            (None, Some(url)) if !url.trim().is_empty() => Source::Postgres {
                url,
                max_connections: max_connections.max(1),
            },
            _ => bail!("no data source: set DATABASE_URL or pass --csv-dir"),
        };
        Ok(Self { source })
    }

    pub async fn open_store(&self) -> anyhow::Result<Box<dyn EntityStore>> {
        match &self.source {
            Source::Postgres {
                url,
                max_connections,
            } => Ok(Box::new(PgStore::connect(url, *max_connections).await?)),
            Source::Csv { dir } => {
                tracing::debug!(dir = %dir.display(), "reading class from csv files");
                Ok(Box::new(CsvStore::new(dir.clone())))
            }
        }
    }

    /// Commands that write need Postgres.
    pub async fn open_postgres(&self) -> anyhow::Result<PgStore> {
        match &self.source {
            Source::Postgres {
                url,
                max_connections,
            } => PgStore::connect(url, *max_connections).await,
            Source::Csv { .. } => {
                bail!("this command writes to Postgres; set DATABASE_URL and drop --csv-dir")
            }
        }
    }
}
