//! Opening a project for a data command
//!
//! Every data command discovers the project, configures logging, opens the
//! catalog database and syncs catalog files before answering.

use miette::Result;
use std::sync::Arc;

use crate::api::VariantSelector;
use crate::cli::helpers::store_report;
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::logging::{init_logging, resolve_level};
use crate::core::project::Project;
use crate::store::{CatalogStore, SqliteStore, SyncStats};

pub struct Workspace {
    pub project: Project,
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub selector: VariantSelector,
}

impl Workspace {
    /// Open the project and bring the database up to date
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let workspace = Self::open_without_sync(global)?;
        workspace.sync()?;
        Ok(workspace)
    }

    /// Open the project without importing catalog files
    pub fn open_without_sync(global: &GlobalOpts) -> Result<Self> {
        let project = match &global.project {
            Some(dir) => Project::discover_from(dir),
            None => Project::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;

        let config = project.config().map_err(|e| miette::miette!("{}", e))?;
        let level = resolve_level(global.log_level.as_deref(), &config.logging);
        init_logging(&level, config.logging.format).map_err(|e| miette::miette!("{}", e))?;

        let store = Arc::new(
            SqliteStore::open(&config.database_path(project.root())).map_err(store_report)?,
        );
        let dyn_store: Arc<dyn CatalogStore> = store.clone();
        let selector = VariantSelector::new(dyn_store, &config.cache);

        Ok(Self {
            project,
            config,
            store,
            selector,
        })
    }

    /// Import changed catalog files and drop snapshots they touch
    pub fn sync(&self) -> Result<SyncStats> {
        let stats = self
            .store
            .sync(&self.config.catalog_path(self.project.root()))
            .map_err(store_report)?;
        self.selector
            .index()
            .invalidate_many(&stats.templates_touched);
        Ok(stats)
    }
}
