use stash_config::StashConfig;
use stash_core::export::FormatRegistry;
use stash_db::export::FieldSettings;
use stash_db::service::StashService;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: StashService,
    pub config: StashConfig,
    pub settings: FieldSettings,
    pub registry: FormatRegistry,
}

impl AppContext {
    /// Open the configured database and resource directory.
    pub async fn init(config: StashConfig) -> anyhow::Result<Self> {
        let service = StashService::from_config(&config).await?;
        let settings = FieldSettings::from_config(&config);
        let registry = config.export.registry();
        tracing::debug!(
            database = %config.database.path,
            resources = %config.resources.root,
            cleanup_rules = config.cleanup.len(),
            forms = config.forms.len(),
            "application context ready"
        );
        Ok(Self {
            service,
            config,
            settings,
            registry,
        })
    }
}
