use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;

use crate::api::rest::routes;
use crate::config::DormitoryConfig;
use crate::contract::client::DormitoryApi;
use crate::domain::ports::PasswordHasher;
use crate::domain::service::AppServices;
use crate::gateways::local::DormitoryLocalClient;
use crate::infra::password::Argon2PasswordHasher;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::{
    OrmAssignmentsRepository, OrmRepairsRepository, OrmRoomsRepository, OrmUsersRepository,
};

/// Services wired to the SeaORM repositories.
pub type ConcreteAppServices = AppServices<
    OrmUsersRepository,
    OrmRoomsRepository,
    OrmAssignmentsRepository,
    OrmRepairsRepository,
>;

/// Entry point for hosts: owns the wired services and exposes the REST
/// router and the in-process client.
pub struct Dormitory {
    services: Arc<ConcreteAppServices>,
    config: DormitoryConfig,
}

impl Dormitory {
    pub fn new(
        db: DatabaseConnection,
        config: DormitoryConfig,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        let services = AppServices::new(
            OrmUsersRepository,
            OrmRoomsRepository,
            OrmAssignmentsRepository,
            OrmRepairsRepository,
            hasher,
            db,
            (&config).into(),
        );
        Self {
            services: Arc::new(services),
            config,
        }
    }

    /// Run migrations, wire the services with the default Argon2 hasher, and
    /// seed demo data when the config asks for it.
    pub async fn init(db: DatabaseConnection, config: DormitoryConfig) -> anyhow::Result<Self> {
        migrate(&db).await?;
        let module = Self::new(db, config, Arc::new(Argon2PasswordHasher::new()));
        if module.config.seed_demo_data {
            module.seed().await?;
        }
        tracing::info!(module = "dormitory", "Module initialized");
        Ok(module)
    }

    pub fn config(&self) -> &DormitoryConfig {
        &self.config
    }

    pub fn services(&self) -> Arc<ConcreteAppServices> {
        Arc::clone(&self.services)
    }

    pub fn client(&self) -> Arc<dyn DormitoryApi> {
        Arc::new(DormitoryLocalClient::new(self.services()))
    }

    pub fn register_rest(&self, router: Router) -> anyhow::Result<Router> {
        routes::register_routes(router, self.services())
    }

    /// Returns `false` when the database already had users and nothing was written.
    pub async fn seed(&self) -> anyhow::Result<bool> {
        crate::seed::seed_demo_data(&self.services)
            .await
            .context("failed to seed demo data")
    }
}

/// Bring the schema up to date.
pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
    tracing::info!("Running dormitory migrations");
    Migrator::up(db, None)
        .await
        .context("dormitory migrations failed")?;
    Ok(())
}
