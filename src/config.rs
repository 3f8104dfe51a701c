// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    common::i18n::I18nStore,
    db::{
        initialize_collections, AccountRepository, ApplicationRepository, CollectionStore,
        ExclusionRepository, MemoryCollectionStore, OrderRepository, PgCollectionStore,
        ScheduleRepository,
    },
    services::{
        AccountService, ApplicationService, AuthService, CalendarService, ExclusionService,
        OrderService,
    },
};

/// Configuração lida do ambiente (.env incluso).
#[derive(Debug, Clone)]
pub struct Settings {
    // Sem DATABASE_URL, tudo fica em memória
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub default_admin: Option<(String, String)>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let default_admin = match (
            env::var("DEFAULT_ADMIN_USERNAME"),
            env::var("DEFAULT_ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) => Some((username, password)),
            _ => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            default_admin,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub account_service: AccountService,
    pub application_service: ApplicationService,
    pub exclusion_service: ExclusionService,
    pub calendar_service: CalendarService,
    pub order_service: OrderService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn CollectionStore> = match &settings.database_url {
            Some(database_url) => {
                let db_pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgCollectionStore::new(db_pool))
            }
            None => {
                tracing::warn!("DATABASE_URL ausente: usando armazenamento em memória.");
                Arc::new(MemoryCollectionStore::new())
            }
        };

        let created = initialize_collections(store.as_ref()).await?;
        if created > 0 {
            tracing::info!("✅ {} coleção(ões) inicializada(s).", created);
        }

        Ok(Self::from_store(store, settings.jwt_secret.clone()))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_store(store: Arc<dyn CollectionStore>, jwt_secret: String) -> Self {
        let accounts = AccountRepository::new(store.clone());
        let exclusions = ExclusionRepository::new(store.clone());
        let schedules = ScheduleRepository::new(store.clone());
        let applications = ApplicationRepository::new(store.clone());
        let orders = OrderRepository::new(store);

        Self {
            auth_service: AuthService::new(accounts.clone(), jwt_secret),
            account_service: AccountService::new(accounts.clone(), exclusions.clone()),
            application_service: ApplicationService::new(applications, accounts.clone()),
            exclusion_service: ExclusionService::new(exclusions.clone(), accounts.clone()),
            calendar_service: CalendarService::new(schedules, exclusions, accounts),
            order_service: OrderService::new(orders),
            i18n_store: Arc::new(I18nStore::new()),
        }
    }
}
