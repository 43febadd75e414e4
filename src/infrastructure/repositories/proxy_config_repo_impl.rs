// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::proxy_config::ProxyConfig;
use crate::domain::repositories::proxy_config_repository::ProxyConfigRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::proxy_config as proxy_entity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use std::sync::Arc;

const SINGLETON_ID: i32 = 1;

/// 代理配置仓库实现
#[derive(Clone)]
pub struct ProxyConfigRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ProxyConfigRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProxyConfigRepository for ProxyConfigRepositoryImpl {
    async fn load(&self) -> Result<Option<ProxyConfig>, RepositoryError> {
        let model = proxy_entity::Entity::find_by_id(SINGLETON_ID)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(|m| ProxyConfig {
            enabled: m.enabled,
            proxy_url: m.proxy_url,
        }))
    }

    async fn save(&self, config: &ProxyConfig) -> Result<(), RepositoryError> {
        let model = proxy_entity::ActiveModel {
            id: Set(SINGLETON_ID),
            enabled: Set(config.enabled),
            proxy_url: Set(config.proxy_url.clone()),
            updated_at: Set(Utc::now().into()),
        };

        proxy_entity::Entity::insert(model)
            .on_conflict(
                OnConflict::column(proxy_entity::Column::Id)
                    .update_columns([
                        proxy_entity::Column::Enabled,
                        proxy_entity::Column::ProxyUrl,
                        proxy_entity::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }
}
