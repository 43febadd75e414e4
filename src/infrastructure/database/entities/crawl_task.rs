// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "crawl_tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub theme_id: String,
    pub mode: String,
    pub start_page: i32,
    pub end_page: i32,
    pub proxy: Option<String>,
    pub status: String,
    pub progress: i32,
    pub total_links: i32,
    pub found_links: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
    pub result_path: Option<String>,
    pub scheduled_task_id: Option<Uuid>,
    pub created_at: ChronoDateTimeWithTimeZone,
    pub start_time: Option<ChronoDateTimeWithTimeZone>,
    pub end_time: Option<ChronoDateTimeWithTimeZone>,
    pub updated_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
