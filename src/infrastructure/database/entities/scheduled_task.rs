// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scheduled_tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub theme_id: String,
    pub mode: String,
    pub start_page: i32,
    pub end_page: i32,
    pub schedule_type: String,
    pub schedule_value: String,
    pub enabled: bool,
    pub last_run: Option<ChronoDateTimeWithTimeZone>,
    pub next_run: Option<ChronoDateTimeWithTimeZone>,
    pub run_count: i32,
    pub created_at: ChronoDateTimeWithTimeZone,
    pub updated_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
