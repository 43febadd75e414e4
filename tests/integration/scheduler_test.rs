// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_test_app_no_worker;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::{ActiveModelTrait, Set};
use themecrawl::domain::models::crawl_target::{CrawlMode, CrawlTarget};
use themecrawl::domain::models::schedule::Schedule;
use themecrawl::domain::models::task::TaskStatus;
use themecrawl::infrastructure::database::entities::scheduled_task as scheduled_entity;
use themecrawl::queue::scheduler::ScheduledTaskDraft;
use uuid::Uuid;

fn hourly(name: &str) -> ScheduledTaskDraft {
    ScheduledTaskDraft {
        name: name.to_string(),
        target: CrawlTarget {
            theme_id: "36".to_string(),
            mode: CrawlMode::Normal,
            start_page: 1,
            end_page: 2,
        },
        schedule: Schedule::Interval { minutes: 60 },
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}

#[tokio::test]
async fn test_due_definition_spawns_task_and_reschedules() {
    let app = create_test_app_no_worker().await;
    let scheduler = &app.ctx.scheduler;

    let definition = scheduler.create(hourly("hourly"), true).await.unwrap();
    let next_run = definition.next_run.unwrap();

    // 未到期时不派生
    let report = scheduler.tick(now()).await.unwrap();
    assert!(report.spawned.is_empty());

    let tick_at = next_run + Duration::minutes(1);
    let report = scheduler.tick(tick_at).await.unwrap();
    assert_eq!(report.spawned.len(), 1);
    assert!(report.skipped.is_empty());

    let task = app.ctx.store.get_task(report.spawned[0]).await.unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.scheduled_task_id, Some(definition.id));
    assert_eq!(task.theme_id, "36");
    assert_eq!((task.start_page, task.end_page), (1, 2));
    assert_eq!(task.proxy, None);
    assert_eq!(app.ctx.queue.len(), 1);

    let updated = scheduler.get(definition.id).await.unwrap();
    assert_eq!(updated.run_count, 1);
    assert_eq!(updated.last_run.unwrap().timestamp(), tick_at.timestamp());
    assert_eq!(
        updated.next_run.unwrap().timestamp(),
        (tick_at + Duration::minutes(60)).timestamp()
    );

    // 同一时刻再次 tick 不会重复派生
    let report = scheduler.tick(tick_at).await.unwrap();
    assert!(report.spawned.is_empty());
}

#[tokio::test]
async fn test_spawned_task_copies_current_proxy() {
    let app = create_test_app_no_worker().await;
    let scheduler = &app.ctx.scheduler;

    app.ctx
        .proxy_store
        .set(true, "socks5://127.0.0.1:1080")
        .await
        .unwrap();
    let definition = scheduler.create(hourly("proxied"), true).await.unwrap();

    let report = scheduler
        .tick(definition.next_run.unwrap() + Duration::seconds(1))
        .await
        .unwrap();
    let task = app.ctx.store.get_task(report.spawned[0]).await.unwrap();
    assert_eq!(task.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
}

#[tokio::test]
async fn test_disabled_definitions_are_ignored() {
    let app = create_test_app_no_worker().await;
    let scheduler = &app.ctx.scheduler;

    let definition = scheduler.create(hourly("paused"), false).await.unwrap();
    assert!(definition.next_run.is_none());

    let report = scheduler.tick(now() + Duration::days(30)).await.unwrap();
    assert!(report.spawned.is_empty());
    assert!(app.ctx.store.list_tasks().await.unwrap().is_empty());

    // 启用时从当前时间重新计算，不补跑
    let before = now();
    let enabled = scheduler.set_enabled(definition.id, true).await.unwrap();
    let next_run = enabled.next_run.unwrap();
    assert!(next_run > before);
    assert!(next_run <= now() + Duration::minutes(60));
    assert_eq!(enabled.run_count, 0);

    let disabled = scheduler.set_enabled(definition.id, false).await.unwrap();
    assert!(disabled.next_run.is_none());
}

#[tokio::test]
async fn test_corrupted_definition_is_skipped() {
    let app = create_test_app_no_worker().await;
    let scheduler = &app.ctx.scheduler;

    let healthy = scheduler.create(hourly("healthy"), true).await.unwrap();

    let corrupted_id = Uuid::new_v4();
    let stamp = now();
    scheduled_entity::ActiveModel {
        id: Set(corrupted_id),
        name: Set("broken".to_string()),
        theme_id: Set("36".to_string()),
        mode: Set("1".to_string()),
        start_page: Set(1),
        end_page: Set(1),
        schedule_type: Set("daily".to_string()),
        schedule_value: Set("99:99".to_string()),
        enabled: Set(true),
        last_run: Set(None),
        next_run: Set(Some(stamp - Duration::minutes(5))),
        run_count: Set(0),
        created_at: Set(stamp),
        updated_at: Set(stamp),
    }
    .insert(&app.db)
    .await
    .unwrap();

    let report = scheduler
        .tick(healthy.next_run.unwrap() + Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(report.spawned.len(), 1);
    assert_eq!(report.skipped, vec![corrupted_id]);

    // 列表跳过无法解析的记录
    let listed = scheduler.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, healthy.id);

    assert!(app
        .ctx
        .log_sink
        .recent(10)
        .iter()
        .any(|line| line.contains("ERROR: ") && line.contains(&corrupted_id.to_string())));
}

#[tokio::test]
async fn test_unknown_theme_still_advances_next_run() {
    let app = create_test_app_no_worker().await;
    let scheduler = &app.ctx.scheduler;

    let definition = scheduler.create(hourly("orphan"), true).await.unwrap();
    let stamp = now();
    let model = scheduled_entity::ActiveModel {
        id: Set(definition.id),
        theme_id: Set("999".to_string()),
        updated_at: Set(stamp),
        ..Default::default()
    };
    model.update(&app.db).await.unwrap();

    let tick_at = definition.next_run.unwrap() + Duration::minutes(1);
    let report = scheduler.tick(tick_at).await.unwrap();
    assert!(report.spawned.is_empty());
    assert_eq!(report.skipped, vec![definition.id]);

    let updated = scheduler.get(definition.id).await.unwrap();
    assert_eq!(updated.run_count, 0);
    assert_eq!(
        updated.next_run.unwrap().timestamp(),
        (tick_at + Duration::minutes(60)).timestamp()
    );
}

#[tokio::test]
async fn test_missing_next_run_is_filled_on_tick() {
    let app = create_test_app_no_worker().await;
    let scheduler = &app.ctx.scheduler;

    let definition = scheduler.create(hourly("fresh"), true).await.unwrap();
    scheduled_entity::ActiveModel {
        id: Set(definition.id),
        next_run: Set(None),
        ..Default::default()
    }
    .update(&app.db)
    .await
    .unwrap();

    let tick_at = now();
    let report = scheduler.tick(tick_at).await.unwrap();
    assert!(report.spawned.is_empty());

    let updated = scheduler.get(definition.id).await.unwrap();
    assert_eq!(
        updated.next_run.unwrap().timestamp(),
        (tick_at + Duration::minutes(60)).timestamp()
    );
}

#[tokio::test]
async fn test_update_recomputes_next_run() {
    let app = create_test_app_no_worker().await;
    let scheduler = &app.ctx.scheduler;

    let definition = scheduler.create(hourly("editable"), true).await.unwrap();

    let mut draft = hourly("every five minutes");
    draft.schedule = Schedule::Interval { minutes: 5 };
    let before = now();
    let updated = scheduler.update(definition.id, draft, None).await.unwrap();

    assert_eq!(updated.name, "every five minutes");
    assert!(updated.enabled);
    let next_run = updated.next_run.unwrap();
    assert!(next_run > before);
    assert!(next_run <= now() + Duration::minutes(5));

    let persisted = scheduler.get(definition.id).await.unwrap();
    assert_eq!(persisted.schedule, Schedule::Interval { minutes: 5 });
}
