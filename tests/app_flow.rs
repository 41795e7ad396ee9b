//! Drives `App` through keys against a scripted runtime.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use common::{ScriptedRuntime, container, key};
use dockhand::app::{App, Command, MenuItem, Overlay, ViewState};
use dockhand::config::Config;
use dockhand::docker::{
    BulkOperation, ContainerId, ContainerRuntime, ContainerStatus, RuntimeError,
};
use dockhand::services::NotificationLevel;

fn runtime() -> Arc<ScriptedRuntime> {
    Arc::new(ScriptedRuntime::new(vec![
        container("a1", ContainerStatus::Running),
        container("b2", ContainerStatus::Stopped),
    ]))
}

async fn press(app: &mut App, code: KeyCode) {
    app.dispatch_key(key(code)).await;
}

async fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c)).await;
    }
}

/// App already on the containers view with the list loaded.
async fn containers_view(rt: &Arc<ScriptedRuntime>) -> App {
    let mut app = App::new(rt.clone(), Config::default());
    app.run_command(Command::ProbeDaemon).await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.view, ViewState::Containers);
    app
}

fn ids(app: &App) -> Vec<String> {
    app.containers.iter().map(|c| c.id.to_string()).collect()
}

fn overlay_lines(app: &App) -> Vec<String> {
    match &app.overlay {
        Some(Overlay::Text { lines, .. }) => lines.clone(),
        other => panic!("expected a text overlay, got {other:?}"),
    }
}

async fn open_menu_item(app: &mut App, item: MenuItem) {
    app.menu_index = MenuItem::ALL.iter().position(|m| *m == item).unwrap();
    press(app, KeyCode::Enter).await;
}

// ── bulk operations ───────────────────────────────────────────────────

#[tokio::test]
async fn bulk_remove_reports_each_target_and_refreshes() {
    let rt = runtime();
    let mut app = containers_view(&rt).await;

    press(&mut app, KeyCode::Char(' ')).await;
    press(&mut app, KeyCode::Char('j')).await;
    press(&mut app, KeyCode::Char(' ')).await;
    press(&mut app, KeyCode::Char('d')).await;

    assert_eq!(rt.calls_to("rm"), vec!["rm a1", "rm b2"]);
    assert_eq!(ids(&app), vec!["a1"]);

    let lines = overlay_lines(&app);
    assert!(lines[0].starts_with("✗ a1"), "{lines:?}");
    assert!(lines[0].contains("container is running"));
    assert_eq!(lines[1], "✓ b2  remove");

    let notice = app.notice.as_ref().unwrap();
    assert_eq!(notice.level, NotificationLevel::Error);
    assert_eq!(notice.message, "1 of 2 containers failed to remove");
    assert!(!app.progress.is_active());
}

#[tokio::test]
async fn bulk_success_calls_once_per_id_and_clears_marks() {
    let rt = runtime();
    let mut app = containers_view(&rt).await;

    press(&mut app, KeyCode::Char('a')).await;
    press(&mut app, KeyCode::Char('x')).await;

    assert_eq!(rt.calls_to("stop"), vec!["stop a1", "stop b2"]);
    assert!(app.selection.marked().is_empty());
    assert!(
        app.containers
            .iter()
            .all(|c| c.status == ContainerStatus::Exited)
    );
    assert_eq!(
        app.notice.as_ref().map(|n| n.level),
        Some(NotificationLevel::Success)
    );
}

#[tokio::test]
async fn bulk_result_is_ok_only_when_every_target_succeeds() {
    let rt = runtime();
    let ids = [ContainerId::new("a1"), ContainerId::new("missing")];

    let failure = rt
        .perform_bulk_operation(&ids, BulkOperation::Start)
        .await
        .unwrap_err();
    assert_eq!(failure.report.outcomes.len(), 2);
    assert!(failure.report.outcomes[0].result.is_ok());
    assert!(matches!(
        failure.report.outcomes[1].result,
        Err(RuntimeError::NotFound(_))
    ));

    let report = rt
        .perform_bulk_operation(&ids[..1], BulkOperation::Start)
        .await
        .unwrap();
    assert!(report.all_succeeded());
    assert_eq!(rt.calls_to("start"), vec!["start a1", "start missing", "start a1"]);
}

#[tokio::test]
async fn stopping_twice_succeeds() {
    let rt = runtime();
    let id = ContainerId::new("a1");
    rt.stop_container(&id).await.unwrap();
    rt.stop_container(&id).await.unwrap();

    let listed = rt.list_containers().await.unwrap();
    let a1 = listed.iter().find(|c| c.id == id).unwrap();
    assert_eq!(a1.status, ContainerStatus::Exited);
    assert!(!a1.status.is_running());
}

#[tokio::test]
async fn stats_for_unknown_container_is_an_error() {
    let rt = runtime();
    let err = rt
        .container_stats(&ContainerId::new("x"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

// ── selection across refreshes ────────────────────────────────────────

#[tokio::test]
async fn cursor_is_clamped_after_refresh() {
    let rt = runtime();
    let mut app = containers_view(&rt).await;

    press(&mut app, KeyCode::Char('G')).await;
    press(&mut app, KeyCode::Char('a')).await;
    assert_eq!(app.selection.cursor(), Some(1));

    rt.remove_container(&ContainerId::new("b2")).await.unwrap();
    press(&mut app, KeyCode::Char('R')).await;
    assert_eq!(app.selection.cursor(), Some(0));
    assert!(app.selection.marked().iter().all(|&i| i < app.containers.len()));

    rt.stop_container(&ContainerId::new("a1")).await.unwrap();
    rt.remove_container(&ContainerId::new("a1")).await.unwrap();
    press(&mut app, KeyCode::Char('R')).await;
    assert!(app.containers.is_empty());
    assert_eq!(app.selection.cursor(), None);
    assert!(app.selection.marked().is_empty());
}

#[tokio::test]
async fn search_filters_and_empty_query_clears() {
    let rt = runtime();
    let mut app = containers_view(&rt).await;

    press(&mut app, KeyCode::Char('/')).await;
    type_text(&mut app, "b2").await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(ids(&app), vec!["b2"]);
    assert_eq!(app.filter.as_deref(), Some("b2"));

    press(&mut app, KeyCode::Char('/')).await;
    press(&mut app, KeyCode::Backspace).await;
    press(&mut app, KeyCode::Backspace).await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(ids(&app), vec!["a1", "b2"]);
    assert_eq!(app.filter, None);
}

// ── navigation ────────────────────────────────────────────────────────

#[tokio::test]
async fn back_walks_one_level_at_a_time() {
    let rt = runtime();
    let mut app = containers_view(&rt).await;

    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.view, ViewState::Details);
    assert_eq!(
        app.details.as_ref().and_then(|d| d.get("Name")),
        Some("svc-a1")
    );

    press(&mut app, KeyCode::Char('l')).await;
    assert_eq!(app.view, ViewState::Logs);
    assert_eq!(app.logs.len(), 3);

    press(&mut app, KeyCode::Esc).await;
    assert_eq!(app.view, ViewState::Details);

    rt.remove_container(&ContainerId::new("b2")).await.unwrap();
    let listings = rt.calls_to("ps").len();
    press(&mut app, KeyCode::Char('b')).await;
    assert_eq!(app.view, ViewState::Containers);
    assert_eq!(rt.calls_to("ps").len(), listings + 1);
    assert_eq!(ids(&app), vec!["a1"]);

    press(&mut app, KeyCode::Backspace).await;
    assert_eq!(app.view, ViewState::Main);
}

#[tokio::test]
async fn stats_view_schedules_its_own_refresh() {
    let rt = runtime();
    let mut app = containers_view(&rt).await;

    press(&mut app, KeyCode::Char('t')).await;
    assert_eq!(app.view, ViewState::Stats);
    assert_eq!(app.stats.as_ref().map(|s| s.pids), Some(7));

    let later = Instant::now() + Duration::from_millis(app.config.stats_refresh_ms);
    let next = app.tick(later);
    assert!(matches!(next, Some(Command::LoadStats(ref c)) if c.id.as_str() == "a1"));
}

#[tokio::test]
async fn removed_focus_returns_to_list() {
    let rt = runtime();
    let mut app = containers_view(&rt).await;

    press(&mut app, KeyCode::Char('j')).await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.view, ViewState::Details);

    press(&mut app, KeyCode::Char('d')).await;
    assert_eq!(app.view, ViewState::Containers);
    assert!(app.focused.is_none());
    assert_eq!(ids(&app), vec!["a1"]);
}

#[tokio::test]
async fn reloading_details_of_removed_container_returns_to_list() {
    let rt = runtime();
    let mut app = containers_view(&rt).await;

    press(&mut app, KeyCode::Char('j')).await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.view, ViewState::Details);

    rt.remove_container(&ContainerId::new("b2")).await.unwrap();
    press(&mut app, KeyCode::Char('R')).await;

    assert_eq!(app.view, ViewState::Containers);
    assert!(app.focused.is_none());
    assert_eq!(ids(&app), vec!["a1"]);
    let notice = app.notice.as_ref().unwrap();
    assert_eq!(notice.level, NotificationLevel::Warning);
    assert_eq!(notice.message, "svc-b2 no longer exists");
}

// ── daemon gate ───────────────────────────────────────────────────────

#[tokio::test]
async fn unavailable_runtime_short_circuits_until_reprobed() {
    let rt = runtime();
    let mut app = containers_view(&rt).await;

    rt.set_down(true);
    press(&mut app, KeyCode::Char('R')).await;
    assert!(app.daemon.is_unavailable());

    let before = rt.calls().len();
    press(&mut app, KeyCode::Char('x')).await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(rt.calls().len(), before);
    assert_eq!(
        app.notice.as_ref().map(|n| n.level),
        Some(NotificationLevel::Warning)
    );

    rt.set_down(false);
    press(&mut app, KeyCode::Char('R')).await;
    assert!(!app.daemon.is_unavailable());
    let calls = rt.calls();
    assert_eq!(&calls[calls.len() - 2..], ["version -", "ps -a"]);
}

// ── menu actions ──────────────────────────────────────────────────────

#[tokio::test]
async fn create_postgres_from_menu() {
    let rt = runtime();
    let mut app = App::new(rt.clone(), Config::default());

    open_menu_item(&mut app, MenuItem::CreatePostgres).await;
    type_text(&mut app, "orders:5440").await;
    press(&mut app, KeyCode::Enter).await;

    assert!(rt.ids().contains(&"pg-orders".to_string()));
    assert!(app.containers.iter().any(|c| c.name == "orders"));
    let notice = app.notice.as_ref().unwrap();
    assert_eq!(notice.level, NotificationLevel::Success);
    assert!(notice.message.starts_with("Created orders"));
}

#[tokio::test]
async fn cleanup_runs_only_after_yes() {
    let rt = runtime();
    let mut app = App::new(rt.clone(), Config::default());

    open_menu_item(&mut app, MenuItem::Cleanup).await;
    press(&mut app, KeyCode::Char('n')).await;
    assert!(rt.calls_to("prune").is_empty());

    open_menu_item(&mut app, MenuItem::Cleanup).await;
    press(&mut app, KeyCode::Char('y')).await;
    assert_eq!(rt.calls_to("prune").len(), 1);
    assert_eq!(rt.ids(), vec!["a1"]);
}

#[tokio::test]
async fn generated_env_covers_running_containers() {
    let rt = runtime();
    let mut app = App::new(rt.clone(), Config::default());

    open_menu_item(&mut app, MenuItem::GenerateEnv).await;
    let body = overlay_lines(&app).join("\n");
    assert!(body.contains("SVC_A1_HOST=localhost"));
    assert!(body.contains("SVC_A1_URL=postgresql://localhost:542"));
    assert!(!body.contains("SVC_B2"));
}

#[tokio::test]
async fn generated_compose_names_every_service() {
    let rt = runtime();
    let mut app = App::new(rt.clone(), Config::default());

    open_menu_item(&mut app, MenuItem::GenerateCompose).await;
    let body = overlay_lines(&app).join("\n");
    let doc: serde_yaml::Value = serde_yaml::from_str(&body).unwrap();
    let services = doc["services"].as_mapping().unwrap();
    let names: Vec<&str> = services.keys().filter_map(|k| k.as_str()).collect();
    assert_eq!(names, vec!["svc-a1", "svc-b2"]);
}

#[tokio::test]
async fn exec_output_is_shown() {
    let rt = runtime();
    let mut app = containers_view(&rt).await;

    press(&mut app, KeyCode::Char('e')).await;
    type_text(&mut app, "ls -la").await;
    press(&mut app, KeyCode::Enter).await;

    assert_eq!(rt.calls_to("exec"), vec!["exec a1"]);
    assert!(overlay_lines(&app).contains(&"ok".to_string()));
}
