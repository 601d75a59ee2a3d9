#![allow(clippy::unwrap_used)]
// End-to-end tests for the Panel facade using wiremock: connect,
// refresh pulses, undo round-trips, and bulk batches against a mocked
// backend.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use tokio::time::timeout;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use opsdeck_core::store::DataSource;
use opsdeck_core::table::{CellValue, Column, TableState};
use opsdeck_core::{
    Account, Entity, EntityId, MutationStatus, NotificationLevel, Panel, PanelConfig, run_bulk,
};

const FETCH_PATHS: [&str; 8] = [
    "/fetch_accounts",
    "/fetch_suspensions",
    "/fetch_codes",
    "/fetch_sessions",
    "/fetch_listings",
    "/fetch_discounts",
    "/fetch_access_grants",
    "/fetch_audit_log",
];

fn account_json(id: i64, username: &str) -> serde_json::Value {
    json!({
        "accountId": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "status": "Active",
        "roles": ["user"],
        "HWID": null,
        "registerDate": null,
        "registerIP": null,
        "subscription": null,
        "lastLogin": null,
        "lastIP": null,
        "lastEdit": null,
    })
}

/// Mock login plus empty payloads for every collection not in `except`.
async fn mount_baseline(server: &MockServer, except: &[&str]) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
    for fetch in FETCH_PATHS {
        if except.contains(&fetch) {
            continue;
        }
        Mock::given(method("GET"))
            .and(path(fetch))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(server)
            .await;
    }
}

async fn connect_panel(server: &MockServer) -> Panel {
    let base_url = Url::parse(&server.uri()).unwrap();
    let config = PanelConfig::new(base_url, "ops", SecretString::from("pw".to_owned()));
    let panel = Panel::new(config).unwrap();
    panel.connect().await.unwrap();
    panel
}

/// Block until the source holds exactly `n` rows.
async fn wait_rows<T: Entity>(source: &Arc<DataSource<T>>, n: usize) {
    let mut rx = source.subscribe();
    timeout(Duration::from_secs(5), rx.wait_for(|rows| rows.len() == n))
        .await
        .expect("timed out waiting for rows")
        .unwrap();
}

fn account_columns() -> Vec<Column<Account>> {
    vec![Column::new("username", "Username", |a: &Account| {
        CellValue::from(a.username.as_str())
    })]
}

// ── Connect and initial refresh ─────────────────────────────────────

#[tokio::test]
async fn connect_populates_the_store() {
    let server = MockServer::start().await;
    mount_baseline(&server, &["/fetch_accounts"]).await;
    Mock::given(method("GET"))
        .and(path("/fetch_accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            account_json(1, "ann"),
            account_json(2, "Bob"),
        ])))
        .mount(&server)
        .await;

    let panel = connect_panel(&server).await;
    wait_rows(panel.store().accounts(), 2).await;

    // Ingest normalized the email casing.
    let bob = panel
        .store()
        .accounts()
        .get(&EntityId::from(2))
        .expect("bob in index");
    assert_eq!(bob.email, "bob@example.com");

    panel.disconnect().await;
    assert!(!*panel.authenticated().borrow());
}

// ── Mutation → pulse → refetch ──────────────────────────────────────

#[tokio::test]
async fn successful_mutation_triggers_a_refetch() {
    let server = MockServer::start().await;
    mount_baseline(&server, &["/fetch_accounts"]).await;

    // First fetch: one account. After the create lands, the armed pulse
    // refetches and sees two.
    Mock::given(method("GET"))
        .and(path("/fetch_accounts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([account_json(1, "ann")])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let panel = connect_panel(&server).await;
    wait_rows(panel.store().accounts(), 1).await;

    Mock::given(method("GET"))
        .and(path("/fetch_accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            account_json(1, "ann"),
            account_json(2, "bob"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/create_account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_json(2, "bob")))
        .mount(&server)
        .await;

    let mut notifications = panel.notifications();
    let draft = opsdeck_api::types::AccountDraft {
        username: "bob".into(),
        email: "bob@example.com".into(),
        status: "Active".into(),
        ..opsdeck_api::types::AccountDraft::default()
    };
    let status = panel.create_account(draft).await.unwrap();
    assert_eq!(status, MutationStatus::Applied);

    let note = notifications.recv().await.unwrap();
    assert_eq!(note.level, NotificationLevel::Success);
    assert!(note.undo.is_some());

    wait_rows(panel.store().accounts(), 2).await;
}

#[tokio::test]
async fn failed_mutation_leaves_the_store_untouched() {
    let server = MockServer::start().await;
    mount_baseline(&server, &["/fetch_accounts"]).await;
    Mock::given(method("GET"))
        .and(path("/fetch_accounts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([account_json(1, "ann")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/delete_account/1"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "message": "Account has active suspensions" })),
        )
        .mount(&server)
        .await;

    let panel = connect_panel(&server).await;
    wait_rows(panel.store().accounts(), 1).await;

    let mut notifications = panel.notifications();
    let status = panel.delete_account(&EntityId::from(1)).await.unwrap();
    assert_eq!(status, MutationStatus::Failed);

    let note = notifications.recv().await.unwrap();
    assert_eq!(note.level, NotificationLevel::Error);
    assert_eq!(
        note.detail.as_deref(),
        Some("Account has active suspensions")
    );

    // No pulse was armed: the single expected fetch already happened
    // and the row is still present.
    assert_eq!(panel.store().accounts().len(), 1);
}

// ── Undo round-trip ─────────────────────────────────────────────────

#[tokio::test]
async fn undo_of_delete_recreates_under_the_original_id() {
    let server = MockServer::start().await;
    mount_baseline(&server, &["/fetch_accounts"]).await;
    Mock::given(method("GET"))
        .and(path("/fetch_accounts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([account_json(31, "ann")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/delete_account/31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    // The restore draft must carry the original identifier.
    Mock::given(method("POST"))
        .and(path("/create_account"))
        .and(body_partial_json(json!({ "accountId": 31 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_json(31, "ann")))
        .expect(1)
        .mount(&server)
        .await;

    let panel = connect_panel(&server).await;
    wait_rows(panel.store().accounts(), 1).await;

    let mut notifications = panel.notifications();
    panel.delete_account(&EntityId::from(31)).await.unwrap();

    let note = notifications.recv().await.unwrap();
    assert_eq!(note.level, NotificationLevel::Success);
    let undo = note.undo.expect("delete carries an undo intent");

    undo.invoke().await;
    assert!(undo.is_spent());

    // The replayed restore reports success but offers no second undo.
    let note = notifications.recv().await.unwrap();
    assert_eq!(note.level, NotificationLevel::Success);
    assert_eq!(note.message, "account restored");
    assert!(note.undo.is_none());

    // Invoking again is a no-op; the expect(1) above would trip otherwise.
    undo.invoke().await;
}

// ── Bulk batches ────────────────────────────────────────────────────

#[tokio::test]
async fn bulk_delete_reports_partial_failure() {
    let server = MockServer::start().await;
    mount_baseline(&server, &["/fetch_accounts"]).await;
    Mock::given(method("GET"))
        .and(path("/fetch_accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            account_json(1, "ann"),
            account_json(2, "bob"),
            account_json(3, "cara"),
        ])))
        .mount(&server)
        .await;
    for id in [1, 3] {
        Mock::given(method("DELETE"))
            .and(path(format!("/delete_account/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
    }
    Mock::given(method("DELETE"))
        .and(path("/delete_account/2"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "refused" })),
        )
        .mount(&server)
        .await;

    let panel = connect_panel(&server).await;
    wait_rows(panel.store().accounts(), 3).await;

    let mut state = TableState::new(account_columns());
    for id in [1, 2, 3] {
        state.toggle_selected(EntityId::from(id));
    }

    let mut notifications = panel.notifications();
    let outcome = run_bulk(
        &mut state,
        panel.store().accounts(),
        panel.notifier(),
        "delete accounts",
        |row| {
            let panel = panel.clone();
            async move {
                panel
                    .delete_account(&row.entity_id())
                    .await
                    .unwrap_or(MutationStatus::Failed)
            }
        },
    )
    .await;

    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(state.selection_len(), 0);

    // Drain until the aggregate warning arrives; exactly one error
    // notification precedes it (the refused row).
    let mut errors = 0;
    loop {
        let note = notifications.recv().await.unwrap();
        match note.level {
            NotificationLevel::Error => errors += 1,
            NotificationLevel::Warning => {
                assert_eq!(note.message, "delete accounts: 2 of 3 succeeded");
                break;
            }
            _ => {}
        }
    }
    assert_eq!(errors, 1);
}

// ── Unauthenticated guard ───────────────────────────────────────────

#[tokio::test]
async fn mutations_require_a_connection() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let config = PanelConfig::new(base_url, "ops", SecretString::from("pw".to_owned()));
    let panel = Panel::new(config).unwrap();

    let result = panel.revoke_session(&EntityId::from(5)).await;
    assert!(matches!(result, Err(opsdeck_core::CoreError::NotAuthenticated)));
}
