#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use primefimp_api::{
    Command, ComponentType, MemoryTransport, NotifyEvent, Request, RequestParam, Response,
};
use primefimp_core::{ApiClient, ClientConfig, CoreError};
use serde_json::{Value, json};
use tokio::sync::mpsc;

fn site_param(room_name: &str) -> Value {
    json!({
        "device": [{ "id": 1, "client": { "name": "Lamp" }, "room": 3 }],
        "room": [{ "id": 3, "client": { "name": room_name } }],
        "area": [{ "id": 1, "name": "Ground floor" }],
        "house": { "mode": "home" },
        "hub": { "mode": { "current": "home", "prev": "away" } },
        "shortcut": [],
        "mode": [{ "id": "away" }],
        "timer": [{ "id": 9, "action": 4 }]
    })
}

fn site_responder(
    room_name: &'static str,
) -> impl Fn(&Request) -> Option<Response> + Send + Sync + 'static {
    move |req| Some(Response::ok(req.cmd, req.request_id.clone(), site_param(room_name)))
}

fn client_with(transport: &Arc<MemoryTransport>, config: ClientConfig) -> ApiClient {
    ApiClient::new(config, transport.clone())
}

fn config() -> ClientConfig {
    ClientConfig::new("test-client").with_request_timeout(Duration::from_millis(200))
}

async fn wait_for_published(transport: &MemoryTransport, count: usize) {
    for _ in 0..100 {
        if transport.published_count() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("expected {count} published requests");
}

// ── GetSite ──────────────────────────────────────────────────────────

#[tokio::test]
async fn get_site_requests_every_component_and_caches() {
    let transport = Arc::new(MemoryTransport::with_responder(site_responder("Kitchen")));
    let client = client_with(&transport, config());

    let site = client.get_site(false).await.unwrap();
    assert_eq!(site.room(3).unwrap().client.name, "Kitchen");

    let request = transport.last_published().unwrap();
    assert_eq!(request.cmd, Command::Get);
    assert_eq!(request.component, None);
    assert_eq!(request.param.components, ComponentType::SITE.to_vec());

    let again = client.get_site(false).await.unwrap();
    assert!(Arc::ptr_eq(&site, &again));
    assert_eq!(transport.published_count(), 1);
    assert!(client.cache().last_refresh().is_some());
}

#[tokio::test]
async fn forced_refresh_replaces_snapshot() {
    let transport = Arc::new(MemoryTransport::with_responder(site_responder("Kitchen")));
    let client = client_with(&transport, config());
    let first = client.get_site(false).await.unwrap();

    transport.set_responder(site_responder("Pantry"));
    let second = client.get_site(true).await.unwrap();

    assert_eq!(transport.published_count(), 2);
    assert_eq!(second.room(3).unwrap().client.name, "Pantry");
    assert_eq!(first.room(3).unwrap().client.name, "Kitchen");
    assert!(Arc::ptr_eq(&client.cache().get().unwrap(), &second));
}

#[tokio::test]
async fn disabled_cache_always_fetches() {
    let transport = Arc::new(MemoryTransport::with_responder(site_responder("Kitchen")));
    let client = client_with(&transport, config().with_cache(false));

    client.get_site(false).await.unwrap();
    client.get_site(false).await.unwrap();

    assert_eq!(transport.published_count(), 2);
    assert!(client.cache().get().is_none());
}

#[tokio::test]
async fn concurrent_cold_reads_share_one_fetch() {
    let transport = Arc::new(MemoryTransport::new());
    let client = client_with(&transport, config());

    let readers: Vec<_> = (0..5)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get_site(false).await })
        })
        .collect();

    wait_for_published(&transport, 1).await;
    let request = transport.last_published().unwrap();
    transport.inject_response(Response::ok(
        Command::Get,
        request.request_id,
        site_param("Kitchen"),
    ));

    for reader in readers {
        let site = reader.await.unwrap().unwrap();
        assert_eq!(site.rooms.len(), 1);
    }
    assert_eq!(transport.published_count(), 1);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_snapshot() {
    let transport = Arc::new(MemoryTransport::with_responder(site_responder("Kitchen")));
    let client = client_with(&transport, config());
    let cached = client.get_site(false).await.unwrap();

    transport.set_responder(|req| {
        Some(Response::failed(
            req.cmd,
            req.request_id.clone(),
            json!("hub busy"),
        ))
    });
    let err = client.get_site(true).await.unwrap_err();
    assert!(matches!(err, CoreError::Remote { ref message, .. } if message == "hub busy"));

    assert!(Arc::ptr_eq(&client.get_site(false).await.unwrap(), &cached));
}

#[tokio::test]
async fn undecodable_timer_fails_fetch_without_touching_cache() {
    let transport = Arc::new(MemoryTransport::with_responder(|req| {
        let mut param = site_param("Kitchen");
        param["timer"][0]["action"] = json!([1, 2]);
        Some(Response::ok(req.cmd, req.request_id.clone(), param))
    }));
    let client = client_with(&transport, config());

    let err = client.get_site(false).await.unwrap_err();
    assert!(matches!(err, CoreError::Decode { .. }), "{err}");
    assert!(client.cache().get().is_none());
}

#[tokio::test]
async fn getters_read_through_the_snapshot() {
    let transport = Arc::new(MemoryTransport::with_responder(site_responder("Kitchen")));
    let client = client_with(&transport, config());

    assert_eq!(client.devices(false).await.unwrap()[0].name(), "Lamp");
    assert_eq!(client.areas(false).await.unwrap()[0].name, "Ground floor");
    assert_eq!(client.modes(false).await.unwrap()[0].id, "away");
    assert_eq!(client.timers(false).await.unwrap()[0].action.as_shortcut(), Some(4));
    assert_eq!(client.hub(false).await.unwrap().unwrap().mode.previous, "away");
    assert_eq!(client.house(false).await.unwrap().unwrap().mode, "home");
    assert!(client.shortcuts(false).await.unwrap().is_empty());
    assert!(client.things(false).await.unwrap().is_empty());
    assert_eq!(transport.published_count(), 1);

    client.invalidate_cache();
    client.rooms(false).await.unwrap();
    assert_eq!(transport.published_count(), 2);
}

// ── Send ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn unanswered_request_times_out() {
    let transport = Arc::new(MemoryTransport::new());
    let client = client_with(
        &transport,
        config().with_request_timeout(Duration::from_millis(30)),
    );

    let err = client
        .send(Command::Get, Some(ComponentType::Hub), RequestParam::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Timeout { timeout_ms: 30, .. }), "{err}");

    // A late reply for the abandoned id is ignored.
    let request = transport.last_published().unwrap();
    transport.inject_response(Response::ok(Command::Get, request.request_id, json!({})));
}

#[tokio::test]
async fn replies_are_matched_by_request_id() {
    let transport = Arc::new(MemoryTransport::new());
    let client = client_with(&transport, config());

    let first = {
        let client = client.clone();
        tokio::spawn(async move {
            client
                .send(Command::Get, Some(ComponentType::Room), RequestParam::with_id(1_i64))
                .await
        })
    };
    wait_for_published(&transport, 1).await;
    let second = {
        let client = client.clone();
        tokio::spawn(async move {
            client
                .send(Command::Get, Some(ComponentType::Room), RequestParam::with_id(2_i64))
                .await
        })
    };
    wait_for_published(&transport, 2).await;

    let published = transport.published();
    transport.inject_response(Response::ok(
        Command::Get,
        "not-ours",
        json!({ "room": "stray" }),
    ));
    transport.inject_response(Response::ok(
        Command::Get,
        published[1].request_id.clone(),
        json!({ "room": 2 }),
    ));
    transport.inject_response(Response::ok(
        Command::Get,
        published[0].request_id.clone(),
        json!({ "room": 1 }),
    ));

    assert_eq!(first.await.unwrap().unwrap().param["room"], 1);
    assert_eq!(second.await.unwrap().unwrap().param["room"], 2);
}

#[tokio::test]
async fn publish_failure_surfaces_transport_error() {
    let transport = Arc::new(MemoryTransport::new());
    let client = client_with(&transport, config());
    transport.close();

    let err = client
        .send(Command::Set, Some(ComponentType::Device), RequestParam::with_id(1_i64))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Transport { .. }));
    assert!(err.is_retryable());
}

// ── Stop ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn stop_fails_in_flight_and_later_calls() {
    let transport = Arc::new(MemoryTransport::new());
    let client = client_with(
        &transport,
        config().with_request_timeout(Duration::from_secs(5)),
    );

    let in_flight = {
        let client = client.clone();
        tokio::spawn(async move { client.get_site(false).await })
    };
    wait_for_published(&transport, 1).await;

    client.stop().await;
    client.stop().await;

    assert!(in_flight.await.unwrap().unwrap_err().is_closed());
    assert!(client.is_closed());
    assert!(client.get_site(true).await.unwrap_err().is_closed());
    assert!(
        client
            .send(Command::Get, None, RequestParam::default())
            .await
            .unwrap_err()
            .is_closed()
    );
    assert!(client.start_notify_router().await.unwrap_err().is_closed());
}

#[tokio::test]
async fn dropping_last_handle_stops_background_tasks() {
    let transport = Arc::new(MemoryTransport::new());
    let client = client_with(&transport, config());
    let (tx, mut rx) = mpsc::channel(4);
    client.register_channel("ch", tx).unwrap();
    client.start_notify_router().await.unwrap();

    let second = client.clone();
    drop(client);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(
        transport.inject_response(Response::ok(Command::Get, "orphan", Value::Null)),
        1
    );

    drop(second);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(
        transport.inject_response(Response::ok(Command::Get, "orphan", Value::Null)),
        0
    );
    assert_eq!(
        transport.inject_notification(NotifyEvent::new(Command::Add, ComponentType::Area)),
        0
    );
    assert!(rx.recv().await.is_none());
}
