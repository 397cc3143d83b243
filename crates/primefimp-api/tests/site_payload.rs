#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use primefimp_api::{
    ActionSpec, Command, ComponentType, MemoryTransport, NotifyEvent, Request, RequestParam,
    Response, Site, Transport,
};
use serde_json::{Value, json};

fn hub_reply() -> Value {
    json!({
        "cmd": "get",
        "component": null,
        "requestId": 1_700_000_000_u64,
        "success": true,
        "param": {
            "device": [
                {
                    "id": 11,
                    "fimp": { "adapter": "zwave-ad", "address": "4", "group": "ch_0" },
                    "client": { "name": "Hallway dimmer" },
                    "model": "zw_398_3_1",
                    "room": 2,
                    "services": {
                        "out_lvl_switch": {
                            "addr": "/rt:dev/rn:zw/ad:1/sv:out_lvl_switch/ad:4_0",
                            "enabled": true,
                            "intf": ["cmd.lvl.set", "evt.lvl.report"],
                            "props": { "max_lvl": 99 }
                        }
                    }
                },
                { "id": 12, "client": { "name": "Door sensor" }, "room": null }
            ],
            "room": [{ "id": 2, "client": { "name": "Hallway" }, "type": "hallway" }],
            "area": [],
            "house": { "mode": "home" },
            "hub": { "mode": { "current": "home", "prev": "sleep" } },
            "shortcut": [],
            "mode": [{ "id": "sleep", "action": { "device": { "11": { "power": "off" } } } }],
            "timer": [
                { "id": 1, "action": 3.0, "enabled": true },
                { "id": 2, "action": "away" },
                { "id": 3, "action": { "room": { "2": { "temp": 19 } } } }
            ]
        }
    })
}

#[test]
fn aggregate_reply_decodes_into_site() {
    let reply: Response = serde_json::from_value(hub_reply()).unwrap();
    assert_eq!(reply.request_id, "1700000000");
    assert!(!reply.is_error());

    let site = Site::from_param(reply.param).unwrap();
    assert_eq!(site.devices.len(), 2);
    assert!(site.things.is_empty());

    let dimmer = site.device(11).unwrap();
    assert_eq!(dimmer.name(), "Hallway dimmer");
    assert_eq!(dimmer.fimp.adapter, "zwave-ad");
    let service = dimmer.service("out_lvl_switch").unwrap();
    assert!(service.enabled);
    assert_eq!(service.interfaces.len(), 2);

    assert_eq!(site.device(12).unwrap().room, None);
    assert_eq!(
        site.devices_in_room(2).map(|d| d.id).collect::<Vec<_>>(),
        vec![11]
    );

    assert_eq!(site.timer(1).unwrap().action, ActionSpec::ShortcutRef { shortcut_id: 3 });
    assert_eq!(site.timer(2).unwrap().action.as_mode(), Some("away"));
    let custom = site.timer(3).unwrap().action.as_custom().unwrap();
    assert_eq!(custom.room[&2]["temp"], 19);
    assert!(site.mode("sleep").unwrap().action.device.contains_key(&11));
}

#[test]
fn one_bad_timer_fails_the_whole_site() {
    let mut reply = hub_reply();
    reply["param"]["timer"][0]["action"] = json!(true);

    let err = Site::from_param(reply["param"].take()).unwrap_err();
    assert!(err.is_decode());
    assert!(err.to_string().contains("invalid action structure"), "{err}");
}

#[test]
fn null_payload_is_an_empty_site() {
    let site = Site::from_param(Value::Null).unwrap();
    assert!(site.is_empty());
}

#[tokio::test]
async fn memory_transport_carries_request_and_notification() {
    let transport = MemoryTransport::with_responder(|req| {
        (req.cmd == Command::Get).then(|| Response::ok(req.cmd, req.request_id.clone(), json!({})))
    });
    let mut responses = transport.subscribe_responses();
    let mut notifications = transport.subscribe_notifications();

    let get = Request::new(
        Command::Get,
        None,
        RequestParam::with_components(ComponentType::SITE),
        "req-1",
    );
    transport.publish(&get).unwrap();
    let set = Request::new(
        Command::Set,
        Some(ComponentType::Device),
        RequestParam::with_id(11_i64).insert("power", json!("on")),
        "req-2",
    );
    transport.publish(&set).unwrap();

    let reply = responses.recv().await.unwrap();
    assert_eq!(reply.request_id, "req-1");
    assert!(responses.try_recv().is_err());
    assert_eq!(transport.published_count(), 2);

    transport.inject_notification(NotifyEvent::new(Command::Edit, ComponentType::Room).with_id(2_i64));
    let event = notifications.recv().await.unwrap();
    assert_eq!(event.component, ComponentType::Room);
}
