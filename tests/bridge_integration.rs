// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests for the dispatcher and the REST router, with wiremock
//! standing in for the vendor cloud.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use hwl_bridge::command::{DeviceCommand, DeviceKind};
use hwl_bridge::config::BridgeConfig;
use hwl_bridge::dispatch::Dispatcher;
use hwl_bridge::server::{self, AppState};
use hwl_bridge::Error;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{body_json, header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PLUG: &str = "b33f109e-41ae-429a-9102-a715a3e8c6bc";
const LAMP: &str = "ad621820-e2fb-40d2-9338-3f457e940cd2";
const BLIND: &str = "f0a1f073-1c41-4b5d-adb9-b0f9caad4b8d";

struct Bridge {
    server: MockServer,
    dispatcher: Dispatcher,
    _states: TempDir,
}

async fn bridge() -> Bridge {
    let server = MockServer::start().await;
    let states = tempfile::tempdir().unwrap();
    let config = BridgeConfig::new("me@example.com", "password")
        .with_default_plug_group("unused-default")
        .with_route(LAMP, PLUG)
        .with_route(BLIND, PLUG)
        .with_cloud_urls(server.uri(), server.uri())
        .with_retries(2, Duration::from_millis(1))
        .with_state_dir(states.path());
    let dispatcher = Dispatcher::builder(config).build().await.unwrap();
    Bridge {
        server,
        dispatcher,
        _states: states,
    }
}

async fn mount_login(server: &MockServer, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/account/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session": "tok" })))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_action(server: &MockServer, device: &str, body: Value, expected: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/plugs/{PLUG}/devices/{device}/action")))
        .and(header_matcher("x-session-token", "tok"))
        .and(body_json(body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "Success" })))
        .expect(expected)
        .mount(server)
        .await;
}

// ============================================================================
// Dispatcher Tests
// ============================================================================

mod dispatcher {
    use super::*;

    #[tokio::test]
    async fn dimmer_below_minimum_turns_off() {
        let bridge = bridge().await;
        mount_login(&bridge.server, 1).await;
        mount_action(&bridge.server, LAMP, json!({ "action": "Off" }), 1).await;

        let command = DeviceCommand::new(LAMP, DeviceKind::Dimmer, 0);
        let is_active = bridge.dispatcher.dispatch(&command).await.unwrap();

        assert!(!is_active);
        assert!(!bridge.dispatcher.plug_state(&LAMP.into()).await);
    }

    #[tokio::test]
    async fn dimmer_level_is_sent_as_range() {
        let bridge = bridge().await;
        mount_login(&bridge.server, 1).await;
        mount_action(&bridge.server, LAMP, json!({ "action": "Range", "value": 65 }), 1).await;

        let command = DeviceCommand::new(LAMP, DeviceKind::Dimmer, 65);
        assert!(bridge.dispatcher.dispatch(&command).await.unwrap());
        assert!(bridge.dispatcher.plug_state(&LAMP.into()).await);
    }

    #[tokio::test]
    async fn switch_on_logs_in_once_and_records() {
        let bridge = bridge().await;
        mount_login(&bridge.server, 1).await;
        mount_action(&bridge.server, LAMP, json!({ "action": "On" }), 2).await;

        let command = DeviceCommand::new(LAMP, DeviceKind::Switch, "On");
        assert!(bridge.dispatcher.dispatch(&command).await.unwrap());
        // second dispatch reuses the cached session
        assert!(bridge.dispatcher.dispatch(&command).await.unwrap());

        assert!(bridge.dispatcher.plug_state(&LAMP.into()).await);
    }

    #[tokio::test]
    async fn curtain_leaves_state_untouched() {
        let bridge = bridge().await;
        mount_login(&bridge.server, 1).await;
        mount_action(&bridge.server, BLIND, json!({ "action": "Up" }), 1).await;

        let command = DeviceCommand::new(BLIND, DeviceKind::Curtain, "up");
        let is_active = bridge.dispatcher.dispatch(&command).await.unwrap();

        assert!(!is_active);
        assert!(std::fs::read_dir(bridge.dispatcher.states().dir())
            .unwrap()
            .next()
            .is_none());
    }

    #[tokio::test]
    async fn unrouted_device_uses_default_group() {
        let bridge = bridge().await;
        mount_login(&bridge.server, 1).await;
        Mock::given(method("POST"))
            .and(path("/plugs/unused-default/devices/kettle/action"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "Success" })))
            .expect(1)
            .mount(&bridge.server)
            .await;

        let command = DeviceCommand::new("kettle", DeviceKind::Switch, "off");
        assert!(!bridge.dispatcher.dispatch(&command).await.unwrap());
    }

    #[tokio::test]
    async fn upstream_rejection_does_not_record() {
        let bridge = bridge().await;
        mount_login(&bridge.server, 1).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "Error" })))
            .expect(1)
            .mount(&bridge.server)
            .await;

        let command = DeviceCommand::new(LAMP, DeviceKind::Switch, "On");
        let err = bridge.dispatcher.dispatch(&command).await.unwrap_err();

        assert!(matches!(err, Error::Upstream(_)));
        assert!(!bridge.dispatcher.plug_state(&LAMP.into()).await);
    }

    #[tokio::test]
    async fn auth_failure_skips_action() {
        let bridge = bridge().await;
        Mock::given(method("GET"))
            .and(path("/account/login"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&bridge.server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&bridge.server)
            .await;

        let command = DeviceCommand::new(LAMP, DeviceKind::Switch, "On");
        let err = bridge.dispatcher.dispatch(&command).await.unwrap_err();

        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn invalid_dimmer_skips_action() {
        let bridge = bridge().await;
        mount_login(&bridge.server, 1).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&bridge.server)
            .await;

        let command = DeviceCommand::new(LAMP, DeviceKind::Dimmer, 150);
        let err = bridge.dispatcher.dispatch(&command).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn request_fields_checked_after_login() {
        let bridge = bridge().await;
        mount_login(&bridge.server, 1).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&bridge.server)
            .await;

        let err = bridge
            .dispatcher
            .dispatch_request(LAMP, Some("switch"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn request_during_auth_outage_reports_auth() {
        let bridge = bridge().await;
        Mock::given(method("GET"))
            .and(path("/account/login"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&bridge.server)
            .await;

        let err = bridge
            .dispatcher
            .dispatch_request(LAMP, Some("dimmer"), Some(json!({ "level": 40 })))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn request_fields_dispatch_like_a_command() {
        let bridge = bridge().await;
        mount_login(&bridge.server, 1).await;
        mount_action(&bridge.server, LAMP, json!({ "action": "Range", "value": 40 }), 1).await;

        let is_active = bridge
            .dispatcher
            .dispatch_request(LAMP, Some("dimmer"), Some(json!(40)))
            .await
            .unwrap();

        assert!(is_active);
        assert!(bridge.dispatcher.plug_state(&LAMP.into()).await);
    }

    #[tokio::test]
    async fn smart_plug_is_none_for_empty_account() {
        let bridge = bridge().await;
        mount_login(&bridge.server, 1).await;
        Mock::given(method("GET"))
            .and(path("/plugs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&bridge.server)
            .await;

        assert!(bridge.dispatcher.smart_plug().await.unwrap().is_none());
    }
}

// ============================================================================
// Router Tests
// ============================================================================

mod router {
    use super::*;

    struct App {
        server: MockServer,
        state: AppState,
        _states: TempDir,
    }

    async fn app() -> App {
        let Bridge {
            server,
            dispatcher,
            _states,
        } = bridge().await;
        App {
            server,
            state: AppState::new(dispatcher),
            _states,
        }
    }

    async fn send(app: &App, request: Request<Body>) -> (StatusCode, Value) {
        let response = server::router(app.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn post_switch_returns_state() {
        let app = app().await;
        mount_login(&app.server, 1).await;
        mount_action(&app.server, LAMP, json!({ "action": "On" }), 1).await;

        let (status, body) = send(
            &app,
            post_json(&format!("/plug/{LAMP}"), r#"{"type": "switch", "value": "On"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "is_active": true }));

        let (status, body) = send(&app, get(&format!("/plug/{LAMP}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "is_active": true }));
    }

    #[tokio::test]
    async fn get_unknown_device_is_inactive() {
        let app = app().await;
        let (status, body) = send(&app, get("/plug/never-seen")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "is_active": false }));
    }

    #[tokio::test]
    async fn invalid_value_is_bad_request() {
        let app = app().await;
        mount_login(&app.server, 1).await;

        let (status, body) = send(
            &app,
            post_json(&format!("/plug/{LAMP}"), r#"{"type": "dimmer", "value": "bright"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn non_object_body_is_bad_request() {
        let app = app().await;
        let (status, body) = send(&app, post_json(&format!("/plug/{LAMP}"), "[1, 2]")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn missing_value_is_bad_request() {
        let app = app().await;
        mount_login(&app.server, 1).await;
        let (status, body) =
            send(&app, post_json(&format!("/plug/{LAMP}"), r#"{"type": "switch"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn missing_value_during_auth_outage_is_service_unavailable() {
        let app = app().await;
        Mock::given(method("GET"))
            .and(path("/account/login"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&app.server)
            .await;

        for body in [r#"{"type": "switch"}"#, r#"{"type": "dimmer", "value": [40]}"#] {
            let (status, reply) = send(&app, post_json(&format!("/plug/{LAMP}"), body)).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{body}");
            assert_eq!(reply["error"], "auth_unavailable");
        }
    }

    #[tokio::test]
    async fn auth_failure_is_service_unavailable() {
        let app = app().await;
        Mock::given(method("GET"))
            .and(path("/account/login"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&app.server)
            .await;

        let (status, body) = send(
            &app,
            post_json(&format!("/plug/{LAMP}"), r#"{"value": "On"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "auth_unavailable");
        assert!(body["message"].as_str().unwrap().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn plugs_lists_summaries() {
        let app = app().await;
        mount_login(&app.server, 1).await;
        Mock::given(method("GET"))
            .and(path("/plugs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": PLUG, "name": "Living room", "online": true, "timeZone": "UTC" },
                { "id": "second", "name": "Garden", "online": false }
            ])))
            .mount(&app.server)
            .await;

        let (status, body) = send(&app, get("/plugs")).await;
        assert_eq!(status, StatusCode::OK);
        let plugs = body.as_array().unwrap();
        assert_eq!(plugs.len(), 2);
        assert_eq!(plugs[0]["name"], "Living room");
        assert!(plugs[0].get("timeZone").is_none());
        assert_eq!(plugs[1]["online"], false);
    }

    #[tokio::test]
    async fn smartplug_returns_first_group() {
        let app = app().await;
        mount_login(&app.server, 1).await;
        Mock::given(method("GET"))
            .and(path("/plugs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": PLUG, "name": "Living room", "online": true, "timeZone": "Europe/Amsterdam" },
                { "id": "second" }
            ])))
            .mount(&app.server)
            .await;

        let (status, body) = send(&app, get("/smartplug")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], PLUG);
        assert_eq!(body["timeZone"], "Europe/Amsterdam");
    }

    #[tokio::test]
    async fn smartplug_without_groups_reports_message() {
        let app = app().await;
        mount_login(&app.server, 1).await;
        Mock::given(method("GET"))
            .and(path("/plugs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&app.server)
            .await;

        let (status, body) = send(&app, get("/smartplug")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "No smartplugs found" }));
    }

    #[tokio::test]
    async fn plugs_upstream_failure_is_service_unavailable() {
        let app = app().await;
        mount_login(&app.server, 1).await;
        Mock::given(method("GET"))
            .and(path("/plugs"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&app.server)
            .await;

        let (status, body) = send(&app, get("/plugs")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "upstream_unavailable");
    }
}
