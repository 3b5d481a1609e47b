//! Request loop tests against a scripted gateway.

use rstest::{fixture, rstest};

use areacheck_config::Config;

use crate::dispatch::ProtocolAdapter;
use crate::server::{LoopSummary, RequestLoop};
use crate::session::{InMemorySessionStore, SessionId, SessionStore};

use super::support::{ScriptedGateway, get_request, point_json, post_request};

#[fixture]
fn adapter() -> ProtocolAdapter<InMemorySessionStore> {
    ProtocolAdapter::new(&Config::default(), InMemorySessionStore::new())
}

fn point(x: &str, session: &str) -> crate::gateway::GatewayRequest {
    post_request("application/json", &point_json(x, "0", "2", session))
}

#[rstest]
fn serves_every_request_once(adapter: ProtocolAdapter<InMemorySessionStore>) {
    let gateway = ScriptedGateway::new()
        .with_request(point("1", "loop"))
        .with_request(point("-1", "loop"))
        .with_request(get_request("sessionId=loop"));

    let mut request_loop = RequestLoop::new(gateway, adapter);
    let summary = request_loop.run();

    assert_eq!(
        summary,
        LoopSummary {
            served: 3,
            gateway_errors: 0
        }
    );
    let id = SessionId::parse("loop").expect("session id");
    assert_eq!(request_loop.adapter().store().history(&id).len(), 2);
    let gateway = request_loop.into_gateway();
    assert_eq!(gateway.respond_calls(), 3);
    let last = String::from_utf8_lossy(gateway.responses().last().expect("responses"))
        .into_owned();
    assert_eq!(last.matches("\"inArea\"").count(), 2);
}

#[rstest]
fn rejections_are_still_delivered(adapter: ProtocolAdapter<InMemorySessionStore>) {
    let gateway = ScriptedGateway::new()
        .with_request(post_request("text/plain", "X=1"))
        .with_request(get_request(""));

    let mut request_loop = RequestLoop::new(gateway, adapter);
    let summary = request_loop.run();

    assert_eq!(summary.served, 2);
    let gateway = request_loop.into_gateway();
    for response in gateway.responses() {
        assert!(String::from_utf8_lossy(response).starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }
}

#[rstest]
fn accept_errors_do_not_stop_the_loop(adapter: ProtocolAdapter<InMemorySessionStore>) {
    let gateway = ScriptedGateway::new()
        .with_accept_error("truncated record header")
        .with_request(point("1", "resilient"))
        .with_accept_error("unexpected record type");

    let mut request_loop = RequestLoop::new(gateway, adapter);
    let summary = request_loop.run();

    assert_eq!(
        summary,
        LoopSummary {
            served: 1,
            gateway_errors: 2
        }
    );
}

#[rstest]
fn failed_deliveries_are_counted_not_retried(adapter: ProtocolAdapter<InMemorySessionStore>) {
    let gateway = ScriptedGateway::new()
        .with_request(point("1", "flaky"))
        .with_request(point("2", "flaky"))
        .failing_response(0);

    let mut request_loop = RequestLoop::new(gateway, adapter);
    let summary = request_loop.run();

    assert_eq!(summary.served, 1);
    assert_eq!(summary.gateway_errors, 1);
    // The evaluation still happened even though its response was lost.
    let id = SessionId::parse("flaky").expect("session id");
    assert_eq!(request_loop.adapter().store().history(&id).len(), 2);
    let gateway = request_loop.into_gateway();
    assert_eq!(gateway.respond_calls(), 2);
    assert_eq!(gateway.responses().len(), 1);
}

#[rstest]
fn empty_gateway_finishes_immediately(adapter: ProtocolAdapter<InMemorySessionStore>) {
    let mut request_loop = RequestLoop::new(ScriptedGateway::new(), adapter);
    assert_eq!(request_loop.run(), LoopSummary::default());
}
