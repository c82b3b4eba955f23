use std::sync::{Arc, Mutex};

use ctxh::http::{Body, Request, ResponseWriter, StatusCode};
use ctxh::{Bridge, Context, ContextHandler, Handler};

fn request() -> Request {
    http::Request::builder()
        .uri("/")
        .body(Body::empty())
        .unwrap()
}

#[derive(Default)]
struct Record {
    seen: Mutex<Vec<Context>>,
}

#[ctxh::async_trait]
impl ContextHandler for Record {
    async fn call(&self, cx: Context, res: ResponseWriter, _: Request) {
        self.seen.lock().unwrap().push(cx);
        res.write_header(StatusCode::NO_CONTENT);
    }
}

#[tokio::test]
async fn passes_root_context() {
    let record = Arc::new(Record::default());
    let bridge = Bridge::new(record.clone());

    let res = ResponseWriter::new();
    bridge.call(res.clone(), request()).await;

    let seen = record.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(Context::ptr_eq(&seen[0], bridge.context()));
    assert_eq!(res.status(), Some(StatusCode::NO_CONTENT));
}

#[tokio::test]
async fn reuses_root_context() {
    let record = Arc::new(Record::default());
    let bridge = Bridge::new(record.clone());

    for _ in 0..3 {
        bridge.call(ResponseWriter::new(), request()).await;
    }

    let seen = record.seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|cx| Context::ptr_eq(cx, bridge.context())));
}

#[test]
fn root_context_is_background() {
    let bridge = Bridge::new(Record::default());
    let cx = bridge.context();

    assert!(!cx.is_cancelled());
    assert_eq!(cx.err(), None);
    assert_eq!(cx.deadline(), None);
    assert!(cx.get::<String>().is_none());
}

#[test]
fn bridges_do_not_share_contexts() {
    let a = Bridge::new(Record::default());
    let b = Bridge::new(Record::default());

    assert!(!Context::ptr_eq(a.context(), b.context()));
}

#[tokio::test]
async fn dynamic_handlers() {
    let record = Arc::new(Record::default());
    let handler: Box<dyn ContextHandler> = Box::new(record.clone());
    let bridge: Arc<dyn Handler> = Arc::new(handler.bridge());

    Handler::call(&bridge, ResponseWriter::new(), request()).await;
    Handler::call(&bridge, ResponseWriter::new(), request()).await;

    assert_eq!(record.seen.lock().unwrap().len(), 2);
}

#[test]
fn into_inner() {
    let bridge = Record::default().bridge();
    assert!(bridge.get_ref().seen.lock().unwrap().is_empty());

    let record = bridge.into_inner();
    assert!(record.seen.lock().unwrap().is_empty());
}
