use ctxh::http::{Request, ResponseWriter, StatusCode};
use ctxh::{handler_fn, try_handler_fn, AppError, Context, ContextHandler};
use ctxh_hyper::{Serve, ToSocketAddr};
use hyper::service::Service;

fn request(body: &'static str) -> hyper::Request<hyper::Body> {
    hyper::Request::builder()
        .method("POST")
        .uri("/echo")
        .body(hyper::Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn serves_written_response() {
    let mut service = handler_fn(|_cx: Context, res: ResponseWriter, req: Request| async move {
        let body = req.into_body().collect().await.unwrap();
        res.write_header(StatusCode::CREATED);
        res.write(body);
    })
    .bridge()
    .into_service();

    let response = service.call(request("ping")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    assert_eq!(body, "ping");
}

#[tokio::test]
async fn serves_error_response() {
    let mut service = try_handler_fn(|_cx, _res, _req| async move {
        Err::<(), _>(AppError::new(
            "db timeout",
            "service unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        ))
    })
    .per_request()
    .bridge()
    .into_service();

    let response = service.call(request("")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    assert_eq!(body, "service unavailable");
}

#[tokio::test]
async fn make_service_clones() {
    let mut make = handler_fn(|_cx, res: ResponseWriter, _| async move {
        res.write("ok");
    })
    .bridge()
    .into_make_service();

    for _ in 0..2 {
        let mut service = make.call(()).await.unwrap();
        let response = service.call(request("")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn binds() {
    let server = handler_fn(|_cx, res: ResponseWriter, _| async move {
        res.write_header(StatusCode::NO_CONTENT);
    })
    .bridge()
    .serve(("127.0.0.1", 0u16))
    .unwrap();

    assert_eq!(server.local_addr().ip().to_string(), "127.0.0.1");
}

#[test]
fn socket_addrs() {
    let addr = "127.0.0.1:8080".to_socket_addr().unwrap();
    assert_eq!(addr.port(), 8080);

    assert!("not an address".to_socket_addr().is_err());
}
