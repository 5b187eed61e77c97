// End-to-end checks over a real listener: publishers and subscribers talk HTTP to a
// running server, with graceful shutdown so servers don't linger between tests.
use std::time::Duration;

use futures::StreamExt;
use probe_hub::client::{ProbePublisher, ProbeSubscriber};
use probe_hub::{Error, Hub, Matrix, Payload, ProbeServer, ServerConfig};
use reqwest::StatusCode;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    base_url: String,
    hub: Hub,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<probe_hub::Result<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = ProbeServer::new(ServerConfig::with_addr(addr));
        let hub = server.hub().clone();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .serve_until(listener, async move {
                    let _ = rx.await;
                })
                .await
        });

        Self {
            base_url: format!("http://{addr}"),
            hub,
            shutdown: Some(tx),
            handle,
        }
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn submission_without_subscribers_is_created() {
    let server = TestServer::start().await;

    let response = client()
        .post(format!("{}/data", server.base_url))
        .body(r#"{"message":"hello","matrix":[[1,2],[3,4]]}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.text().await.unwrap(), "Data received successfully");

    let stats = server.hub.stats().await.unwrap();
    assert_eq!(stats.messages_published, 1);
    assert_eq!(stats.deliveries, 0);

    server.stop().await;
}

#[tokio::test]
async fn subscriber_receives_exact_record() {
    let server = TestServer::start().await;
    let http = client();

    let response = http
        .get(format!("{}/events", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[reqwest::header::CONTENT_TYPE],
        "text/event-stream"
    );
    let mut body = response.bytes_stream();

    let publisher = ProbePublisher::with_client(http.clone(), &server.base_url);
    publisher.send_matrix(vec![vec![0.0]], "x").await.unwrap();

    let mut received = Vec::new();
    while !received.ends_with(b"\n\n") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("no record delivered")
            .unwrap()
            .unwrap();
        received.extend_from_slice(&chunk);
    }
    assert_eq!(received, b"data: {\"matrix\":[[0]],\"label\":\"x\"}\n\n");

    drop(body);
    server.stop().await;
}

#[tokio::test]
async fn only_connected_subscribers_receive() {
    let server = TestServer::start().await;
    let http = client();

    let gone = ProbeSubscriber::connect_with(&http, &server.base_url)
        .await
        .unwrap();
    let mut kept = ProbeSubscriber::connect_with(&http, &server.base_url)
        .await
        .unwrap();

    // Connected in order, so identities ascend with connection order
    let ids = server.hub.subscriber_ids().await.unwrap();
    assert_eq!(ids.len(), 2);
    let kept_id = ids[1];

    drop(gone);
    tokio::time::timeout(Duration::from_secs(5), async {
        while server.hub.subscriber_ids().await.unwrap() != vec![kept_id] {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("closed subscriber was not unregistered");

    let publisher = ProbePublisher::with_client(http.clone(), &server.base_url);
    publisher
        .send_matrix(vec![vec![1.0, 2.5]], "layer-0")
        .await
        .unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(5), kept.next_message())
        .await
        .expect("no message delivered")
        .unwrap()
        .unwrap();
    assert_eq!(msg.label(), "layer-0");
    assert_eq!(
        msg.payload(),
        &Payload::Matrix(Matrix::new(vec![vec![1.0, 2.5]]))
    );

    let stats = server.hub.stats().await.unwrap();
    assert_eq!(stats.deliveries, 1);

    server.stop().await;
}

#[tokio::test]
async fn late_subscriber_gets_no_replay() {
    let server = TestServer::start().await;
    let http = client();
    let publisher = ProbePublisher::with_client(http.clone(), &server.base_url);

    publisher.send_matrix(vec![vec![1.0]], "early").await.unwrap();

    let mut late = ProbeSubscriber::connect_with(&http, &server.base_url)
        .await
        .unwrap();
    publisher.send_matrix(vec![vec![2.0]], "late").await.unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(5), late.next_message())
        .await
        .expect("no message delivered")
        .unwrap()
        .unwrap();
    assert_eq!(msg.label(), "late");

    server.stop().await;
}

#[tokio::test]
async fn malformed_submission_is_rejected() {
    let server = TestServer::start().await;
    let http = client();

    let _subscriber = ProbeSubscriber::connect_with(&http, &server.base_url)
        .await
        .unwrap();
    let before = server.hub.subscriber_ids().await.unwrap();

    let response = http
        .post(format!("{}/data", server.base_url))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(server.hub.subscriber_ids().await.unwrap(), before);
    assert_eq!(server.hub.stats().await.unwrap().messages_published, 0);

    server.stop().await;
}

#[tokio::test]
async fn publisher_reports_rejection() {
    let server = TestServer::start().await;
    server.hub.shutdown();
    while !server.hub.is_closed() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let publisher = ProbePublisher::with_client(client(), &server.base_url);
    let result = publisher.send_matrix(vec![vec![1.0]], "x").await;

    assert!(matches!(
        result,
        Err(Error::UnexpectedStatus(StatusCode::SERVICE_UNAVAILABLE))
    ));

    server.stop().await;
}

#[tokio::test]
async fn shutdown_ends_open_streams() {
    let server = TestServer::start().await;
    let mut subscriber = ProbeSubscriber::connect_with(&client(), &server.base_url)
        .await
        .unwrap();

    let base_url = server.base_url.clone();
    server.stop().await;

    let next = tokio::time::timeout(Duration::from_secs(5), subscriber.next_message())
        .await
        .expect("stream did not end");
    assert!(next.is_none());

    let result = ProbeSubscriber::connect_with(&client(), &base_url).await;
    assert!(result.is_err());
}
