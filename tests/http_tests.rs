use anyhow::Result;
use barrage::config::LoadConfig;
use barrage::error::RequestError;
use barrage::http::{HttpRequester, Requester};
use barrage::performance::{LoadSession, Outcome};
use futures::stream;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Minimal HTTP/1.1 responder: one fixed response per connection, then close.
async fn spawn_server(status_line: &'static str, body: &'static str) -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let mut request = Vec::new();
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => {
                            request.extend_from_slice(&buf[..n]);
                            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                    }
                }
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Ok(addr)
}

/// Keep-alive responder that records every request head and counts connections.
///
/// `GET /redirect` answers `302` pointing at `/next`; every other path gets `200 ok`.
struct RecordingServer {
    addr: SocketAddr,
    heads: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
}

impl RecordingServer {
    async fn spawn() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let heads = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let server_heads = Arc::clone(&heads);
        let server_connections = Arc::clone(&connections);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                server_connections.fetch_add(1, Ordering::SeqCst);
                let heads = Arc::clone(&server_heads);
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let mut pending = Vec::new();
                    loop {
                        let end = pending.windows(4).position(|w| w == b"\r\n\r\n");
                        let Some(end) = end else {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => pending.extend_from_slice(&buf[..n]),
                            }
                            continue;
                        };

                        let head: Vec<u8> = pending.drain(..end + 4).collect();
                        let head = String::from_utf8_lossy(&head).to_string();
                        let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                        heads.lock().unwrap().push(head);

                        let response = if path == "/redirect" {
                            "HTTP/1.1 302 Found\r\nLocation: /next\r\nContent-Length: 0\r\n\r\n"
                                .to_string()
                        } else {
                            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok".to_string()
                        };
                        if socket.write_all(response.as_bytes()).await.is_err() {
                            return;
                        }
                    }
                });
            }
        });

        Ok(Self {
            addr,
            heads,
            connections,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn heads(&self) -> Vec<String> {
        self.heads.lock().unwrap().clone()
    }

    fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

fn header_lines(head: &str) -> Vec<String> {
    head.lines().skip(1).map(|line| line.to_lowercase()).collect()
}

/// Accepts connections and never answers.
async fn spawn_silent_server() -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    Ok(addr)
}

fn config_for(addr: SocketAddr) -> LoadConfig {
    LoadConfig::builder(format!("http://{}/", addr))
        .concurrency(2)
        .duration(Duration::from_millis(500))
        .timeout(Duration::from_millis(300))
        .disable_keep_alive(true)
        .build()
        .expect("valid config")
}

/// A 200 response reports body plus header bytes
#[tokio::test]
async fn test_successful_exchange() -> Result<()> {
    let addr = spawn_server("200 OK", "hello").await?;
    let requester = HttpRequester::new(&config_for(addr))?;

    let exchange = requester.send().await?;

    assert_eq!(exchange.status, 200);
    // "content-length: 5\r\n" + "connection: close\r\n" + "hello"
    assert_eq!(exchange.bytes, 19 + 19 + 5);
    Ok(())
}

/// Server errors count as failed attempts
#[tokio::test]
async fn test_error_status_is_a_failure() -> Result<()> {
    let addr = spawn_server("500 Internal Server Error", "boom").await?;
    let requester = HttpRequester::new(&config_for(addr))?;

    let err = requester.send().await.unwrap_err();
    assert!(matches!(err, RequestError::Status(500)));
    Ok(())
}

/// Redirects are returned as-is unless following is enabled
#[tokio::test]
async fn test_redirect_not_followed_by_default() -> Result<()> {
    let addr = spawn_server("302 Found", "").await?;
    let requester = HttpRequester::new(&config_for(addr))?;

    let exchange = requester.send().await?;
    assert_eq!(exchange.status, 302);
    Ok(())
}

/// With redirects allowed the final response is the redirect target
#[tokio::test]
async fn test_redirect_followed_when_allowed() -> Result<()> {
    let server = RecordingServer::spawn().await?;
    let config = LoadConfig::builder(server.url("/redirect"))
        .timeout(Duration::from_millis(500))
        .allow_redirects(true)
        .build()?;
    let requester = HttpRequester::new(&config)?;

    let exchange = requester.send().await?;

    assert_eq!(exchange.status, 200);
    let heads = server.heads();
    assert_eq!(heads.len(), 2);
    assert!(heads[0].starts_with("GET /redirect "), "got {:?}", heads[0]);
    assert!(heads[1].starts_with("GET /next "), "got {:?}", heads[1]);
    Ok(())
}

/// Without redirects allowed only the first request is made
#[tokio::test]
async fn test_redirect_target_not_requested_by_default() -> Result<()> {
    let server = RecordingServer::spawn().await?;
    let config = LoadConfig::builder(server.url("/redirect"))
        .timeout(Duration::from_millis(500))
        .build()?;
    let requester = HttpRequester::new(&config)?;

    let exchange = requester.send().await?;

    assert_eq!(exchange.status, 302);
    assert_eq!(server.heads().len(), 1);
    Ok(())
}

/// Gzip is negotiated by default and not when compression is disabled
#[tokio::test]
async fn test_compression_negotiation() -> Result<()> {
    let server = RecordingServer::spawn().await?;

    let default_config = LoadConfig::builder(server.url("/compressed"))
        .timeout(Duration::from_millis(500))
        .build()?;
    HttpRequester::new(&default_config)?.send().await?;

    let plain_config = LoadConfig::builder(server.url("/plain"))
        .timeout(Duration::from_millis(500))
        .disable_compression(true)
        .build()?;
    HttpRequester::new(&plain_config)?.send().await?;

    let heads = server.heads();
    assert_eq!(heads.len(), 2);

    let compressed = header_lines(&heads[0]);
    assert!(
        compressed.iter().any(|line| line == "accept-encoding: gzip"),
        "got {:?}",
        compressed
    );

    let plain = header_lines(&heads[1]);
    assert!(
        !plain.iter().any(|line| line.starts_with("accept-encoding:")),
        "got {:?}",
        plain
    );
    Ok(())
}

/// Connections are reused unless keep-alive is disabled
#[tokio::test]
async fn test_keep_alive_reuse() -> Result<()> {
    let reused = RecordingServer::spawn().await?;
    let config = LoadConfig::builder(reused.url("/"))
        .timeout(Duration::from_millis(500))
        .build()?;
    let requester = HttpRequester::new(&config)?;
    for _ in 0..3 {
        requester.send().await?;
    }
    assert_eq!(reused.heads().len(), 3);
    assert_eq!(reused.connections(), 1);

    let fresh = RecordingServer::spawn().await?;
    let config = LoadConfig::builder(fresh.url("/"))
        .timeout(Duration::from_millis(500))
        .disable_keep_alive(true)
        .build()?;
    let requester = HttpRequester::new(&config)?;
    for _ in 0..3 {
        requester.send().await?;
    }
    assert_eq!(fresh.heads().len(), 3);
    assert_eq!(fresh.connections(), 3);
    Ok(())
}

/// A closed port is a connection error
#[tokio::test]
async fn test_connection_refused() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let requester = HttpRequester::new(&config_for(addr))?;
    let err = requester.send().await.unwrap_err();
    assert!(matches!(err, RequestError::Connect(_)), "got {:?}", err);
    Ok(())
}

/// A server that never answers hits the request timeout
#[tokio::test]
async fn test_request_timeout() -> Result<()> {
    let addr = spawn_silent_server().await?;
    let requester = HttpRequester::new(&config_for(addr))?;

    let started = Instant::now();
    let err = requester.send().await.unwrap_err();

    assert!(matches!(err, RequestError::Timeout(_)), "got {:?}", err);
    assert!(started.elapsed() < Duration::from_secs(2));
    Ok(())
}

/// End to end run against a local server
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_load_session_against_local_server() -> Result<()> {
    let addr = spawn_server("200 OK", "ok").await?;
    let config = config_for(addr);
    let requester = Arc::new(HttpRequester::new(&config)?);

    let started = Instant::now();
    let aggregate = LoadSession::start(&config, requester)
        .collect(stream::pending())
        .await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(aggregate.responders, 2);
    assert!(aggregate.request_count > 0);
    assert_eq!(aggregate.error_count, 0);

    let Outcome::Summary(summary) = aggregate.summarize() else {
        panic!("expected a summary");
    };
    assert_eq!(summary.total_bytes, summary.total_requests * (19 + 19 + 2));
    assert!(summary.min_latency <= summary.max_latency);
    Ok(())
}
