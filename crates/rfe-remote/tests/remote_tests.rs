use std::sync::Arc;

use parking_lot::Mutex;
use rfe_core::{ClientConfig, RemoteError, RemoteFs};
use rfe_remote::HttpRemote;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request as seen by the canned server.
#[derive(Debug, Clone)]
struct Seen {
    method: String,
    target: String,
    body: String,
}

type Reply = (u16, &'static str, String);

/// Serve one canned reply per connection, in order.
async fn serve(replies: Vec<Reply>) -> (String, Arc<Mutex<Vec<Seen>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&seen);
    tokio::spawn(async move {
        for (status, content_type, body) in replies {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let request = read_request(&mut stream).await;
            log.lock().push(request);
            let response = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (base, seen)
}

async fn read_request(stream: &mut TcpStream) -> Seen {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        if n == 0 {
            break buf.len();
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let mut request_line = head.lines().next().unwrap_or_default().split(' ');
    Seen {
        method: request_line.next().unwrap_or_default().to_string(),
        target: request_line.next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    }
}

fn json(body: &str) -> Reply {
    (200, "application/json", body.to_string())
}

fn remote(base: &str) -> HttpRemote {
    HttpRemote::new(&ClientConfig::new(base)).unwrap()
}

#[tokio::test]
async fn test_list_decodes_entries() {
    let (base, seen) = serve(vec![json(
        r#"[{"name":"A","path":"C:\\A","is_dir":true,"size":0,"modified":1700000000.0},
            {"name":"b.txt","path":"C:\\b.txt","is_dir":false,"size":12,"modified":1700000000.5}]"#,
    )])
    .await;

    let entries = remote(&base).list(r"C:\", true).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].is_dir);
    assert_eq!(entries[1].size, Some(12));

    let request = seen.lock()[0].clone();
    assert_eq!(request.method, "GET");
    assert!(request.target.starts_with("/api/list?path=C%3A%5C"));
    assert!(request.target.ends_with("only_dirs=true"));
}

#[tokio::test]
async fn test_error_detail_becomes_message() {
    let (base, _) = serve(vec![
        (403, "application/json", r#"{"detail":"Path not allowed"}"#.to_string()),
        (404, "application/json", r#"{"detail":"Directory not found"}"#.to_string()),
    ])
    .await;
    let remote = remote(&base);

    let err = remote.list(r"D:\secret", false).await.unwrap_err();
    assert_eq!(err, RemoteError::http(403, Some("Path not allowed".into())));
    assert_eq!(err.user_message(), "Path not allowed");

    let err = remote.list(r"C:\gone", false).await.unwrap_err();
    assert!(matches!(err, RemoteError::NotFound { .. }));
}

#[tokio::test]
async fn test_move_returns_receipt() {
    let (base, seen) = serve(vec![json(
        r#"{"ok":true,"path":"C:\\dest\\a.txt","undo_token":"tok-1"}"#,
    )])
    .await;

    let receipt = remote(&base).move_to(r"C:\a.txt", r"C:\dest").await.unwrap();
    assert_eq!(receipt.undo_token.as_deref(), Some("tok-1"));
    assert!(!receipt.skipped);

    let request = seen.lock()[0].clone();
    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/api/move");
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["source"], r"C:\a.txt");
    assert_eq!(body["destination"], r"C:\dest");
}

#[tokio::test]
async fn test_read_and_unpin() {
    let (base, seen) = serve(vec![
        (200, "text/plain", "hello\nworld".to_string()),
        json(r#"{"ok":true}"#),
    ])
    .await;
    let remote = remote(&base);

    assert_eq!(remote.read(r"C:\notes.txt").await.unwrap(), "hello\nworld");
    remote.unpin(r"C:\A").await.unwrap();

    let requests = seen.lock().clone();
    assert!(requests[0].target.starts_with("/api/read?path="));
    assert_eq!(requests[1].method, "DELETE");
    assert!(requests[1].target.starts_with("/api/pins?path="));
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let (base, _) = serve(vec![json("not json")]).await;

    let err = remote(&base).roots().await.unwrap_err();
    assert!(matches!(err, RemoteError::Decode { .. }));
}
