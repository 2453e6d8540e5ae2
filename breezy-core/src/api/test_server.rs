//! One-shot HTTP listener for checking what the clients put on the wire

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as received, header names lowercased
pub struct Captured {
    pub head: String,
    pub body: String,
}

impl Captured {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            (key == name).then(|| value.trim())
        })
    }
}

/// Serve a single request with `status` and `body`, returning the base URL
/// and a handle yielding the captured request
pub async fn serve_once(
    status: &'static str,
    body: &'static [u8],
) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        let head_end = loop {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            raw.extend_from_slice(&buf[..n]);
            if let Some(pos) = find(&raw, b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&raw[..head_end]).into_owned();
        let head = lowercase_header_names(&head);
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|value| value.trim().parse::<usize>().unwrap());

        loop {
            let received = &raw[head_end..];
            let complete = match content_length {
                Some(len) => received.len() >= len,
                None if head.contains("transfer-encoding: chunked") => {
                    received.ends_with(b"0\r\n\r\n")
                }
                None => true,
            };
            if complete {
                break;
            }
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.write_all(body).await.unwrap();
        socket.shutdown().await.ok();

        Captured {
            head,
            body: String::from_utf8_lossy(&raw[head_end..]).into_owned(),
        }
    });

    (base_url, handle)
}

/// A reqwest client that ignores proxy settings from the environment
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// A base URL on which nothing is listening
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn lowercase_header_names(head: &str) -> String {
    head.lines()
        .enumerate()
        .map(|(i, line)| match line.split_once(':') {
            Some((key, value)) if i > 0 => format!("{}:{value}", key.to_ascii_lowercase()),
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
