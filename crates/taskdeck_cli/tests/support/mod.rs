#![allow(dead_code)]

//! Shared harness for the CLI tests: a canned-response HTTP stub
//! standing in for the remote task service, plus helpers to run the
//! built binary against it.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

pub struct StubServer {
    pub base_url: String,
    requests: mpsc::Receiver<RecordedRequest>,
}

impl StubServer {
    /// Serves one canned `(status, body)` response per incoming
    /// connection, in order. Responses close the connection so the
    /// client opens a fresh one per request.
    pub fn start(responses: Vec<(&'static str, String)>) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for (status, body) in responses {
                let stream = match listener.accept() {
                    Ok((stream, _)) => stream,
                    Err(_) => return,
                };
                if let Some(recorded) = handle(stream, status, &body) {
                    let _ = tx.send(recorded);
                }
            }
        });

        StubServer { base_url, requests: rx }
    }

    /// The requests seen so far. Call after the client has exited.
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        let mut seen = Vec::new();
        while let Ok(request) = self.requests.recv_timeout(Duration::from_millis(200)) {
            seen.push(request);
        }
        seen
    }
}

fn handle(mut stream: TcpStream, status: &str, body: &str) -> Option<RecordedRequest> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            break;
        }
        if let Some(value) = trimmed.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut body_bytes = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body_bytes).ok()?;
    }

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).ok()?;
    stream.flush().ok()?;

    Some(RecordedRequest {
        method,
        path,
        body: String::from_utf8_lossy(&body_bytes).into_owned(),
    })
}

fn missing_config_path() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskdeck-{nanos}-no-config.json"))
}

/// Run the binary one-shot against the stub.
pub fn run_taskdeck(base_url: &str, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    Command::new(exe)
        .args(args)
        .env("TASKDECK_API_URL", base_url)
        .env("TASKDECK_CONFIG_PATH", missing_config_path())
        .output()
        .expect("failed to run taskdeck")
}

/// Run the binary with no arguments (interactive mode), feeding
/// `script` to stdin.
pub fn run_taskdeck_interactive(base_url: &str, script: &str) -> Output {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let mut child = Command::new(exe)
        .env("TASKDECK_API_URL", base_url)
        .env("TASKDECK_CONFIG_PATH", missing_config_path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn taskdeck");

    child
        .stdin
        .as_mut()
        .expect("stdin not piped")
        .write_all(script.as_bytes())
        .expect("failed to write script");

    child.wait_with_output().expect("failed to wait for taskdeck")
}

pub fn task_json(id: i64, name: &str, done: bool, priority: &str, due_date: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "done": done,
        "priority": priority,
        "due_date": due_date,
        "created_at": "2026-01-01T00:00:00",
        "completed_at": null,
    })
}
