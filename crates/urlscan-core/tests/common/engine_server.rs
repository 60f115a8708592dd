//! Minimal HTTP/1.1 stand-in for the scan engine API, for integration tests.
//!
//! Answers `POST .../urls` with a scripted submission response and each
//! `GET .../analyses/{id}` with the next scripted poll response (the last one
//! repeats). Connections are kept alive so tests can observe reuse.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub connection: usize,
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Script {
    pub submit: (u16, String),
    pub polls: Vec<(u16, String)>,
}

struct State {
    script: Script,
    next_poll: usize,
    log: Vec<Recorded>,
}

pub struct EngineServer {
    pub base_url: String,
    state: Arc<Mutex<State>>,
}

impl EngineServer {
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().log.clone()
    }
}

pub fn submitted(id: &str) -> (u16, String) {
    (
        200,
        format!(r#"{{"data": {{"type": "analysis", "id": "{id}"}}}}"#),
    )
}

pub fn analysis(status: &str, malicious: u64, harmless: u64) -> (u16, String) {
    (
        200,
        format!(
            r#"{{"data": {{"attributes": {{"status": "{status}", "stats": {{"malicious": {malicious}, "harmless": {harmless}, "suspicious": 0, "undetected": 5}}}}}}}}"#
        ),
    )
}

/// Starts a scripted engine in background threads. Runs until the process exits.
pub fn start(script: Script) -> EngineServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(State {
        script,
        next_poll: 0,
        log: Vec::new(),
    }));
    let connections = Arc::new(AtomicUsize::new(0));
    {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&state);
                let id = connections.fetch_add(1, Ordering::SeqCst);
                thread::spawn(move || handle(stream, id, &state));
            }
        });
    }
    EngineServer {
        base_url: format!("http://127.0.0.1:{}/api/v3", port),
        state,
    }
}

/// A server that accepts connections and never answers.
pub fn start_stalled() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });
    format!("http://127.0.0.1:{}/api/v3", port)
}

/// A base URL nothing listens on.
pub fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api/v3", port)
}

fn handle(stream: TcpStream, connection: usize, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut writer = match stream.try_clone() {
        Ok(w) => w,
        Err(_) => return,
    };
    let mut reader = BufReader::new(stream);

    loop {
        let mut request_line = String::new();
        match reader.read_line(&mut request_line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or("").to_string();
        let path = parts.next().unwrap_or("").to_string();

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                headers.push((name.trim().to_string(), value.trim().to_string()));
            }
        }

        let content_length = headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);
        let mut body = vec![0u8; content_length];
        if reader.read_exact(&mut body).is_err() {
            return;
        }

        let (status, payload) = {
            let mut st = state.lock().unwrap();
            st.log.push(Recorded {
                connection,
                method: method.clone(),
                path: path.clone(),
                headers,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
            respond(&mut st, &method, &path)
        };

        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            status,
            reason(status),
            payload.len(),
            payload
        );
        if writer.write_all(response.as_bytes()).is_err() {
            return;
        }
    }
}

fn respond(st: &mut State, method: &str, path: &str) -> (u16, String) {
    if method == "POST" && path.ends_with("/urls") {
        return st.script.submit.clone();
    }
    if method == "GET" && path.contains("/analyses/") {
        let polls = &st.script.polls;
        if polls.is_empty() {
            return (500, "no poll script".to_string());
        }
        let i = st.next_poll.min(polls.len() - 1);
        st.next_poll += 1;
        return polls[i].clone();
    }
    (404, r#"{"error": {"code": "NotFoundError"}}"#.to_string())
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Status",
    }
}
