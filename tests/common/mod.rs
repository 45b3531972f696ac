#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use tiny_http::{Header, Response, Server, StatusCode};

pub const TOKEN: &str = "tok-e2e";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn body_json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json request body")
    }
}

#[derive(Default)]
struct MockState {
    routes: HashMap<(String, String), (u16, String)>,
    requests: Vec<Recorded>,
}

/// Canned-response backend on an ephemeral port. Routes match on method plus
/// the full request target first, then on the path without its query.
pub struct MockBackend {
    pub base: String,
    state: Arc<Mutex<MockState>>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockBackend {
    pub fn start() -> Self {
        let server = Server::http("127.0.0.1:0").expect("http server");
        let base = format!("http://{}", server.server_addr());
        let state = Arc::new(Mutex::new(MockState::default()));
        let stop = Arc::new(AtomicBool::new(false));

        let state_clone = Arc::clone(&state);
        let stop_clone = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            while !stop_clone.load(Ordering::SeqCst) {
                let mut req = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };
                let method = req.method().as_str().to_uppercase();
                let url = req.url().to_string();
                let authorization = req
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.as_str().to_string());
                let mut body = Vec::new();
                let _ = req.as_reader().read_to_end(&mut body);

                let (status, payload) = {
                    let mut st = state_clone.lock().expect("mock state");
                    st.requests.push(Recorded {
                        method: method.clone(),
                        url: url.clone(),
                        authorization,
                        body,
                    });
                    let path = url.split('?').next().unwrap_or_default().to_string();
                    st.routes
                        .get(&(method.clone(), url.clone()))
                        .or_else(|| st.routes.get(&(method, path)))
                        .cloned()
                        .unwrap_or((404, r#"{"detail":"Not Found"}"#.to_string()))
                };
                let response = Response::from_string(payload)
                    .with_status_code(StatusCode(status))
                    .with_header(
                        Header::from_bytes("Content-Type", "application/json")
                            .expect("content-type header"),
                    );
                let _ = req.respond(response);
            }
        });

        Self {
            base,
            state,
            stop,
            handle: Some(handle),
        }
    }

    pub fn route(&self, method: &str, target: &str, status: u16, body: Value) {
        self.route_raw(method, target, status, &body.to_string());
    }

    pub fn route_raw(&self, method: &str, target: &str, status: u16, body: &str) {
        self.state.lock().expect("mock state").routes.insert(
            (method.to_uppercase(), target.to_string()),
            (status, body.to_string()),
        );
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().expect("mock state").requests.clone()
    }

    pub fn count(&self, method: &str, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url.starts_with(prefix))
            .count()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub work: PathBuf,
    cargo_home: PathBuf,
    rustup_home: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        let work = tmp.path().join("work");
        fs::create_dir_all(&home).expect("create isolated home");
        fs::create_dir_all(&work).expect("create work dir");

        let orig_home = std::env::var("HOME").unwrap_or_default();
        let cargo_home = PathBuf::from(&orig_home).join(".cargo");
        let rustup_home = PathBuf::from(&orig_home).join(".rustup");

        Self {
            _tmp: tmp,
            home,
            work,
            cargo_home,
            rustup_home,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("policyguard");
        cmd.env("HOME", &self.home)
            .env("CARGO_HOME", &self.cargo_home)
            .env("RUSTUP_HOME", &self.rustup_home)
            .env_remove("POLICYGUARD_API_URL")
            .env_remove("POLICYGUARD_PASSWORD")
            .env_remove("POLICYGUARD_LOG_JSON")
            .env_remove("POLICYGUARD_LOG");
        cmd
    }

    pub fn against(&self, backend: &MockBackend) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--api-url").arg(&backend.base);
        cmd
    }

    pub fn run_json(&self, backend: &MockBackend, args: &[&str]) -> Value {
        let out = self
            .against(backend)
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home.join(".config/policyguard")
    }

    pub fn session_file(&self) -> PathBuf {
        self.config_dir().join("session.json")
    }

    pub fn log_in(&self) {
        fs::create_dir_all(self.config_dir()).expect("create config dir");
        fs::write(
            self.session_file(),
            serde_json::json!({ "token": TOKEN }).to_string(),
        )
        .expect("write session file");
    }

    pub fn fixture(&self, name: &str, content: &str) -> PathBuf {
        let path = self.work.join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    pub fn audit_lines(&self) -> Vec<Value> {
        let raw = fs::read_to_string(self.config_dir().join("audit.jsonl")).unwrap_or_default();
        raw.lines()
            .map(|l| serde_json::from_str(l).expect("audit line json"))
            .collect()
    }
}

pub fn violation(id: i64, status: &str) -> Value {
    serde_json::json!({
        "id": id,
        "table_name": "customers",
        "record_id": id * 10,
        "severity": "high",
        "status": status,
        "message": format!("Transaction amount exceeds limit for record {}", id * 10),
        "remediation": "Review the transaction",
        "created_at": "2026-03-01T10:00:00"
    })
}

pub fn scan_result() -> Value {
    serde_json::json!({
        "status": "completed",
        "scan_id": 7,
        "total_rules": 12,
        "violations_found": 3,
        "scan_mode": "database"
    })
}
