//! In-process HTTP stub for runner tests
//!
//! `StubServer` answers each connection with one response produced by a
//! handler closure. `FakeService` is a handler that behaves like the barrels
//! and measurements API closely enough for the whole suite to pass.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use barrelcheck_core::ResolvedEndpoint;
use barrelcheck_core::fixtures::{UNSUPPORTED_MEDIA_TYPE_TITLE, VALIDATION_TITLE, messages};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone)]
pub struct StubRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Lowercased header names
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl StubRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl StubResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: body.to_string(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: String::new(),
        }
    }
}

pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<StubRequest>>>,
}

impl StubServer {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&StubRequest) -> StubResponse + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let addr = listener.local_addr().expect("stub local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                serve(stream, &handler, &log);
            }
        });

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn endpoint(&self) -> ResolvedEndpoint {
        ResolvedEndpoint {
            environment: "stub".to_string(),
            base_url: self.base_url(),
            response_time_limit: Duration::from_secs(2),
        }
    }

    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Reads one request, logs it, then writes the handler's response.
fn serve<F>(stream: TcpStream, handler: &F, log: &Mutex<Vec<StubRequest>>) -> Option<()>
where
    F: Fn(&StubRequest) -> StubResponse,
{
    let mut reader = BufReader::new(stream.try_clone().ok()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_string(), Some(q.to_string())),
        None => (target, None),
    };

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((k, v)) = line.split_once(':') {
            headers.insert(k.trim().to_ascii_lowercase(), v.trim().to_string());
        }
    }

    let len: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).ok()?;

    let req = StubRequest {
        method,
        path,
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    let resp = handler(&req);
    log.lock().unwrap().push(req);

    let mut out = format!(
        "HTTP/1.1 {} Stub\r\nContent-Length: {}\r\nConnection: close\r\n",
        resp.status,
        resp.body.len()
    );
    if let Some(ct) = &resp.content_type {
        out.push_str(&format!("Content-Type: {ct}\r\n"));
    }
    out.push_str("\r\n");
    out.push_str(&resp.body);

    let mut stream = stream;
    stream.write_all(out.as_bytes()).ok()?;
    stream.flush().ok()
}

/// Stateful emulation of the barrels and measurements service.
#[derive(Default)]
pub struct FakeService {
    barrels: Vec<Map<String, Value>>,
    measurements: Vec<Map<String, Value>>,
}

impl FakeService {
    pub fn start() -> (StubServer, Arc<Mutex<FakeService>>) {
        let state = Arc::new(Mutex::new(FakeService::default()));
        let shared = Arc::clone(&state);
        let server = StubServer::start(move |req| shared.lock().unwrap().handle(req));
        (server, state)
    }

    pub fn barrel_count(&self) -> usize {
        self.barrels.len()
    }

    pub fn handle(&mut self, req: &StubRequest) -> StubResponse {
        let segments: Vec<&str> = req.path.split('/').filter(|s| !s.is_empty()).collect();
        match (req.method.as_str(), segments.as_slice()) {
            ("GET", ["barrels"]) => StubResponse::json(200, &json!(self.barrels)),
            ("POST", ["barrels"]) => self.create_barrel(req),
            ("GET", ["barrels", id]) => find(&self.barrels, id)
                .map(|b| StubResponse::json(200, &Value::Object(b.clone())))
                .unwrap_or_else(|| StubResponse::empty(404)),
            ("DELETE", ["barrels", id]) => self.delete_barrel(req, id),
            ("GET", ["measurements"]) => StubResponse::json(200, &json!(self.measurements)),
            ("POST", ["measurements"]) => self.create_measurement(req),
            ("GET", ["measurements", id]) => find(&self.measurements, id)
                .map(|m| StubResponse::json(200, &Value::Object(m.clone())))
                .unwrap_or_else(|| StubResponse::empty(404)),
            _ => StubResponse::empty(404),
        }
    }

    fn create_barrel(&mut self, req: &StubRequest) -> StubResponse {
        if req.header("aaaaa").is_some() {
            return StubResponse::json(400, &json!({"title": "Bad Request"}));
        }
        let Some(obj) = parse_object(&req.body) else {
            return StubResponse::json(400, &json!({"title": VALIDATION_TITLE}));
        };

        if let Some(id) = obj.get("id") {
            if !is_uuid_value(id) {
                return validation_error(json!({"$.id": [messages::INVALID_UUID]}));
            }
        }

        let mut errors = Map::new();
        for (field, required) in [
            ("qr", messages::QR_REQUIRED),
            ("rfid", messages::RFID_REQUIRED),
            ("nfc", messages::NFC_REQUIRED),
        ] {
            match obj.get(field) {
                None => {
                    errors.insert(field.into(), json!([required]));
                }
                Some(Value::String(s)) if s.is_empty() => {
                    errors.insert(field.into(), json!([format!("{field} must not be empty")]));
                }
                Some(Value::String(_)) => {}
                Some(_) => {
                    errors.insert(field.into(), json!([format!("{field} must be string")]));
                }
            }
        }
        if !errors.is_empty() {
            return validation_error(Value::Object(errors));
        }

        let id = obj.get("id").and_then(Value::as_str).unwrap_or_default();
        if find(&self.barrels, id).is_some() {
            return StubResponse::json(409, &json!({"title": "Conflict"}));
        }
        self.barrels.push(obj.clone());
        StubResponse::json(201, &Value::Object(obj))
    }

    fn delete_barrel(&mut self, req: &StubRequest, id: &str) -> StubResponse {
        if req.header("aaaaa").is_some() || uuid::Uuid::parse_str(id).is_err() {
            return StubResponse::json(400, &json!({"title": "Bad Request"}));
        }
        let before = self.barrels.len();
        self.barrels
            .retain(|b| b.get("id").and_then(Value::as_str) != Some(id));
        if self.barrels.len() < before {
            StubResponse::empty(200)
        } else {
            StubResponse::empty(404)
        }
    }

    fn create_measurement(&mut self, req: &StubRequest) -> StubResponse {
        let is_json = req
            .header("content-type")
            .is_some_and(|ct| ct.starts_with("application/json"));
        if !is_json {
            return StubResponse::json(415, &json!({"title": UNSUPPORTED_MEDIA_TYPE_TITLE}));
        }
        let Some(obj) = parse_object(&req.body) else {
            return validation_error(json!({}));
        };

        let mut errors = Map::new();
        if obj.get("id").is_some_and(|id| !is_uuid_value(id)) {
            errors.insert("$.id".into(), json!([messages::INVALID_UUID]));
        }
        match obj.get("barrelId") {
            None | Some(Value::Null) => {
                errors.insert("barrelId".into(), json!([messages::BARREL_ID_REQUIRED]));
            }
            Some(Value::String(s)) if s.is_empty() => {
                errors.insert("barrelId".into(), json!([messages::BARREL_ID_REQUIRED]));
            }
            Some(v) if !is_uuid_value(v) => {
                errors.insert("$.barrelId".into(), json!([messages::INVALID_UUID]));
            }
            Some(_) => {}
        }
        for (field, required) in [
            ("dirtLevel", messages::DIRT_LEVEL_REQUIRED),
            ("weight", messages::WEIGHT_REQUIRED),
        ] {
            match obj.get(field).map(Value::as_f64) {
                None => {
                    errors.insert(field.into(), json!([required]));
                }
                Some(Some(f)) if f == 0.0 => {
                    errors.insert(field.into(), json!([required]));
                }
                Some(Some(f)) if f < 0.0 => {
                    errors.insert(field.into(), json!([format!("{field} must be positive")]));
                }
                Some(Some(_)) => {}
                Some(None) => {
                    errors.insert(field.into(), json!([format!("{field} must be number")]));
                }
            }
        }
        if errors.is_empty() {
            let barrel_id = obj.get("barrelId").and_then(Value::as_str).unwrap_or_default();
            if find(&self.barrels, barrel_id).is_none() {
                errors.insert("barrelId".into(), json!(["unknown barrel"]));
            }
        }
        if !errors.is_empty() {
            return validation_error(Value::Object(errors));
        }

        self.measurements.push(obj.clone());
        StubResponse::json(200, &Value::Object(obj))
    }
}

fn find<'a>(records: &'a [Map<String, Value>], id: &str) -> Option<&'a Map<String, Value>> {
    records
        .iter()
        .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
}

fn parse_object(body: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(body) {
        Ok(Value::Object(obj)) => Some(obj),
        _ => None,
    }
}

fn is_uuid_value(v: &Value) -> bool {
    v.as_str().is_some_and(|s| uuid::Uuid::parse_str(s).is_ok())
}

fn validation_error(errors: Value) -> StubResponse {
    StubResponse::json(400, &json!({"title": VALIDATION_TITLE, "errors": errors}))
}
