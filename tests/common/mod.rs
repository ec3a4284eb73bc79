#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tiny_http::{Response, Server};

/// Local HTTP service answering a fixed route table; everything else is 404.
pub struct TestService {
    server: Arc<Server>,
    base_url: String,
    hits: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl TestService {
    /// `routes`: `(path, status, body)`.
    pub fn start(routes: &[(&str, u16, &str)]) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind test server"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("test server listens on tcp");
        let table: HashMap<String, (u16, String)> = routes
            .iter()
            .map(|(p, s, b)| (p.to_string(), (*s, b.to_string())))
            .collect();
        let hits = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let server = Arc::clone(&server);
            let hits = Arc::clone(&hits);
            thread::spawn(move || {
                for request in server.incoming_requests() {
                    let path = request.url().to_string();
                    hits.lock().unwrap().push(path.clone());
                    let (status, body) = table
                        .get(&path)
                        .cloned()
                        .unwrap_or((404, "not found".to_string()));
                    let _ = request.respond(Response::from_string(body).with_status_code(status));
                }
            })
        };

        Self {
            server,
            base_url: format!("http://{}", addr),
            hits,
            handle: Some(handle),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request paths in arrival order.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A base URL nothing listens on.
pub fn closed_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
