//! A tiny HTTP server which answers with canned responses, so the GitHub
//! client can be exercised without a network connection.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

/// A canned response for requests to `path` (the query string is ignored).
#[derive(Debug, Clone)]
pub struct Route {
    pub path: &'static str,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn new<S: Into<String>>(path: &'static str, status: u16, body: S) -> Route {
        Route {
            path,
            status,
            body: body.into(),
        }
    }
}

/// Start serving `routes` in the background, returning the base URL.
///
/// Anything which doesn't match a route gets a `404`.
pub fn serve(routes: Vec<Route>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => respond(stream, &routes),
                Err(_) => break,
            }
        }
    });

    format!("http://{}", addr)
}

fn respond(mut stream: TcpStream, routes: &[Route]) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }

    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) if header == "\r\n" || header == "\n" => break,
            Ok(_) => {}
        }
    }

    let target = request_line.split_whitespace().nth(1).unwrap_or("");
    let path = target.split('?').next().unwrap_or("");

    let (status, body) = match routes.iter().find(|r| r.path == path) {
        Some(route) => (route.status, route.body.as_str()),
        None => (404, r#"{"message": "Not Found"}"#),
    };

    let response = format!(
        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).ok();
    stream.flush().ok();
}
