//! Stop request sent to the helper when the host application quits.
//!
//! Delivery is best-effort and at-most-once: the request goes out on a
//! detached thread and the quit hook never waits for the answer, because the
//! host may be tearing the process down at the same time.

use reqwest::StatusCode;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wps_zotero_core::ProxyConfig;

pub const STOP_PATH: &str = "/stopproxy";

const STOP_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopEndpoint {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl StopEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: STOP_TIMEOUT,
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(config.host.clone(), config.port)
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}{STOP_PATH}", self.host, self.port)
    }
}

/// Application-quit subscription offered by the host.
pub trait QuitNotifier {
    fn subscribe(&mut self, listener: Box<dyn FnMut()>);
}

/// Ask the helper to stop when the host quits.
pub fn register_shutdown_hook(notifier: &mut dyn QuitNotifier, endpoint: StopEndpoint) {
    tracing::debug!(url = %endpoint.url(), "Registering helper shutdown hook");
    notifier.subscribe(Box::new(move || {
        // Dropping the handle detaches the thread; its result is only logged.
        if let Err(err) = request_stop(endpoint.clone()) {
            tracing::warn!(error = %err, "Could not send the helper stop request");
        }
    }));
}

/// What the stop thread observed.
///
/// `Ok(Some(status))` when the helper answered, `Ok(None)` when the request
/// went out and the connection closed without an answer (the helper exits
/// mid-request), `Err` with [`reqwest::Error::is_connect`] set when nothing
/// was listening.
pub type StopResult = Result<Option<StatusCode>, reqwest::Error>;

/// Send `POST /stopproxy` from a detached thread.
///
/// The handle is only useful to callers that want to wait, such as the CLI.
pub fn request_stop(endpoint: StopEndpoint) -> io::Result<JoinHandle<StopResult>> {
    thread::Builder::new()
        .name("wps-zotero-stop".to_string())
        .spawn(move || send_stop(&endpoint))
}

fn send_stop(endpoint: &StopEndpoint) -> StopResult {
    let url = endpoint.url();
    let client = reqwest::blocking::Client::builder()
        .timeout(endpoint.timeout)
        .build()?;
    match client.post(&url).send() {
        Ok(response) => {
            let status = response.status();
            tracing::info!(url = %url, status = %status, "Helper stop request sent");
            Ok(Some(status))
        }
        Err(err) if err.is_connect() => {
            tracing::warn!(url = %url, error = %err, "No helper listening for the stop request");
            Err(err)
        }
        Err(err) => {
            tracing::debug!(url = %url, error = %err, "Helper stop request finished without a response");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;

    #[derive(Default)]
    struct FakeNotifier {
        listeners: Vec<Box<dyn FnMut()>>,
    }

    impl FakeNotifier {
        fn quit(&mut self) {
            for listener in &mut self.listeners {
                listener();
            }
        }
    }

    impl QuitNotifier for FakeNotifier {
        fn subscribe(&mut self, listener: Box<dyn FnMut()>) {
            self.listeners.push(listener);
        }
    }

    fn fake_helper() -> (u16, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            tx.send(request_line.trim_end().to_string()).unwrap();
            // Drop the connection without answering, like the real helper.
        });
        (port, rx)
    }

    #[test]
    fn url_points_at_stop_path() {
        assert_eq!(
            StopEndpoint::new("127.0.0.1", 21931).url(),
            "http://127.0.0.1:21931/stopproxy"
        );
    }

    #[test]
    fn stop_request_reaches_helper() {
        let (port, rx) = fake_helper();
        let result = request_stop(StopEndpoint::new("127.0.0.1", port))
            .unwrap()
            .join()
            .unwrap();
        let line = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(line, "POST /stopproxy HTTP/1.1");
        // The fake helper hangs up without answering.
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn answered_stop_reports_status() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n");
        });

        let result = request_stop(StopEndpoint::new("127.0.0.1", port))
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(result.unwrap(), Some(StatusCode::OK));
    }

    #[test]
    fn quit_hook_sends_stop_request() {
        let (port, rx) = fake_helper();
        let mut notifier = FakeNotifier::default();
        register_shutdown_hook(&mut notifier, StopEndpoint::new("127.0.0.1", port));
        assert_eq!(notifier.listeners.len(), 1);

        notifier.quit();

        let line = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(line.starts_with("POST /stopproxy"));
    }

    #[test]
    fn refused_connection_is_an_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let result = request_stop(StopEndpoint::new("127.0.0.1", port))
            .unwrap()
            .join()
            .expect("stop thread should finish cleanly");
        let err = result.expect_err("nothing is listening");
        assert!(err.is_connect());
    }
}
