//! Verifies the per-phase informational trace.

use std::io::Write;
use std::sync::{Arc, Mutex};

use load_actor::{HttpActor, PhaseDecl, RequestCounters, WorkloadConfig};
use test_utils::RecordingServer;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

struct LogWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

fn capture_run(config: &WorkloadConfig) -> String {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .finish();

    let actor = HttpActor::from_config(config, RequestCounters::new(), 0).unwrap();
    tracing::subscriber::with_default(subscriber, || {
        actor.run().unwrap();
    });

    capture.contents()
}

#[test]
fn active_phase_logs_one_line_naming_the_target() {
    let server = RecordingServer::start();
    let base = server.base_url();
    let config = WorkloadConfig {
        name: "trace".to_string(),
        description: String::new(),
        base_url: base.clone(),
        actors: 1,
        timeout_secs: 5,
        seed: None,
        phases: vec![PhaseDecl {
            nop: false,
            route: Some("/ping".to_string()),
            operation: Some("GET".to_string()),
            repeat: 3,
            body: None,
        }],
    };

    let logs = capture_run(&config);
    assert_eq!(logs.matches("sending requests to").count(), 1);
    assert!(logs.contains(&format!("{base}/ping")));
}

#[test]
fn nop_phases_log_nothing() {
    let config = WorkloadConfig {
        name: "trace".to_string(),
        description: String::new(),
        base_url: "http://localhost:9999".to_string(),
        actors: 1,
        timeout_secs: 5,
        seed: None,
        phases: vec![
            PhaseDecl {
                nop: true,
                route: None,
                operation: None,
                repeat: 1,
                body: None,
            };
            2
        ],
    };

    let logs = capture_run(&config);
    assert!(!logs.contains("sending requests to"));
}
