#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub work: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        let work = tmp.path().join("work");
        fs::create_dir_all(&home).expect("create isolated home");
        fs::create_dir_all(&work).expect("create work dir");
        Self {
            _tmp: tmp,
            home,
            work,
        }
    }

    /// `validkit` with an isolated HOME and no ambient key or endpoint.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("validkit");
        cmd.env("HOME", &self.home)
            .env("NO_COLOR", "1")
            .env_remove("VALIDKIT_API_KEY")
            .env_remove("VALIDKIT_API_URL")
            .env_remove("VALIDKIT_LOG")
            .env("NO_PROXY", "127.0.0.1,localhost")
            .current_dir(&self.work);
        cmd
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join(".validkit").join("config.json")
    }

    pub fn write_input(&self, name: &str, content: &str) -> PathBuf {
        let path = self.work.join(name);
        fs::write(&path, content).expect("write input file");
        path
    }
}

/// Request captured by [`serve_once`].
#[derive(Debug)]
pub struct Captured {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Answer exactly one HTTP request with `status` and a JSON `body`.
pub fn serve_once(status: u16, body: &str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
    let url = format!("http://{}", listener.local_addr().expect("local addr"));
    let body = body.to_owned();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("request line");

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("header line");
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((k, v)) = line.split_once(':') {
                headers.push((k.trim().to_owned(), v.trim().to_owned()));
            }
        }

        let len = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);
        let mut buf = vec![0; len];
        reader.read_exact(&mut buf).expect("request body");

        let mut stream = stream;
        let response = format!(
            "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).expect("write response");

        Captured {
            request_line: request_line.trim_end().to_owned(),
            headers,
            body: String::from_utf8(buf).expect("utf8 body"),
        }
    });

    (url, handle)
}
