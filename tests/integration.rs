use predicates::prelude::*;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::Command;
use std::thread;
use tempfile::{NamedTempFile, TempDir};

fn cmd(bin: &str) -> assert_cmd::Command {
    let path = match bin {
        "py2doc" => env!("CARGO_BIN_EXE_py2doc"),
        "doc2md" => env!("CARGO_BIN_EXE_doc2md"),
        _ => env!("CARGO_BIN_EXE_md2html"),
    };
    assert_cmd::Command::from(Command::new(path))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn extract(args: &[&str]) -> serde_json::Value {
    let assert = cmd("py2doc").args(args).assert().success();
    serde_json::from_slice(&assert.get_output().stdout).unwrap()
}

// -- py2doc --

#[test]
fn py2doc_writes_tree_to_stdout() {
    let doc = extract(&[&fixture_path("shapes.py")]);
    assert_eq!(doc["version"], env!("CARGO_PKG_VERSION"));

    let module = &doc["content"][0];
    assert_eq!(module["type"], "Module");
    assert_eq!(module["name"], "shapes");
    assert_eq!(module["location"][1], 1);

    let square = &module["content"][0];
    assert_eq!(square["type"], "Class");
    assert_eq!(square["location"][1], 11);
    assert_eq!(square["text"], serde_json::json!([[null, "A square with a side length."]]));

    let init = &square["content"][0];
    assert_eq!(init["name"], "__init__");
    assert_eq!(init["text"], serde_json::json!([]));

    let area = &square["content"][1];
    assert_eq!(
        area["text"][0],
        serde_json::json!(["python", "def area(self) -> int: ...\n"])
    );

    let fetch = &module["content"][1];
    assert_eq!(
        fetch["text"],
        serde_json::json!([
            ["python", "async def fetch_shape(name): ...\n"],
            [null, "Fetch a shape by name."]
        ])
    );
}

#[test]
fn py2doc_module_name_override() {
    let spec = format!("{}:geometry", fixture_path("shapes.py"));
    let doc = extract(&[&spec]);
    assert_eq!(doc["content"][0]["name"], "geometry");
}

#[test]
fn py2doc_multiple_inputs_keep_order() {
    let dir = TempDir::new().unwrap();
    let other = dir.path().join("other.py");
    std::fs::write(&other, "\"\"\"Other.\"\"\"\n").unwrap();

    let doc = extract(&[other.to_str().unwrap(), &fixture_path("shapes.py")]);
    assert_eq!(doc["content"][0]["name"], "other");
    assert_eq!(doc["content"][1]["name"], "shapes");
}

#[test]
fn py2doc_output_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("doc.json");

    cmd("py2doc")
        .args(["-o", out.to_str().unwrap()])
        .arg(fixture_path("shapes.py"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let json = std::fs::read_to_string(out).unwrap();
    assert!(json.contains("\"name\": \"shapes\""));
}

#[test]
fn py2doc_syntax_error_fails() {
    cmd("py2doc")
        .arg(fixture_path("broken.py"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn py2doc_missing_file_fails() {
    cmd("py2doc")
        .arg("does-not-exist.py")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.py"));
}

#[test]
fn py2doc_unmatched_pattern_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = format!("{}/*.py", dir.path().display());
    cmd("py2doc")
        .arg(&pattern)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no files matched"));
}

#[test]
fn py2doc_input_encoding() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.py");
    std::fs::write(&path, b"def f():\n    \"\"\"R\xe9sum\xe9.\"\"\"\n").unwrap();

    let doc = extract(&["-e", "latin1", path.to_str().unwrap()]);
    assert_eq!(doc["content"][0]["content"][0]["text"][1], serde_json::json!([null, "Résumé."]));

    cmd("py2doc")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to decode"));

    cmd("py2doc")
        .args(["-e", "klingon"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown encoding"));
}

#[test]
fn py2doc_requires_input() {
    cmd("py2doc").assert().failure();
}

// -- doc2md --

#[test]
fn doc2md_renders_fixture() {
    let dir = TempDir::new().unwrap();
    let json = dir.path().join("shapes.json");
    cmd("py2doc")
        .args(["-o", json.to_str().unwrap()])
        .arg(fixture_path("shapes.py"))
        .assert()
        .success();

    let assert = cmd("doc2md")
        .args(["-i", json.to_str().unwrap()])
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let expected = std::fs::read_to_string(fixture_path("shapes.expected.md")).unwrap();
    assert_eq!(output, expected);
}

#[test]
fn doc2md_reads_stdin_and_writes_file() {
    let json = cmd("py2doc")
        .arg(fixture_path("shapes.py"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("shapes.md");

    cmd("doc2md")
        .args(["-o", out.to_str().unwrap(), "-l", "2", "-u", "src/{path}#L{line}"])
        .write_stdin(json)
        .assert()
        .success();

    let md = std::fs::read_to_string(out).unwrap();
    let shapes = fixture_path("shapes.py");
    assert!(md.starts_with(&format!("## Module [shapes](src/{}#L1)\n", shapes)));
    assert!(md.contains(&format!("#### Function [shapes.Square.area](src/{}#L17)\n", shapes)));
}

#[test]
fn doc2md_rejects_level_zero() {
    cmd("doc2md")
        .args(["-l", "0"])
        .write_stdin("{}")
        .assert()
        .failure();
}

#[test]
fn doc2md_rejects_other_versions() {
    let mut input = NamedTempFile::new().unwrap();
    input
        .write_all(br#"{"version": "0.1.0", "content": []}"#)
        .unwrap();

    cmd("doc2md")
        .args(["-i", input.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported document version 0.1.0"));
}

// -- md2html --

/// Answer a single HTTP request with `status` and `body`; the handle
/// yields the raw request.
fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/markdown", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
        request
    });
    (url, handle)
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request = String::new();
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        if line == "\r\n" || line.is_empty() {
            break;
        }
        if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap();
        }
        request.push_str(&line);
    }
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).unwrap();
    request.push_str(&String::from_utf8(body).unwrap());
    request
}

#[test]
fn md2html_wraps_api_output() {
    let (url, server) = serve_once("200 OK", "<h2>Function m.f</h2>\n<p>Hi</p>");
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("doc.md");
    let output = dir.path().join("doc.html");
    std::fs::write(&input, "## Function m.f\nHi\n").unwrap();

    cmd("md2html")
        .arg(&input)
        .arg(&output)
        .args(["--api-url", &url, "--token", "secret"])
        .assert()
        .success();

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /markdown "));
    assert!(request.contains("Authorization: Bearer secret"));
    assert!(request.contains(r#""mode":"gfm""#));
    assert!(request.contains(r###""text":"## Function m.f\nHi\n""###));

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<h2 id=\"function-m-f\">Function m.f</h2>"));
}

#[test]
fn md2html_api_error_writes_nothing() {
    let (url, server) = serve_once("422 Unprocessable Entity", r#"{"message":"Invalid request"}"#);
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("doc.md");
    let output = dir.path().join("doc.html");
    std::fs::write(&input, "# Module m\n").unwrap();

    cmd("md2html")
        .arg(&input)
        .arg(&output)
        .env("MICRODOC_API_URL", &url)
        .env_remove("GITHUB_TOKEN")
        .assert()
        .failure()
        .stderr(predicate::str::contains("422").and(predicate::str::contains("Invalid request")));

    let request = server.join().unwrap();
    assert!(!request.to_ascii_lowercase().contains("authorization:"));
    assert!(!output.exists());
}
