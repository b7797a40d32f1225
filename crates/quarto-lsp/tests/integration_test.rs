//! Integration tests for the Quarto LSP server.
//!
//! These tests spawn the LSP server as a subprocess and communicate
//! with it over stdio using JSON-RPC. The harness plays the editor: it
//! answers the server's `quarto/executeProvider`,
//! `quarto/openVirtualDocument` and `workspace/applyEdit` requests.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

use serde_json::{Value, json};

/// Create a JSON-RPC request with the given method and params.
fn make_request(id: i32, method: &str, params: Value) -> String {
    let request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    });
    frame(&request)
}

/// Create a JSON-RPC notification (no id) with the given method and params.
fn make_notification(method: &str, params: Value) -> String {
    let request = json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params
    });
    frame(&request)
}

/// Create a JSON-RPC response to a server-initiated request.
fn make_response(id: &Value, result: Value) -> String {
    let response = json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    });
    frame(&response)
}

fn frame(message: &Value) -> String {
    let content = serde_json::to_string(message).unwrap();
    format!("Content-Length: {}\r\n\r\n{}", content.len(), content)
}

/// Read a single LSP message from the reader.
fn read_message(reader: &mut BufReader<std::process::ChildStdout>) -> Value {
    // Read headers up to the blank line
    let mut content_length = None;
    loop {
        let mut header_line = String::new();
        reader
            .read_line(&mut header_line)
            .expect("Failed to read response header");
        let header = header_line.trim();
        if header.is_empty() {
            break;
        }
        if let Some(length) = header.strip_prefix("Content-Length: ") {
            content_length = Some(length.parse::<usize>().expect("Invalid Content-Length"));
        }
    }
    let content_length = content_length.expect("Missing Content-Length header");

    // Read content
    let mut content = vec![0u8; content_length];
    reader
        .read_exact(&mut content)
        .expect("Failed to read response content");
    let content_str = String::from_utf8(content).expect("Invalid UTF-8 in response");

    serde_json::from_str(&content_str).expect("Failed to parse response JSON")
}

/// A server-initiated request the harness answered.
#[derive(Debug, Clone)]
struct ServerRequest {
    method: String,
    params: Value,
}

/// What the fake editor knows when a provider runs.
#[derive(Debug, Clone)]
struct ProviderCall {
    params: Value,
    /// Content of the virtual document at the time of the call.
    content: Option<String>,
}

/// Test harness for LSP integration tests.
struct LspTestHarness {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    next_request_id: i32,
    temp_dir: tempfile::TempDir,
    server_requests: Vec<ServerRequest>,
    provider_calls: Vec<ProviderCall>,
}

fn file_path(uri: &str) -> Option<PathBuf> {
    uri.strip_prefix("file://").map(PathBuf::from)
}

impl LspTestHarness {
    /// Create a new test harness by spawning the LSP server.
    fn new() -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_quarto-lsp"))
            .arg("--stdio")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn quarto-lsp");

        let stdin = child.stdin.take().expect("Failed to get stdin");
        let stdout = child.stdout.take().expect("Failed to get stdout");
        let reader = BufReader::new(stdout);

        Self {
            child,
            stdin,
            reader,
            next_request_id: 1,
            temp_dir: tempfile::tempdir().expect("Failed to create temp dir"),
            server_requests: Vec::new(),
            provider_calls: Vec::new(),
        }
    }

    fn write(&mut self, message: &str) {
        self.stdin
            .write_all(message.as_bytes())
            .expect("Failed to write message");
        self.stdin.flush().expect("Failed to flush stdin");
    }

    /// Answer a request the server sent to the client.
    fn answer(&mut self, id: &Value, method: &str, params: Value) {
        self.server_requests.push(ServerRequest {
            method: method.to_string(),
            params: params.clone(),
        });

        let result = match method {
            "quarto/executeProvider" => {
                let uri = params["uri"].as_str().unwrap_or_default();
                let content = if uri.starts_with("quarto-vdoc:") {
                    let reply = self.request_inline(
                        "quarto/embeddedContent",
                        json!({ "uri": uri }),
                    );
                    reply["result"].as_str().map(str::to_string)
                } else {
                    file_path(uri).and_then(|path| std::fs::read_to_string(path).ok())
                };
                self.provider_calls.push(ProviderCall {
                    params: params.clone(),
                    content,
                });
                provider_result(&params)
            }
            "workspace/applyEdit" => {
                for change in params["edit"]["documentChanges"].as_array().into_iter().flatten() {
                    if change["kind"] == "delete" {
                        if let Some(path) = change["uri"].as_str().and_then(file_path) {
                            let _ = std::fs::remove_file(path);
                        }
                    }
                }
                json!({ "applied": true })
            }
            _ => Value::Null,
        };
        let response = make_response(id, result);
        self.write(&response);
    }

    /// Send a request while already answering a server request. The server
    /// may interleave further messages; only the matching response is taken.
    fn request_inline(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_request_id;
        self.next_request_id += 1;
        let request = make_request(id, method, params);
        self.write(&request);
        loop {
            let message = read_message(&mut self.reader);
            if message.get("method").is_none()
                && message.get("id").and_then(Value::as_i64) == Some(id as i64)
            {
                return message;
            }
        }
    }

    /// Send a request and return the response, answering any server
    /// requests that arrive first.
    fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_request_id;
        self.next_request_id += 1;

        let request = make_request(id, method, params);
        self.write(&request);

        loop {
            let message = read_message(&mut self.reader);
            match (message.get("method").and_then(Value::as_str), message.get("id")) {
                // Server-to-client request
                (Some(method), Some(server_id)) => {
                    let method = method.to_string();
                    let server_id = server_id.clone();
                    self.answer(&server_id, &method, message["params"].clone());
                }
                // Notification
                (Some(_), None) => {}
                (None, Some(response_id)) if response_id.as_i64() == Some(id as i64) => {
                    return message;
                }
                _ => {}
            }
        }
    }

    /// Send a notification (no response expected).
    fn notify(&mut self, method: &str, params: Value) {
        let notification = make_notification(method, params);
        self.write(&notification);
    }

    /// Initialize the LSP server.
    fn initialize(&mut self) -> Value {
        let params = json!({
            "processId": std::process::id(),
            "capabilities": {
                "workspace": {
                    "workspaceEdit": { "resourceOperations": ["delete"] }
                }
            },
            "rootUri": null,
            "initializationOptions": {
                "tempDir": self.temp_dir.path()
            }
        });
        let response = self.request("initialize", params);

        // Send initialized notification
        self.notify("initialized", json!({}));

        response
    }

    /// Open a text document.
    fn open_document(&mut self, uri: &str, content: &str, version: i32) {
        let params = json!({
            "textDocument": {
                "uri": uri,
                "languageId": "quarto",
                "version": version,
                "text": content
            }
        });
        self.notify("textDocument/didOpen", params);
    }

    /// Change a text document (full sync).
    fn change_document(&mut self, uri: &str, content: &str, version: i32) {
        let params = json!({
            "textDocument": {
                "uri": uri,
                "version": version
            },
            "contentChanges": [
                { "text": content }
            ]
        });
        self.notify("textDocument/didChange", params);
    }

    fn completion(&mut self, uri: &str, line: u32, character: u32, trigger: Option<&str>) -> Value {
        let mut params = json!({
            "textDocument": { "uri": uri },
            "position": { "line": line, "character": character }
        });
        if let Some(trigger) = trigger {
            params["context"] = json!({ "triggerKind": 2, "triggerCharacter": trigger });
        }
        self.request("textDocument/completion", params)
    }

    fn hover(&mut self, uri: &str, line: u32, character: u32) -> Value {
        let params = json!({
            "textDocument": { "uri": uri },
            "position": { "line": line, "character": character }
        });
        self.request("textDocument/hover", params)
    }

    fn methods(&self) -> Vec<&str> {
        self.server_requests
            .iter()
            .map(|request| request.method.as_str())
            .collect()
    }
}

impl Drop for LspTestHarness {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

/// The fake editor's provider: echoes the request so tests can inspect it.
fn provider_result(params: &Value) -> Value {
    let uri = params["uri"].as_str().unwrap_or_default();
    match params["kind"].as_str() {
        Some("completion") => json!({
            "kind": "completion",
            "result": { "isIncomplete": false, "items": [{ "label": "summary", "detail": uri }] }
        }),
        Some("hover") => json!({
            "kind": "hover",
            "result": { "contents": format!("hover at {}", params["position"]["line"]) }
        }),
        _ => json!({ "kind": "signatureHelp", "result": null }),
    }
}

const R_DOC: &str = "# Analysis\n\n```{r}\nsummary(x)\n```\n";

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_initialize() {
    let mut harness = LspTestHarness::new();
    let response = harness.initialize();

    let result = &response["result"];
    assert_eq!(result["serverInfo"]["name"], "quarto-lsp");

    let caps = &result["capabilities"];
    assert!(caps.get("textDocumentSync").is_some());
    assert_eq!(caps["hoverProvider"], true);
    assert!(caps.get("signatureHelpProvider").is_some());

    let triggers = caps["completionProvider"]["triggerCharacters"]
        .as_array()
        .expect("Missing completion trigger characters");
    assert!(triggers.contains(&json!("$")));
    assert!(triggers.contains(&json!(".")));
}

// =============================================================================
// Embedded Language Tests
// =============================================================================

#[test]
fn test_completion_in_r_block_uses_temp_file() {
    let mut harness = LspTestHarness::new();
    harness.initialize();

    let uri = "file:///test/analysis.qmd";
    harness.open_document(uri, R_DOC, 1);

    let response = harness.completion(uri, 3, 7, None);
    let items = response["result"]["items"].as_array().expect("Missing items");
    assert_eq!(items[0]["label"], "summary");

    assert_eq!(
        harness.methods(),
        vec![
            "quarto/openVirtualDocument",
            "quarto/executeProvider",
            "workspace/applyEdit"
        ]
    );

    let call = &harness.provider_calls[0];
    let vdoc_uri = call.params["uri"].as_str().unwrap();
    assert!(vdoc_uri.ends_with("/r/intellisense.r"), "{vdoc_uri}");
    assert_eq!(call.params["position"], json!({ "line": 3, "character": 7 }));
    assert_eq!(call.content.as_deref(), Some("\n\n\nsummary(x)\n\n"));

    // The delete edit removed the file
    assert!(!file_path(vdoc_uri).unwrap().exists());
}

#[test]
fn test_hover_in_css_block_uses_content_provider() {
    let mut harness = LspTestHarness::new();
    harness.initialize();

    let uri = "file:///test/styles.qmd";
    harness.open_document(uri, "Text\n\n```{css}\n.title { color: red }\n```\n", 1);

    let response = harness.hover(uri, 3, 2);
    assert_eq!(response["result"]["contents"]["value"], "hover at 3");

    assert_eq!(harness.methods(), vec!["quarto/executeProvider"]);
    let call = &harness.provider_calls[0];
    assert!(
        call.params["uri"]
            .as_str()
            .unwrap()
            .starts_with("quarto-vdoc://css/")
    );
    assert_eq!(
        call.content.as_deref(),
        Some("\n\n\n.title { color: red }\n\n")
    );
}

#[test]
fn test_requests_outside_blocks_fall_back() {
    let mut harness = LspTestHarness::new();
    harness.initialize();

    let uri = "file:///test/analysis.qmd";
    harness.open_document(uri, R_DOC, 1);

    let response = harness.completion(uri, 0, 3, None);
    assert!(response["result"].is_null());
    let response = harness.hover(uri, 2, 1);
    assert!(response["result"].is_null());
    assert!(harness.server_requests.is_empty());
}

#[test]
fn test_undeclared_trigger_is_empty_without_provider() {
    let mut harness = LspTestHarness::new();
    harness.initialize();

    let uri = "file:///test/python.qmd";
    harness.open_document(uri, "```{python}\nimport os\nos.\n```\n", 1);

    let response = harness.completion(uri, 2, 3, Some("$"));
    assert_eq!(response["result"]["items"], json!([]));
    assert!(harness.server_requests.is_empty());

    harness.completion(uri, 2, 3, Some("."));
    let call = &harness.provider_calls[0];
    assert_eq!(call.params["triggerCharacter"], ".");
    assert_eq!(call.content.as_deref(), Some("# type: ignore\nimport os\nos.\n\n"));
}

#[test]
fn test_changes_are_seen_by_later_requests() {
    let mut harness = LspTestHarness::new();
    harness.initialize();

    let uri = "file:///test/analysis.qmd";
    harness.open_document(uri, R_DOC, 1);
    harness.completion(uri, 3, 0, None);

    harness.change_document(uri, "```{r}\nmean(y)\n```\n", 2);
    harness.completion(uri, 1, 0, None);

    assert_eq!(harness.provider_calls.len(), 2);
    assert_eq!(
        harness.provider_calls[1].content.as_deref(),
        Some("\nmean(y)\n\n")
    );
}
