use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use agentplug_core::config::{ToolServerConfig, ToolTransport};
use agentplug_core::error::ToolError;
use agentplug_core::traits::ToolServer;
use agentplug_core::types::RemoteTool;
use agentplug_core::FunctionRegistry;
use agentplug_tools::{connect, mount_configured, mount_server, mounted_name, HttpLaunch, HttpToolServer, StdioLaunch, StdioToolServer};

struct FakeServer {
    calls: Mutex<Vec<(String, Value)>>,
}

#[async_trait]
impl ToolServer for FakeServer {
    fn name(&self) -> &str { "fake" }

    async fn list_tools(&self) -> Result<Vec<RemoteTool>, ToolError> {
        Ok(vec![
            RemoteTool { name: "read_file".into(), description: Some("Read a file".into()), input_schema: json!({"type": "object"}) },
            RemoteTool { name: "fail".into(), description: None, input_schema: json!({"type": "object"}) },
        ])
    }

    async fn call_tool(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.calls.lock().unwrap().push((tool.to_string(), args));
        match tool {
            "fail" => Ok(json!({"content": [{"type": "text", "text": "access denied"}], "isError": true})),
            _ => Ok(json!({"content": [{"type": "text", "text": "file body"}]})),
        }
    }
}

#[tokio::test]
async fn mounted_tools_are_prefixed_and_forwarded() {
    let server = Arc::new(FakeServer { calls: Mutex::new(vec![]) });
    let mut registry = FunctionRegistry::new();

    let count = mount_server(&mut registry, "filesystem", server.clone()).await.expect("mount");
    assert_eq!(count, 2);
    assert!(registry.contains("filesystem-read_file"));
    assert_eq!(registry.descriptor("filesystem-read_file").unwrap().description, "Read a file");

    let out = registry.invoke("filesystem-read_file", json!({"path": "/projects/a.txt"})).await.expect("invoke");
    assert_eq!(out, json!("file body"));
    assert_eq!(server.calls.lock().unwrap()[0], ("read_file".to_string(), json!({"path": "/projects/a.txt"})));

    let err = registry.invoke("filesystem-fail", Value::Null).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ToolError>(), Some(ToolError::Reported { message, .. }) if message == "access denied"));
    assert_eq!(server.calls.lock().unwrap()[1].1, json!({}), "null arguments become an empty object");
}

#[tokio::test]
async fn mounting_twice_under_same_prefix_is_rejected() {
    let server = Arc::new(FakeServer { calls: Mutex::new(vec![]) });
    let mut registry = FunctionRegistry::new();
    mount_server(&mut registry, "fs", server.clone()).await.unwrap();
    let err = mount_server(&mut registry, "fs", server).await.unwrap_err();
    assert!(matches!(err, ToolError::Duplicate(name) if name == "fs-read_file"));
}

#[test]
fn mounted_names_are_sanitised() {
    assert_eq!(mounted_name("filesystem", "read_file"), "filesystem-read_file");
    assert_eq!(mounted_name("github", "repos/get content"), "github-repos_get_content");
}

#[tokio::test]
async fn disabled_servers_are_skipped() {
    let servers = vec![ToolServerConfig {
        name: "off".into(),
        prefix: "off".into(),
        enabled: false,
        transport: ToolTransport::Stdio { command: "does-not-exist".into(), args: vec![], env: Default::default(), require_dir: None, timeout_secs: 60 },
    }];
    let mut registry = FunctionRegistry::new();
    let mounted = mount_configured(&mut registry, &servers).await.expect("skip");
    assert!(mounted.is_empty());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn missing_required_directory_stops_startup() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let launch = StdioLaunch {
        command: "sh".into(),
        require_dir: Some(missing.display().to_string()),
        ..StdioLaunch::default()
    };
    let err = StdioToolServer::spawn("filesystem", &launch).await.err().expect("should fail");
    assert!(matches!(err, ToolError::NotFound(msg) if msg.contains("nope")));
}

#[tokio::test]
async fn unknown_command_is_a_server_error() {
    let cfg = ToolServerConfig {
        name: "ghost".into(),
        prefix: "ghost".into(),
        enabled: true,
        transport: ToolTransport::Stdio { command: "agentplug-no-such-binary".into(), args: vec![], env: Default::default(), require_dir: None, timeout_secs: 60 },
    };
    let err = connect(&cfg).await.err().expect("should fail");
    assert!(matches!(err, ToolError::Server { server, .. } if server == "ghost"));
}

#[tokio::test]
async fn unset_variables_in_server_config_fail_startup() {
    let cfg = ToolServerConfig {
        name: "github".into(),
        prefix: "github".into(),
        enabled: true,
        transport: ToolTransport::Http {
            endpoint: "http://127.0.0.1:9/mcp".into(),
            bearer_token: Some("${AGENTPLUG_TOOLS_TEST_UNSET_PAT}".into()),
            headers: Default::default(),
            timeout_secs: 5,
        },
    };
    let err = connect(&cfg).await.err().expect("should fail");
    assert!(
        matches!(&err, ToolError::Server { server, reason } if server == "github" && reason.contains("AGENTPLUG_TOOLS_TEST_UNSET_PAT")),
        "got {err:?}"
    );

    let cfg = ToolServerConfig {
        name: "filesystem".into(),
        prefix: "filesystem".into(),
        enabled: true,
        transport: ToolTransport::Stdio {
            command: "$AGENTPLUG_TOOLS_TEST_UNSET_BIN/server".into(),
            args: vec![],
            env: Default::default(),
            require_dir: None,
            timeout_secs: 5,
        },
    };
    let err = connect(&cfg).await.err().expect("should fail");
    assert!(matches!(err, ToolError::Server { server, .. } if server == "filesystem"));
}

#[cfg(unix)]
#[tokio::test]
async fn stdio_server_handshake_list_and_call() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("server.sh");
    std::fs::write(
        &script,
        r##"while IFS= read -r line; do
  id=$(printf '%s' "$line" | sed -n 's/.*"id":\([0-9][0-9]*\).*/\1/p')
  case "$line" in
    *'"method":"initialize"'*)
      printf '{"jsonrpc":"2.0","id":%s,"result":{"protocolVersion":"2024-11-05","capabilities":{"tools":{}},"serverInfo":{"name":"fake-fs","version":"0.1.0"}}}\n' "$id" ;;
    *'"method":"tools/list"'*)
      printf '{"jsonrpc":"2.0","method":"notifications/message","params":{"level":"info","data":"listing"}}\n'
      printf '{"jsonrpc":"2.0","id":%s,"result":{"tools":[{"name":"list_directory","description":"List a directory","inputSchema":{"type":"object","properties":{"path":{"type":"string"}}}}]}}\n' "$id" ;;
    *'"method":"tools/call"'*)
      printf '{"jsonrpc":"2.0","id":%s,"result":{"content":[{"type":"text","text":"[FILE] a.txt"}]}}\n' "$id" ;;
  esac
done
"##,
    )
    .unwrap();

    let launch = StdioLaunch {
        command: "sh".into(),
        args: vec![script.display().to_string()],
        require_dir: Some(dir.path().display().to_string()),
        timeout_secs: 10,
        ..StdioLaunch::default()
    };
    let server = Arc::new(StdioToolServer::spawn("filesystem", &launch).await.expect("spawn"));
    let mut registry = FunctionRegistry::new();
    mount_server(&mut registry, "filesystem", server).await.expect("mount");
    assert_eq!(registry.descriptor("filesystem-list_directory").unwrap().description, "List a directory");

    let out = registry.invoke("filesystem-list_directory", json!({"path": "/projects"})).await.expect("call");
    assert_eq!(out, json!("[FILE] a.txt"));
}

#[cfg(unix)]
#[tokio::test]
async fn stdio_server_exit_is_reported() {
    let launch = StdioLaunch { command: "sh".into(), args: vec!["-c".into(), "exit 0".into()], ..StdioLaunch::default() };
    let err = StdioToolServer::spawn("quitter", &launch).await.err().expect("should fail");
    assert!(matches!(err, ToolError::Server { server, .. } if server == "quitter"));
}

#[cfg(unix)]
#[tokio::test]
async fn silent_stdio_server_times_out() {
    let launch = StdioLaunch {
        command: "sh".into(),
        args: vec!["-c".into(), "cat >/dev/null".into()],
        timeout_secs: 1,
        ..StdioLaunch::default()
    };
    let started = Instant::now();
    let err = StdioToolServer::spawn("mute", &launch).await.err().expect("should fail");
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(
        matches!(&err, ToolError::Server { server, reason } if server == "mute" && reason.contains("timed out")),
        "got {err:?}"
    );
}

/// Streamable HTTP endpoint answering by method and echoing request ids.
/// Requests after `initialize` must carry the session id it handed out.
struct McpEndpoint;

impl Respond for McpEndpoint {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return ResponseTemplate::new(400);
        };
        let id = body["id"].clone();
        let reply = |result: Value| json!({"jsonrpc": "2.0", "id": id.clone(), "result": result});
        let method = body["method"].as_str().unwrap_or_default();
        let session = request.headers.get("mcp-session-id").and_then(|v| v.to_str().ok());
        if method != "initialize" && session != Some("sess-42") {
            return ResponseTemplate::new(400).set_body_string("missing session");
        }
        match method {
            "initialize" => ResponseTemplate::new(200).insert_header("mcp-session-id", "sess-42").set_body_json(reply(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {"tools": {}},
                "serverInfo": {"name": "fake-github", "version": "0.1.0"}
            }))),
            "tools/list" => {
                let listed = reply(json!({"tools": [{"name": "get_me", "description": "Who am I", "inputSchema": {"type": "object"}}]}));
                ResponseTemplate::new(200).set_body_raw(format!("event: message\ndata: {listed}\n\n"), "text/event-stream")
            }
            "tools/call" if body["params"]["name"] == "get_me" => {
                ResponseTemplate::new(200).set_body_json(reply(json!({"content": [{"type": "text", "text": "octocat"}]})))
            }
            "tools/call" => ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": id, "error": {"code": -32602, "message": "unknown tool"}
            })),
            _ => ResponseTemplate::new(202),
        }
    }
}

#[tokio::test]
async fn http_server_keeps_session_and_reads_event_streams() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mcp"))
        .and(header("authorization", "Bearer secret"))
        .and(header("x-mcp-toolsets", "repos"))
        .respond_with(McpEndpoint)
        .mount(&server)
        .await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(405)).mount(&server).await;
    Mock::given(method("DELETE")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

    let launch = HttpLaunch {
        endpoint: format!("{}/mcp", server.uri()),
        bearer_token: Some("secret".into()),
        headers: [("X-MCP-Toolsets".to_string(), "repos".to_string())].into_iter().collect(),
        timeout_secs: 5,
    };
    let tools = Arc::new(HttpToolServer::connect("github", &launch).await.expect("connect"));

    let mut registry = FunctionRegistry::new();
    mount_server(&mut registry, "github", tools).await.expect("mount");
    assert_eq!(registry.descriptor("github-get_me").unwrap().description, "Who am I");

    let out = registry.invoke("github-get_me", Value::Null).await.expect("call");
    assert_eq!(out, json!("octocat"));
}

#[tokio::test]
async fn http_rpc_error_is_a_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(|request: &Request| {
            let id = serde_json::from_slice::<Value>(&request.body).map(|b| b["id"].clone()).unwrap_or(Value::Null);
            ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": id, "error": {"code": -32600, "message": "bad"}
            }))
        })
        .mount(&server)
        .await;

    let launch = HttpLaunch { endpoint: server.uri(), timeout_secs: 5, ..HttpLaunch::default() };
    let err = HttpToolServer::connect("remote", &launch).await.err().expect("should fail");
    assert!(matches!(err, ToolError::Server { server, reason } if server == "remote" && reason.contains("initialize")));
}

#[tokio::test]
async fn http_status_failure_is_a_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(500).set_body_string("boom")).mount(&server).await;

    let launch = HttpLaunch { endpoint: server.uri(), timeout_secs: 5, ..HttpLaunch::default() };
    let err = HttpToolServer::connect("remote", &launch).await.err().expect("should fail");
    assert!(matches!(err, ToolError::Server { server, .. } if server == "remote"));
}
