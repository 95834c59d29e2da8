use documate::client::{self, DocumentService};
use documate::models::Author;
use documate::staging::StagedFile;
use documate::{ApiError, Config, HttpDocumentService, SendOutcome, Workspace};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

struct Captured {
    head: String,
    body: Vec<u8>,
}

impl Captured {
    fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_lowercase());
        self.head
            .lines()
            .find(|line| line.to_lowercase().starts_with(&prefix))
            .map(|line| line[prefix.len()..].trim().to_string())
    }

    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// Answers one connection per canned response, in order, and hands back what
/// each request looked like.
async fn serve(responses: Vec<(&'static str, &'static str)>) -> (Config, JoinHandle<Vec<Captured>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut captured = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            captured.push(read_request(&mut socket).await);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
        captured
    });
    (Config::new(&format!("http://{}", addr)).unwrap(), handle)
}

async fn read_request(socket: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before the request head");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let lower = head.to_lowercase();
    let content_length = lower
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .map(|value| value.trim().parse::<usize>().unwrap());
    let chunked = lower.contains("transfer-encoding: chunked");

    loop {
        let done = match content_length {
            Some(len) => buf.len() - header_end >= len,
            None if chunked => buf.ends_with(b"0\r\n\r\n"),
            None => true,
        };
        if done {
            break;
        }
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Captured {
        head,
        body: buf[header_end..].to_vec(),
    }
}

fn pdf(name: &str) -> StagedFile {
    StagedFile::from_bytes(name, b"%PDF-1.7 fake document".to_vec()).unwrap()
}

#[tokio::test]
async fn test_upload_sends_multipart_file_field() {
    let (config, server) = serve(vec![(
        "200 OK",
        r#"{"pdf_id":"abc123","message":"PDF uploaded successfully"}"#,
    )])
    .await;
    let service = HttpDocumentService::new(&config).unwrap();

    let response = service
        .submit_document("report.pdf", b"%PDF-1.7 fake document")
        .await
        .unwrap();
    assert_eq!(response.pdf_id, "abc123");
    assert_eq!(response.message, "PDF uploaded successfully");

    let captured = server.await.unwrap();
    let request = &captured[0];
    assert!(request.request_line().starts_with("POST /upload "));
    assert!(request
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data; boundary="));
    let body = request.body_text();
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="report.pdf""#));
    assert!(body.contains("application/pdf"));
    assert!(body.contains("%PDF-1.7 fake document"));
}

#[tokio::test]
async fn test_query_sends_json_body() {
    let (config, server) = serve(vec![(
        "200 OK",
        r#"{"pdf_id":"abc123","query":"What is the summary?","answer":"A short summary."}"#,
    )])
    .await;
    let service = HttpDocumentService::new(&config).unwrap();

    let response = service
        .submit_question("abc123", "What is the summary?")
        .await
        .unwrap();
    assert_eq!(response.answer, "A short summary.");
    assert_eq!(response.pdf_id, "abc123");

    let captured = server.await.unwrap();
    let request = &captured[0];
    assert!(request.request_line().starts_with("POST /query "));
    assert_eq!(request.header("content-type").unwrap(), "application/json");
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "pdf_id": "abc123", "query": "What is the summary?" })
    );
}

#[tokio::test]
async fn test_non_2xx_becomes_server_error() {
    let (config, server) = serve(vec![
        ("500 Internal Server Error", r#"{"detail":"boom"}"#),
        ("413 Payload Too Large", "{}"),
    ])
    .await;
    let service = HttpDocumentService::new(&config).unwrap();

    let err = service.submit_question("abc123", "hi").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Server {
            status: 500,
            status_text: "Query failed: Internal Server Error".to_string(),
        }
    );

    let err = service
        .submit_document("big.pdf", b"%PDF")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(413));
    assert_eq!(
        err,
        ApiError::Server {
            status: 413,
            status_text: "Upload failed: Payload Too Large".to_string(),
        }
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_status_text_uses_standard_reason_phrase() {
    let (config, server) = serve(vec![("503 Model Warming Up", "{}")]).await;
    let service = HttpDocumentService::new(&config).unwrap();

    let err = service.submit_question("abc123", "hi").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Server {
            status: 503,
            status_text: "Query failed: Service Unavailable".to_string(),
        }
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_undecodable_body_is_network_error() {
    let (config, server) = serve(vec![("200 OK", "not json")]).await;
    let service = HttpDocumentService::new(&config).unwrap();

    let err = service.submit_question("abc123", "hi").await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(err.status(), None);
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config::new(&format!("http://{}", addr)).unwrap();
    let service = HttpDocumentService::new(&config).unwrap();
    let err = client::upload(&service, &pdf("report.pdf")).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}

#[tokio::test]
async fn test_upload_then_ask() {
    let (config, server) = serve(vec![
        (
            "200 OK",
            r#"{"pdf_id":"abc123","message":"PDF uploaded successfully"}"#,
        ),
        (
            "200 OK",
            r#"{"pdf_id":"abc123","query":"What is the summary?","answer":"It covers Q3 results."}"#,
        ),
        ("500 Internal Server Error", "{}"),
    ])
    .await;
    let service = HttpDocumentService::new(&config).unwrap();
    let mut workspace = Workspace::new();

    let document = client::upload(&service, &pdf("report.pdf")).await.unwrap();
    let welcome = document.welcome_text();
    workspace.add_document(document, &welcome);
    assert_eq!(workspace.documents().len(), 1);
    assert_eq!(workspace.active_id(), Some("abc123"));
    assert_eq!(workspace.session("abc123").unwrap().len(), 1);

    let outcome = workspace
        .send_user_message(&service, "What is the summary?")
        .await;
    assert_eq!(outcome, SendOutcome::Answered);

    let outcome = workspace.send_user_message(&service, "And Q4?").await;
    assert!(matches!(
        outcome,
        SendOutcome::Failed(ApiError::Server { status: 500, .. })
    ));

    let session = workspace.session("abc123").unwrap();
    let transcript: Vec<_> = session
        .iter()
        .map(|m| (m.author, m.text.as_str()))
        .collect();
    assert_eq!(
        transcript,
        vec![
            (Author::Assistant, welcome.as_str()),
            (Author::User, "What is the summary?"),
            (Author::Assistant, "It covers Q3 results."),
            (Author::User, "And Q4?"),
        ]
    );
    server.await.unwrap();
}
