use fileshare_engine::{ApiError, ArchiveRequester, ClientSettings, FileStoreClient};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> FileStoreClient {
    let settings = ClientSettings {
        base_url: Url::parse(&format!("{}/api", server.uri())).unwrap(),
        ..ClientSettings::default()
    };
    FileStoreClient::new(&settings).unwrap()
}

#[test]
fn endpoint_keeps_names_as_single_segments() {
    let client = FileStoreClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://files.local:6061/api/").unwrap(),
    );

    let url = client.endpoint(&["download", "reports/q1 final.pdf"]).unwrap();
    assert_eq!(
        url.as_str(),
        "http://files.local:6061/api/download/reports%2Fq1%20final.pdf"
    );
}

#[tokio::test]
async fn list_parses_file_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Files retrieved successfully",
            "data": [
                {"name": "a.txt", "size": 12, "modifiedTime": "2024-05-01T10:00:00.123456789+02:00", "isDir": false},
                {"name": "photos", "size": 4096, "modifiedTime": "2024-05-02T08:30:00Z", "isDir": true},
                {"name": "b.bin", "size": 0, "modifiedTime": "2024-05-03T00:00:00Z"}
            ]
        })))
        .mount(&server)
        .await;

    let entries = client_for(&server).list().await.unwrap();

    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "photos", "b.bin"]);
    assert_eq!(entries[0].size, 12);
    assert_eq!(entries[0].modified_time.to_rfc3339(), "2024-05-01T08:00:00.123456789+00:00");
    assert!(entries[1].is_dir);
    assert!(!entries[2].is_dir);
}

#[tokio::test]
async fn list_without_data_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": "ok"})))
        .mount(&server)
        .await;

    assert!(client_for(&server).list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/files"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "message": "Failed to read directory"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).list().await.unwrap_err();
    assert_eq!(err, ApiError::HttpStatus(500));
}

#[tokio::test]
async fn delete_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/delete/gone.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "File is locked"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/delete/ok.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "File deleted successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.delete("gone.txt").await.unwrap_err(),
        ApiError::Rejected("File is locked".to_string())
    );
    client.delete("ok.txt").await.unwrap();
}

#[tokio::test]
async fn download_returns_body_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/download/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=report.pdf")
                .set_body_bytes(b"%PDF-1.7".to_vec()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/download/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(&client.download("report.pdf").await.unwrap()[..], b"%PDF-1.7");
    assert_eq!(
        client.download("missing.pdf").await.unwrap_err(),
        ApiError::HttpStatus(404)
    );
}

#[tokio::test]
async fn download_many_posts_names_and_reads_suggested_filename() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/download-multiple"))
        .and(body_json(json!({"files": ["a.txt", "b.txt"]})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Content-Disposition",
                    "attachment; filename=download_20240501_100000.zip",
                )
                .set_body_bytes(b"PK\x03\x04".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let names = vec!["a.txt".to_string(), "b.txt".to_string()];
    let (suggested, bytes) = client_for(&server).download_many(&names).await.unwrap();

    assert_eq!(suggested.as_deref(), Some("download_20240501_100000.zip"));
    assert_eq!(&bytes[..], b"PK\x03\x04");
}

#[tokio::test]
async fn archive_request_sends_count_and_note() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload-zip"))
        .and(body_json(json!({"fileCount": 501, "message": "too many files"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Zip upload notification received"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let accepted = client_for(&server)
        .request_archive(501, "too many files")
        .await;
    assert!(accepted);
}

#[tokio::test]
async fn archive_rejection_maps_to_false() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload-zip"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "Invalid request"
        })))
        .mount(&server)
        .await;

    assert!(!client_for(&server).request_archive(900, "note").await);
}
