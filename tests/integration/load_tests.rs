//! End-to-end load scenarios

use crate::support::*;
use page_loader::loader::DownloadProgress;
use page_loader::markup::{collect_references, Document};
use page_loader::{LoaderConfig, PageLoader};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HEXLET: &str = "ru.hexlet.io";
const ASSETS_DIR: &str = "ru-hexlet-io-courses_files";

/// Mounts the courses page followed by its four same-origin resources
async fn mount_courses(server: &MockServer) {
    // First request for /courses is the page, the second is the canonical link
    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COURSES_HTML))
        .up_to_n_times(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CANONICAL_CONTENT))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/assets/professions/nodejs.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(PNG_CONTENT)
                .insert_header("content-type", "image/png"),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/assets/application.css"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(CSS_CONTENT)
                .insert_header("content-type", "text/css"),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/packs/js/runtime.js"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(JS_CONTENT)
                .insert_header("content-type", "application/javascript"),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_download_page_and_save_to_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let loader = loader_for(&server, &[HEXLET]);
    let outcome = loader
        .load(&url_on(&server, HEXLET, "/courses"), temp.path())
        .await
        .expect("Load failed");

    assert_eq!(outcome.page_path, temp.path().join("ru-hexlet-io-courses.html"));
    assert!(outcome.assets_dir.is_none());
    assert!(outcome.assets.is_empty());

    let content = std::fs::read_to_string(&outcome.page_path).unwrap();
    assert_eq!(content, "<html><head></head><body></body></html>");
    assert_eq!(dir_entries(temp.path()), vec!["ru-hexlet-io-courses.html"]);
}

#[tokio::test]
async fn test_file_name_from_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/path/to/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>anything</p>"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let loader = loader_for(&server, &["example.com"]);
    let outcome = loader
        .load(&url_on(&server, "example.com", "/path/to/page"), temp.path())
        .await
        .unwrap();

    assert_eq!(
        outcome.page_path.file_name().unwrap(),
        "example-com-path-to-page.html"
    );
}

#[tokio::test]
async fn test_load_with_default_config() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let page_path = page_loader::load(&format!("{}/page", server.uri()), temp.path())
        .await
        .unwrap();

    assert_eq!(page_path, temp.path().join("127-0-0-1-page.html"));
    assert!(page_path.is_file());
}

#[tokio::test]
async fn test_download_local_resources_and_update_links() {
    let server = MockServer::start().await;
    mount_courses(&server).await;

    let temp = TempDir::new().unwrap();
    let loader = loader_for(&server, &[HEXLET]);
    let outcome = loader
        .load(&url_on(&server, HEXLET, "/courses"), temp.path())
        .await
        .expect("Load failed");

    let assets_dir = temp.path().join(ASSETS_DIR);
    assert!(assets_dir.is_dir());
    assert_eq!(outcome.assets_dir.as_deref(), Some(assets_dir.as_path()));
    assert_eq!(
        dir_entries(&assets_dir),
        vec![
            "ru-hexlet-io-assets-application.css",
            "ru-hexlet-io-assets-professions-nodejs.png",
            "ru-hexlet-io-courses.html",
            "ru-hexlet-io-packs-js-runtime.js",
        ]
    );

    let read = |name: &str| std::fs::read(assets_dir.join(name)).unwrap();
    assert_eq!(read("ru-hexlet-io-assets-professions-nodejs.png"), PNG_CONTENT);
    assert_eq!(read("ru-hexlet-io-assets-application.css"), CSS_CONTENT.as_bytes());
    assert_eq!(read("ru-hexlet-io-packs-js-runtime.js"), JS_CONTENT.as_bytes());
    assert_eq!(read("ru-hexlet-io-courses.html"), CANONICAL_CONTENT.as_bytes());

    let html = std::fs::read_to_string(&outcome.page_path).unwrap();
    assert_eq!(html, COURSES_AFTER_HTML);
}

/// Collects progress events for inspection
#[derive(Default)]
struct CollectedProgress {
    total: Mutex<Option<usize>>,
    done: Mutex<Vec<String>>,
    finished: Mutex<bool>,
}

impl DownloadProgress for CollectedProgress {
    fn started(&self, total: usize) {
        *self.total.lock().unwrap() = Some(total);
    }

    fn asset_done(&self, url: &Url, _bytes: usize) {
        self.done.lock().unwrap().push(url.path().to_string());
    }

    fn finished(&self) {
        *self.finished.lock().unwrap() = true;
    }
}

#[tokio::test]
async fn test_progress_reports_every_asset() {
    let server = MockServer::start().await;
    mount_courses(&server).await;

    let progress = Arc::new(CollectedProgress::default());
    let temp = TempDir::new().unwrap();
    let loader = loader_for(&server, &[HEXLET]).with_progress(progress.clone());
    loader
        .load(&url_on(&server, HEXLET, "/courses"), temp.path())
        .await
        .unwrap();

    assert_eq!(*progress.total.lock().unwrap(), Some(4));
    assert!(*progress.finished.lock().unwrap());

    let mut done = progress.done.lock().unwrap().clone();
    done.sort();
    assert_eq!(
        done,
        vec![
            "/assets/application.css",
            "/assets/professions/nodejs.png",
            "/courses",
            "/packs/js/runtime.js",
        ]
    );
}

#[tokio::test]
async fn test_external_resources_are_not_downloaded() {
    let server = MockServer::start().await;
    mount_courses(&server).await;

    let temp = TempDir::new().unwrap();
    let loader = loader_for(&server, &[HEXLET]);
    let outcome = loader
        .load(&url_on(&server, HEXLET, "/courses"), temp.path())
        .await
        .unwrap();

    let html = std::fs::read_to_string(&outcome.page_path).unwrap();
    assert!(html.contains(r#"href="https://cdn2.hexlet.io/assets/menu.css""#));
    assert!(html.contains(r#"src="https://js.stripe.com/v3/""#));
    assert_eq!(outcome.assets.len(), 4);
    assert_eq!(dir_entries(&temp.path().join(ASSETS_DIR)).len(), 4);
}

#[tokio::test]
async fn test_saved_page_is_a_fixed_point() {
    let server = MockServer::start().await;
    mount_courses(&server).await;

    let temp = TempDir::new().unwrap();
    let page_url = url_on(&server, HEXLET, "/courses");
    let loader = loader_for(&server, &[HEXLET]);
    let outcome = loader.load(&page_url, temp.path()).await.unwrap();

    let saved = Document::parse(&std::fs::read_to_string(&outcome.page_path).unwrap());
    let page_url = Url::parse(&page_url).unwrap();
    for reference in collect_references(&saved, &page_url) {
        if reference.is_same_origin(&page_url) {
            assert!(reference.original_value.starts_with("ru-hexlet-io-courses_files/"));
            let local = temp.path().join(&reference.original_value);
            assert!(local.is_file(), "{} was not saved", local.display());
        }
    }
}

#[tokio::test]
async fn test_bounded_concurrency_downloads_everything() {
    let server = MockServer::start().await;
    mount_courses(&server).await;

    let mut config = LoaderConfig::default();
    config.downloads.max_concurrent = Some(1);

    let temp = TempDir::new().unwrap();
    let loader = loader_with_config(&server, &[HEXLET], config);
    let outcome = loader
        .load(&url_on(&server, HEXLET, "/courses"), temp.path())
        .await
        .unwrap();

    assert_eq!(outcome.assets.len(), 4);
    assert!(outcome.assets.iter().all(|p| p.is_file()));
}

#[tokio::test]
async fn test_repeated_reference_is_downloaded_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><img src="/logo.png"><img src="logo.png"></body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_CONTENT))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let loader = loader_for(&server, &["example.com"]);
    let outcome = loader
        .load(&url_on(&server, "example.com", "/page"), temp.path())
        .await
        .unwrap();

    assert_eq!(outcome.assets.len(), 1);
    let html = std::fs::read_to_string(&outcome.page_path).unwrap();
    assert_eq!(
        html.matches(r#"src="example-com-page_files/example-com-logo.png""#).count(),
        2
    );
}

#[tokio::test]
async fn test_existing_assets_dir_is_reused() {
    let server = MockServer::start().await;
    mount_courses(&server).await;

    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join(ASSETS_DIR)).unwrap();

    let loader: PageLoader = loader_for(&server, &[HEXLET]);
    let outcome = loader
        .load(&url_on(&server, HEXLET, "/courses"), temp.path())
        .await
        .unwrap();

    assert_eq!(outcome.assets.len(), 4);
}
