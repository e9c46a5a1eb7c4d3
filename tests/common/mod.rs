//! Shared fixtures for integration tests: a generated dataset on disk and a
//! running server bound to an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use serde_json::{json, Value};
use study_abroad_api::config::ServiceConfig;
use study_abroad_api::http::ApiServer;
use study_abroad_api::lifecycle::Shutdown;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const ADMIN_KEY: &str = "test-admin-key";

/// A running server over fixture data. Shuts down on drop.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub visa_dir: PathBuf,
    pub university_dir: PathBuf,
    shutdown: Shutdown,
    _dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// GET `path` and decode the JSON body.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.expect("server unreachable");
        decode(res).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn decode(res: reqwest::Response) -> (StatusCode, Value) {
    let status = res.status();
    let body = res.json::<Value>().await.expect("body is not JSON");
    (status, body)
}

/// Start a server over the standard fixtures.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_, _| {}).await
}

/// Start a server, letting the caller adjust config and data before it starts.
pub async fn spawn_app_with<F>(customize: F) -> TestApp
where
    F: FnOnce(&mut ServiceConfig, &Path),
{
    let dir = tempfile::tempdir().unwrap();
    let visa_dir = dir.path().join("visa_data");
    let university_dir = dir.path().join("university_data");
    std::fs::create_dir_all(&visa_dir).unwrap();
    std::fs::create_dir_all(&university_dir).unwrap();
    write_visa_fixtures(&visa_dir);
    write_university_fixtures(&university_dir);

    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.data.visa_dir = visa_dir.to_string_lossy().into_owned();
    config.data.university_dir = university_dir.to_string_lossy().into_owned();
    config.admin.api_key = ADMIN_KEY.to_string();
    customize(&mut config, dir.path());

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = ApiServer::new(config);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        visa_dir,
        university_dir,
        shutdown,
        _dir: dir,
    }
}

pub fn write_visa_fixtures(dir: &Path) {
    let tourist = json!({
        "countries": {
            "united_states": {
                "name": "United States",
                "flag": "🇺🇸",
                "processing_time": "3-5 weeks",
                "fees": {"application": 185, "currency": "USD"},
                "visa_free_days": 0
            },
            "france": {
                "name": "France",
                "flag": "🇫🇷",
                "processing_time": "15 days",
                "fees": {"application": 80, "currency": "EUR"}
            }
        },
        "general_requirements": ["Valid passport", "Return ticket"],
        "common_fees": {"biometrics": 20},
        "processing_times": {"standard": "15 days"}
    });
    let study = json!({
        "countries": {
            "united_kingdom": {
                "name": "United Kingdom",
                "flag": "🇬🇧",
                "processing_time": "3 weeks",
                "fees": {"application": 490, "currency": "GBP"}
            }
        },
        "general_requirements": ["Letter of acceptance"],
        "common_fees": {},
        "processing_times": {},
        "work_rights": {"hours_per_week": 20},
        "insurance_requirements": "Immigration health surcharge"
    });
    std::fs::write(dir.join("tourist.json"), tourist.to_string()).unwrap();
    std::fs::write(dir.join("study.json"), study.to_string()).unwrap();
}

/// France: 12 universities (ranks 10..=21, Europe).
/// United States: ranks 1, 4, 6, 9 (North America).
/// United Kingdom: ranks 2, 3, 7 (Europe).
pub fn write_university_fixtures(dir: &Path) {
    let france: Vec<(u32, f64)> = (0..12u32)
        .map(|i| (10 + i, 50.0 + f64::from((i + 1) * 7 % 12)))
        .collect();
    let united_states = vec![(1, 98.0), (4, 92.0), (6, 90.0), (9, 85.0)];
    let united_kingdom = vec![(2, 97.0), (3, 95.0), (7, 88.0)];

    let countries = [
        ("France", "France.json", "Europe", france),
        ("United States", "United_States.json", "North America", united_states),
        ("United Kingdom", "United_Kingdom.json", "Europe", united_kingdom),
    ];

    let mut entries = Vec::new();
    let mut total = 0;
    for (name, file_name, region, records) in &countries {
        let universities: Vec<Value> = records
            .iter()
            .enumerate()
            .map(|(i, (rank, score))| {
                json!({
                    "id": format!("{}_{}", name, i + 1),
                    "rank": rank,
                    "ranking": rank.to_string(),
                    "name": format!("{} Institute {}", name, i + 1),
                    "code": "",
                    "country": name,
                    "score": score,
                    "region": region,
                    "startDate": "2024-09-01",
                    "endDate": "2025-06-30",
                    "tuitionFee": 10_000 + (*rank as u64) * 1_000,
                    "applicationFee": 50 + *rank as u64,
                    "applicationOpen": rank % 2 == 0,
                    "applicationUrl": "https://example.edu",
                    "imageUrl": "https://example.edu/image.png",
                    "isWatchlisted": false
                })
            })
            .collect();
        std::fs::write(
            dir.join(file_name),
            json!({
                "country": name,
                "totalUniversities": universities.len(),
                "universities": universities,
            })
            .to_string(),
        )
        .unwrap();
        entries.push(json!({"name": name, "count": records.len(), "fileName": file_name}));
        total += records.len();
    }

    std::fs::write(
        dir.join("summary.json"),
        json!({
            "totalCountries": countries.len(),
            "totalUniversities": total,
            "countries": entries,
        })
        .to_string(),
    )
    .unwrap();
}

pub fn ranks(body: &Value) -> Vec<u64> {
    body["universities"]
        .as_array()
        .expect("universities array")
        .iter()
        .map(|u| u["rank"].as_u64().unwrap())
        .collect()
}
