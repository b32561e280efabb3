use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use droplet_protocol::*;
use pretty_assertions::assert_eq;

fn write_fixture(dir: &Path, name: &str, json: &str) {
    let path = dir.join(format!("{}.json", name));
    fs::write(&path, json).unwrap_or_else(|_| panic!("Failed to write fixture: {:?}", path));
}

fn sample_site(domain: &str, name: &str, energy: f64, visits: u64, minutes: f64) -> SiteAggregate {
    SiteAggregate {
        domain: domain.to_string(),
        display_name: name.to_string(),
        energy,
        water: energy * 2.0,
        visit_count: visits,
        accumulated_units: minutes,
    }
}

fn sample_usage_data() -> UsageData {
    let mut site_data = BTreeMap::new();
    site_data.insert(
        "youtube.com".to_string(),
        sample_site("youtube.com", "YouTube", 0.00052, 1, 4.0),
    );
    site_data.insert(
        "chatgpt.com".to_string(),
        sample_site("chatgpt.com", "ChatGPT", 0.00034, 1, 0.0),
    );
    UsageData {
        total_energy: 0.00086,
        total_water: 0.00172,
        site_data,
        session_start: 1704067200000,
    }
}

fn sample_daemon_status() -> DaemonStatus {
    DaemonStatus {
        running: true,
        uptime_secs: 3600,
        version: "0.3.0".to_string(),
        tracked_tabs: 3,
        tracking_enabled: true,
        database_size_bytes: 24576,
        protocol_version: PROTOCOL_VERSION,
        min_supported_version: MIN_SUPPORTED_VERSION,
    }
}

fn sample_requests() -> Vec<(&'static str, DaemonRequest)> {
    vec![
        ("get_status", DaemonRequest::GetStatus),
        ("get_data", DaemonRequest::GetData),
        ("reset_data", DaemonRequest::ResetData),
        ("shutdown", DaemonRequest::Shutdown),
        (
            "tab_navigation_completed",
            DaemonRequest::Tab(TabEvent::NavigationCompleted {
                tab_id: 1,
                frame_id: 0,
                url: "https://www.youtube.com/watch?v=abc".to_string(),
            }),
        ),
        (
            "tab_activated",
            DaemonRequest::Tab(TabEvent::Activated {
                tab_id: 1,
                url: Some("https://chatgpt.com/".to_string()),
            }),
        ),
        (
            "tab_activated_without_url",
            DaemonRequest::Tab(TabEvent::Activated {
                tab_id: 2,
                url: None,
            }),
        ),
        (
            "tab_updated",
            DaemonRequest::Tab(TabEvent::Updated {
                tab_id: 2,
                url: "https://netflix.com/browse".to_string(),
            }),
        ),
        (
            "tab_removed",
            DaemonRequest::Tab(TabEvent::Removed { tab_id: 2 }),
        ),
        (
            "record_usage",
            DaemonRequest::RecordUsage {
                domain: "gmail.com".to_string(),
                duration: 2.5,
            },
        ),
    ]
}

fn sample_responses() -> Vec<(&'static str, DaemonResponse)> {
    vec![
        ("status", DaemonResponse::Status(sample_daemon_status())),
        ("data", DaemonResponse::Data(sample_usage_data())),
        ("reset", DaemonResponse::Reset { success: true }),
        ("ok", DaemonResponse::Ok),
        (
            "error",
            DaemonResponse::Error("database is locked".to_string()),
        ),
    ]
}

#[test]
fn request_fixtures_deserialize() {
    let dir = tempfile::tempdir().unwrap();

    for (name, request) in sample_requests() {
        let json = serde_json::to_string_pretty(&request).unwrap();
        write_fixture(dir.path(), name, &json);
    }

    let requests = sample_requests();
    for (name, expected) in requests {
        let content = fs::read_to_string(dir.path().join(format!("{}.json", name))).unwrap();
        let parsed: DaemonRequest = serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to deserialize {}: {}", name, e));
        assert_eq!(parsed, expected);
    }
}

#[test]
fn response_fixtures_deserialize() {
    let dir = tempfile::tempdir().unwrap();

    for (name, response) in sample_responses() {
        let json = serde_json::to_string_pretty(&response).unwrap();
        write_fixture(dir.path(), name, &json);
    }

    for (name, expected) in sample_responses() {
        let content = fs::read_to_string(dir.path().join(format!("{}.json", name))).unwrap();
        let parsed: DaemonResponse = serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to deserialize {}: {}", name, e));
        assert_eq!(parsed, expected);
    }
}

#[test]
fn usage_data_uses_camel_case_keys() {
    let value = serde_json::to_value(sample_usage_data()).unwrap();

    assert!(value.get("totalEnergy").is_some());
    assert!(value.get("totalWater").is_some());
    assert!(value.get("sessionStart").is_some());

    let site = &value["siteData"]["youtube.com"];
    assert_eq!(site["name"], "YouTube");
    assert_eq!(site["visits"], 1);
    assert_eq!(site["duration"], 4.0);
    assert!(site.get("display_name").is_none());
}

#[test]
fn usage_data_accepts_records_without_domain() {
    let json = r#"{
        "totalEnergy": 0.0003,
        "totalWater": 0.0006,
        "siteData": {
            "example.org": {"name": "Website", "energy": 0.0003, "water": 0.0006, "visits": 1, "duration": 0}
        },
        "sessionStart": 1704067200000
    }"#;

    let data: UsageData = serde_json::from_str(json).unwrap();
    let site = &data.site_data["example.org"];
    assert_eq!(site.domain, "");
    assert_eq!(site.display_name, "Website");
    assert_eq!(site.visit_count, 1);
}

#[test]
fn sites_are_ordered_by_water() {
    let data = sample_usage_data();
    let order: Vec<&str> = data
        .sites_by_water()
        .iter()
        .map(|s| s.domain.as_str())
        .collect();
    assert_eq!(order, vec!["youtube.com", "chatgpt.com"]);
}

#[test]
fn request_line_round_trip() {
    let request = DaemonRequest::Tab(TabEvent::Removed { tab_id: 7 });
    let line = request.to_json().unwrap();
    assert!(!line.contains('\n'));
    assert_eq!(DaemonRequest::from_json(&line).unwrap(), request);
    assert_eq!(request_tab_id(&request), Some(7));
}

fn request_tab_id(request: &DaemonRequest) -> Option<TabId> {
    match request {
        DaemonRequest::Tab(event) => Some(event.tab_id()),
        _ => None,
    }
}
