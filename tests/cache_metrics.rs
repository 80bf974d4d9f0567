mod support;

use std::collections::HashSet;
use std::sync::Arc;

use menu_catalog::application::jobs::{
    ExportMenuReportJobPayload, ReportWorkerContext, process_menu_report_job,
};
use menu_catalog::domain::entities::{NewMenu, NewSubmenu};
use menu_catalog::infra::reports::ReportStorage;
use metrics_util::debugging::DebuggingRecorder;
use serial_test::serial;
use tempfile::TempDir;

use support::{FailingCache, MemoryStore, STORE_TIMEOUT, catalog_with, harness, report_service};

#[tokio::test]
#[serial]
async fn catalog_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    // Miss, then hit, then invalidate through a create below the menu.
    let h = harness();
    let menu = h
        .catalog
        .create_menu(NewMenu {
            title: "Lunch".into(),
            description: "Mid-day".into(),
        })
        .await
        .expect("menu");
    h.catalog.list_menus().await.expect("miss");
    h.catalog.list_menus().await.expect("hit");
    h.catalog
        .create_submenu(
            menu.id,
            NewSubmenu {
                title: "Soups".into(),
                description: "Hot".into(),
            },
        )
        .await
        .expect("submenu");

    // Backend errors.
    let broken_store = MemoryStore::new();
    let broken = catalog_with(&broken_store, Arc::new(FailingCache), STORE_TIMEOUT);
    broken.list_menus().await.expect("store fallback");

    // One finished export.
    let dir = TempDir::new().expect("temp dir");
    let storage = Arc::new(ReportStorage::new(dir.path().to_path_buf()).expect("storage"));
    let reports = report_service(&h.store, storage.clone());
    reports.submit().await.expect("submit");
    let job = h.store.jobs().await.remove(0);
    let payload: ExportMenuReportJobPayload =
        serde_json::from_value(job.payload).expect("payload");
    process_menu_report_job(
        payload,
        apalis::prelude::Data::new(ReportWorkerContext {
            reports: h.store.clone(),
            storage,
        }),
    )
    .await
    .expect("export");

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "catalog_cache_hit_total",
        "catalog_cache_miss_total",
        "catalog_cache_error_total",
        "catalog_cache_invalidate_total",
        "catalog_report_generated_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
