//! Export pipeline: submit, run the worker function by hand, download and
//! read the spreadsheet back.

mod support;

use std::io::Cursor;
use std::sync::Arc;

use apalis::prelude::Data as JobData;
use calamine::{Data, Reader, Xlsx};
use menu_catalog::application::jobs::{
    ExportMenuReportJobPayload, ReportWorkerContext, process_menu_report_job,
};
use menu_catalog::application::report::{ReportError, ReportService};
use menu_catalog::application::seed::{load_seed, parse_seed};
use menu_catalog::domain::types::{JobType, ReportStatus};
use menu_catalog::infra::reports::ReportStorage;
use menu_catalog::infra::spreadsheet::SHEET_NAME;
use tempfile::TempDir;

use support::{Harness, harness, report_service};

const SEED: &str = r#"[
  {
    "title": "Lunch",
    "description": "Mid-day",
    "submenus": [
      {
        "title": "Soups",
        "description": "Hot soups",
        "dishes": [
          { "title": "Borscht", "description": "Beet soup", "price": "5.5" },
          { "title": "Shchi", "description": "Cabbage soup", "price": 4 }
        ]
      }
    ]
  },
  { "title": "Bar", "description": "Drinks", "submenus": [] }
]"#;

struct Fixture {
    h: Harness,
    storage: Arc<ReportStorage>,
    reports: ReportService,
    _dir: TempDir,
}

async fn fixture() -> Fixture {
    let h = harness();
    load_seed(&h.catalog, parse_seed(SEED).expect("seed"))
        .await
        .expect("load seed");

    let dir = TempDir::new().expect("temp dir");
    let storage = Arc::new(ReportStorage::new(dir.path().join("reports")).expect("storage"));
    let reports = report_service(&h.store, storage.clone());
    Fixture {
        h,
        storage,
        reports,
        _dir: dir,
    }
}

fn cell_text(range: &calamine::Range<Data>, row: u32, column: u32) -> String {
    match range.get_value((row, column)) {
        Some(Data::String(value)) => value.clone(),
        other => panic!("expected text at ({row}, {column}), got {other:?}"),
    }
}

fn cell_number(range: &calamine::Range<Data>, row: u32, column: u32) -> f64 {
    match range.get_value((row, column)) {
        Some(Data::Float(value)) => *value,
        Some(Data::Int(value)) => *value as f64,
        other => panic!("expected number at ({row}, {column}), got {other:?}"),
    }
}

#[tokio::test]
async fn menus_report_mirrors_the_catalog() {
    let f = fixture().await;
    let report = f.reports.menus_report().await.expect("report");

    assert_eq!(report.len(), 2);
    let lunch = report
        .iter()
        .find(|menu| menu.title == "Lunch")
        .expect("lunch");
    assert_eq!(lunch.submenus.len(), 1);
    let prices: Vec<&str> = lunch.submenus[0]
        .dishes
        .iter()
        .map(|dish| dish.price.as_str())
        .collect();
    assert_eq!(prices, ["5.50", "4.00"]);
}

#[tokio::test]
async fn finished_export_downloads_as_a_workbook() {
    let f = fixture().await;

    let info = f.reports.submit().await.expect("submit");
    assert_eq!(info.task_status, ReportStatus::Pending);

    let jobs = f.h.store.jobs().await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].job_type, JobType::ExportMenuReport);
    assert_eq!(jobs[0].max_attempts, 1);

    let payload: ExportMenuReportJobPayload =
        serde_json::from_value(jobs[0].payload.clone()).expect("payload");
    assert_eq!(payload.report_id, info.task_id);

    let context = ReportWorkerContext {
        reports: f.h.store.clone(),
        storage: f.storage.clone(),
    };
    process_menu_report_job(payload, JobData::new(context))
        .await
        .expect("export job");

    let finished = f.reports.task_info(info.task_id).await.expect("status");
    assert_eq!(finished.task_status, ReportStatus::Success);
    assert_eq!(
        finished.task_result,
        Some(ReportStorage::file_name_for(info.task_id))
    );

    let bytes = f.reports.download(info.task_id).await.expect("download");
    let mut workbook = Xlsx::new(Cursor::new(bytes)).expect("xlsx");
    let range = workbook.worksheet_range(SHEET_NAME).expect("menu sheet");

    // Menu rows start at column A, submenus at B, dishes at C.
    assert_eq!(cell_number(&range, 0, 0), 1.0);
    assert_eq!(cell_text(&range, 0, 1), "Lunch");
    assert_eq!(cell_text(&range, 0, 2), "Mid-day");

    assert_eq!(cell_number(&range, 1, 1), 1.0);
    assert_eq!(cell_text(&range, 1, 2), "Soups");

    assert_eq!(cell_number(&range, 2, 2), 1.0);
    assert_eq!(cell_text(&range, 2, 3), "Borscht");
    assert_eq!(cell_text(&range, 2, 5), "5.50");
    assert_eq!(cell_number(&range, 3, 2), 2.0);
    assert_eq!(cell_text(&range, 3, 5), "4.00");

    assert_eq!(cell_number(&range, 4, 0), 2.0);
    assert_eq!(cell_text(&range, 4, 1), "Bar");
    assert_eq!(range.end().map(|(row, _)| row), Some(4));
}

#[tokio::test]
async fn pending_report_is_not_ready() {
    let f = fixture().await;
    let info = f.reports.submit().await.expect("submit");

    match f.reports.download(info.task_id).await {
        Err(ReportError::NotReady(pending)) => {
            assert_eq!(pending.task_id, info.task_id);
            assert_eq!(pending.task_status, ReportStatus::Pending);
        }
        other => panic!("expected not ready, got {other:?}"),
    }
    assert!(matches!(
        f.reports.task_info(uuid::Uuid::new_v4()).await,
        Err(ReportError::NotFound)
    ));
}

#[tokio::test]
async fn failed_enqueue_settles_the_task_as_failure() {
    let f = fixture().await;
    f.h.store.fail_enqueue();

    assert!(matches!(f.reports.submit().await, Err(ReportError::Repo(_))));
    assert!(f.h.store.jobs().await.is_empty());
    assert_eq!(
        f.h.store.report_statuses().await,
        vec![ReportStatus::Failure]
    );
}

#[tokio::test]
async fn redelivered_job_leaves_a_settled_report_alone() {
    let f = fixture().await;
    let info = f.reports.submit().await.expect("submit");
    let job = f.h.store.jobs().await.remove(0);
    let payload: ExportMenuReportJobPayload =
        serde_json::from_value(job.payload).expect("payload");
    let context = ReportWorkerContext {
        reports: f.h.store.clone(),
        storage: f.storage.clone(),
    };

    process_menu_report_job(payload.clone(), JobData::new(context.clone()))
        .await
        .expect("first run");
    let path = f
        .storage
        .absolute_path(&ReportStorage::file_name_for(info.task_id))
        .expect("path");
    std::fs::remove_file(&path).expect("remove workbook");

    process_menu_report_job(payload, JobData::new(context))
        .await
        .expect("second run");
    assert!(!path.exists());
    assert_eq!(
        f.reports.task_info(info.task_id).await.expect("status").task_status,
        ReportStatus::Success
    );
}
