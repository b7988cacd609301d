use chrono_tz::Tz;
use futures::TryStreamExt;
use retailer_repository::{NewRetailerRecord, RetailerFilter, RetailerRecord, RetailerRepository};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Result, ServiceError};
use crate::settings::ServiceSettings;
use crate::timestamp::{format_for_report, parse_bound, DayEdge};
use crate::workbook::write_workbook;

pub const SHEET_NAME: &str = "Retailers";
pub const FILE_NAME: &str = "retailers_data.xlsx";
pub const CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Extra character widths added to every column.
pub const COLUMN_PADDING: usize = 2;

pub const COLUMN_COUNT: usize = 15;

pub const REPORT_HEADERS: [&str; COLUMN_COUNT] = [
    "Employee Name",
    "Retailer Name",
    "Retailer Contact",
    "Retailer Email",
    "Shop Name",
    "City/Village",
    "Tehsil",
    "District",
    "State",
    "Visiting Date & Time",
    "BBPS",
    "AEPS",
    "DMT",
    "CMS",
    "Onboarding Status",
];

pub type ReportRow = [String; COLUMN_COUNT];

/// Optional export parameters as they arrive in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default, alias = "startDate")]
    pub start: Option<String>,
    #[serde(default, alias = "endDate")]
    pub end: Option<String>,
    #[serde(default, rename = "employeeName")]
    pub employee_name: Option<String>,
}

impl ExportQuery {
    /// Builds the store filter from the parameters that are present.
    ///
    /// A bare date `end` covers that whole day; full timestamps are used as
    /// given.
    pub fn to_filter(&self, tz: Tz) -> Result<RetailerFilter> {
        let visited_from = bound(self.start.as_deref(), "start", tz, DayEdge::Start)?;
        let visited_to = bound(self.end.as_deref(), "end", tz, DayEdge::End)?;

        if let (Some(from), Some(to)) = (visited_from, visited_to) {
            if from > to {
                return Err(ServiceError::Validation(
                    "start must not be later than end".to_string(),
                ));
            }
        }

        let employee_name_contains = self
            .employee_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Ok(RetailerFilter {
            visited_from,
            visited_to,
            employee_name_contains,
        })
    }
}

fn bound(
    raw: Option<&str>,
    name: &str,
    tz: Tz,
    edge: DayEdge,
) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => parse_bound(value, tz, edge).map(Some).ok_or_else(|| {
            ServiceError::Validation(format!("{name} '{value}' is not a recognizable date"))
        }),
    }
}

/// Matching records shaped for the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub widths: Vec<usize>,
}

/// Maps a record onto the fixed report columns.
pub fn report_row(record: &NewRetailerRecord, tz: Tz) -> ReportRow {
    [
        record.employee_name.clone(),
        record.retailer_name.clone(),
        record.retailer_contact.clone(),
        record.retailer_email.clone(),
        record.shop_name.clone(),
        record.city_village.clone(),
        record.tehsil.clone().unwrap_or_default(),
        record.district.clone(),
        record.state.clone(),
        record
            .visiting_date_time
            .map(|instant| format_for_report(instant, tz))
            .unwrap_or_default(),
        record.bbps.clone(),
        record.aeps.clone(),
        record.dmt.clone(),
        record.cms.clone(),
        record.onboarding_status.clone(),
    ]
}

/// Width of each column: the longest of its header and cells, plus padding.
/// Lengths are counted in characters.
pub fn column_widths<R>(headers: &[&str], rows: &[R]) -> Vec<usize>
where
    R: AsRef<[String]>,
{
    headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let longest_cell = rows
                .iter()
                .filter_map(|row| row.as_ref().get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0);
            header.chars().count().max(longest_cell) + COLUMN_PADDING
        })
        .collect()
}

/// Queries the store and shapes the matches. Fails with `NotFound` when
/// nothing matches.
pub async fn build_report(
    repository: &dyn RetailerRepository,
    query: &ExportQuery,
    settings: &ServiceSettings,
) -> Result<Report> {
    let filter = query.to_filter(settings.timezone)?;
    debug!(unfiltered = filter.is_unfiltered(), ?filter, "querying retailer records");
    let records: Vec<RetailerRecord> = repository.query(&filter).try_collect().await?;

    if records.is_empty() {
        return Err(ServiceError::NotFound);
    }

    let rows: Vec<ReportRow> = records
        .iter()
        .map(|record| report_row(&record.data, settings.timezone))
        .collect();
    let widths = column_widths(&REPORT_HEADERS, &rows);

    Ok(Report { rows, widths })
}

/// Produces the complete `.xlsx` bytes for an export request.
pub async fn export_workbook(
    repository: &dyn RetailerRepository,
    query: &ExportQuery,
    settings: &ServiceSettings,
) -> Result<Vec<u8>> {
    let report = build_report(repository, query, settings).await?;
    let row_count = report.rows.len();

    let bytes = tokio::task::spawn_blocking(move || {
        write_workbook(SHEET_NAME, &REPORT_HEADERS, &report.rows, &report.widths)
    })
    .await
    .map_err(|err| ServiceError::Serialization(format!("workbook task failed: {err}")))??;

    info!(rows = row_count, bytes = bytes.len(), "retailer export generated");
    Ok(bytes)
}
