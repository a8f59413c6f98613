//! BigQuery REST integration for ad performance tables.
//!
//! One synchronous `jobs.query` call per run. The response rows arrive as
//! schema-ordered string cells and are decoded by column name, so the column
//! order of the table does not matter.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::data::source::{AdsDataSource, validate_column, validate_table_ref};
use crate::domain::{AdPerformanceRecord, ColumnMap, Dataset, Provenance, TableRef};
use crate::error::FetchError;

const DEFAULT_API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2";
const TOKEN_ENV: &str = "BIGQUERY_ACCESS_TOKEN";
const API_BASE_ENV: &str = "BIGQUERY_API_BASE";
const MAX_RESULTS: u32 = 10_000;

// Canonical aliases used in the generated SQL.
const COL_DATE: &str = "date";
const COL_CAMPAIGN: &str = "campaign";
const COL_AD_GROUP: &str = "ad_group";
const COL_CLICKS: &str = "clicks";
const COL_IMPRESSIONS: &str = "impressions";
const COL_COST: &str = "cost";
const COL_CONVERSIONS: &str = "conversions";

/// Connection settings for [`BigQueryClient`].
#[derive(Debug, Clone)]
pub struct BigQueryConfig {
    pub api_base: String,
    /// OAuth2 bearer token. Without one every fetch fails with `Connection`.
    pub access_token: Option<String>,
    pub timeout: Duration,
    pub location: Option<String>,
    pub columns: ColumnMap,
}

impl BigQueryConfig {
    /// Read credentials from the environment (and `.env`).
    ///
    /// - `BIGQUERY_ACCESS_TOKEN`: bearer token (e.g. `gcloud auth print-access-token`)
    /// - `BIGQUERY_API_BASE`: override of the REST endpoint
    pub fn from_env(timeout: Duration, location: Option<String>, columns: ColumnMap) -> Self {
        dotenvy::dotenv().ok();
        let access_token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty());
        let api_base = std::env::var(API_BASE_ENV)
            .ok()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self {
            api_base,
            access_token,
            timeout,
            location,
            columns,
        }
    }
}

pub struct BigQueryClient {
    /// A client that failed to build is kept as its error and reported by
    /// `fetch`, so the run still falls back to sample data.
    client: Result<Client, String>,
    config: BigQueryConfig,
}

impl BigQueryClient {
    pub fn new(config: BigQueryConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| e.to_string());
        if let Err(err) = &client {
            warn!(error = %err, "Failed to build HTTP client");
        }
        Self { client, config }
    }

    fn queries_url(&self, table: &TableRef) -> String {
        format!(
            "{}/projects/{}/queries",
            self.config.api_base.trim_end_matches('/'),
            table.project_id
        )
    }
}

impl AdsDataSource for BigQueryClient {
    fn fetch(&self, table: &TableRef) -> Result<Dataset, FetchError> {
        validate_table_ref(table)?;
        let sql = build_query(table, &self.config.columns)?;
        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or_else(|| FetchError::Connection(format!("no access token (set {TOKEN_ENV})")))?;

        let url = self.queries_url(table);
        debug!(%url, %sql, "Submitting BigQuery query");

        let request = QueryRequest {
            query: &sql,
            use_legacy_sql: false,
            timeout_ms: self.config.timeout.as_millis().min(u128::from(u64::MAX)) as u64,
            max_results: MAX_RESULTS,
            location: self.config.location.as_deref(),
        };

        let client = self
            .client
            .as_ref()
            .map_err(|e| FetchError::Connection(format!("HTTP client unavailable: {e}")))?;
        let response = client.post(&url).bearer_auth(token).json(&request).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(classify_http_error(status.as_u16(), &body));
        }

        let parsed: QueryResponse = response.json()?;
        let records = decode_rows(&parsed)?;
        debug!(rows = records.len(), "BigQuery rows decoded");

        Dataset::new(records, Provenance::Remote)
            .map_err(|(idx, e)| FetchError::Schema(format!("row {idx}: {e}")))
    }
}

/// Standard SQL selecting the mapped columns under their canonical aliases.
pub fn build_query(table: &TableRef, columns: &ColumnMap) -> Result<String, FetchError> {
    for name in [
        &columns.date,
        &columns.campaign,
        &columns.ad_group,
        &columns.clicks,
        &columns.impressions,
        &columns.cost,
        &columns.conversions,
    ] {
        validate_column(name)?;
    }

    Ok(format!(
        "SELECT\n  CAST({} AS DATE) AS {COL_DATE},\n  {} AS {COL_CAMPAIGN},\n  {} AS {COL_AD_GROUP},\n  {} AS {COL_CLICKS},\n  {} AS {COL_IMPRESSIONS},\n  {} AS {COL_COST},\n  {} AS {COL_CONVERSIONS}\nFROM `{table}`\nORDER BY {COL_DATE}",
        columns.date,
        columns.campaign,
        columns.ad_group,
        columns.clicks,
        columns.impressions,
        columns.cost,
        columns.conversions,
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    timeout_ms: u64,
    max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    job_complete: Option<bool>,
    schema: Option<TableSchema>,
    #[serde(default)]
    rows: Vec<TableRow>,
    page_token: Option<String>,
    total_rows: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TableSchema {
    #[serde(default)]
    fields: Vec<FieldSchema>,
}

#[derive(Debug, Deserialize)]
struct FieldSchema {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default)]
    f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
struct TableCell {
    #[serde(default)]
    v: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Column positions of the canonical aliases within the response schema.
struct ColumnIndex {
    date: usize,
    campaign: usize,
    ad_group: usize,
    clicks: usize,
    impressions: usize,
    cost: usize,
    conversions: usize,
}

impl ColumnIndex {
    fn from_schema(schema: &TableSchema) -> Result<Self, FetchError> {
        let find = |name: &str| -> Result<usize, FetchError> {
            schema
                .fields
                .iter()
                .position(|f| f.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| FetchError::Schema(format!("missing column `{name}`")))
        };
        Ok(Self {
            date: find(COL_DATE)?,
            campaign: find(COL_CAMPAIGN)?,
            ad_group: find(COL_AD_GROUP)?,
            clicks: find(COL_CLICKS)?,
            impressions: find(COL_IMPRESSIONS)?,
            cost: find(COL_COST)?,
            conversions: find(COL_CONVERSIONS)?,
        })
    }
}

fn decode_rows(response: &QueryResponse) -> Result<Vec<AdPerformanceRecord>, FetchError> {
    if response.job_complete == Some(false) {
        return Err(FetchError::Connection(
            "query did not complete within the timeout".to_string(),
        ));
    }
    if response.page_token.is_some() {
        warn!(
            total_rows = response.total_rows.as_deref().unwrap_or("?"),
            returned = response.rows.len(),
            "BigQuery result is paged; only the first page is used"
        );
    }
    if response.rows.is_empty() {
        return Ok(Vec::new());
    }

    let schema = response
        .schema
        .as_ref()
        .ok_or_else(|| FetchError::Schema("response has rows but no schema".to_string()))?;
    let idx = ColumnIndex::from_schema(schema)?;

    let mut out = Vec::with_capacity(response.rows.len());
    for (row_no, row) in response.rows.iter().enumerate() {
        let cell = |col: usize, name: &str| cell_str(row, col, name, row_no);
        out.push(AdPerformanceRecord {
            date: parse_date(cell(idx.date, COL_DATE)?, row_no)?,
            campaign: cell(idx.campaign, COL_CAMPAIGN)?.to_string(),
            ad_group: cell(idx.ad_group, COL_AD_GROUP)?.to_string(),
            clicks: parse_count(cell(idx.clicks, COL_CLICKS)?, COL_CLICKS, row_no)?,
            impressions: parse_count(cell(idx.impressions, COL_IMPRESSIONS)?, COL_IMPRESSIONS, row_no)?,
            cost: parse_cost(cell(idx.cost, COL_COST)?, row_no)?,
            conversions: parse_count(cell(idx.conversions, COL_CONVERSIONS)?, COL_CONVERSIONS, row_no)?,
        });
    }
    Ok(out)
}

fn cell_str<'a>(row: &'a TableRow, col: usize, name: &str, row_no: usize) -> Result<&'a str, FetchError> {
    match row.f.get(col).map(|c| &c.v) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(Value::Null) | None => Err(FetchError::Schema(format!("row {row_no}: `{name}` is null"))),
        Some(other) => Err(FetchError::Schema(format!(
            "row {row_no}: `{name}` has unexpected value {other}"
        ))),
    }
}

fn parse_date(raw: &str, row_no: usize) -> Result<NaiveDate, FetchError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| FetchError::Schema(format!("row {row_no}: invalid date `{raw}`: {e}")))
}

/// Counts arrive as INT64 strings, or as FLOAT64 strings for computed columns.
fn parse_count(raw: &str, name: &str, row_no: usize) -> Result<u64, FetchError> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<u64>() {
        return Ok(v);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
        _ => Err(FetchError::Schema(format!(
            "row {row_no}: `{name}` is not a non-negative integer (`{raw}`)"
        ))),
    }
}

fn parse_cost(raw: &str, row_no: usize) -> Result<f64, FetchError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FetchError::Schema(format!("row {row_no}: invalid cost `{raw}`"))),
    }
}

fn classify_http_error(status: u16, body: &str) -> FetchError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    match status {
        404 => FetchError::NotFound(message),
        400 if message.starts_with("Not found") => FetchError::NotFound(message),
        400 => FetchError::Schema(message),
        401 | 403 => FetchError::Connection(format!("authorization failed ({status}): {message}")),
        _ => FetchError::Connection(format!("HTTP {status}: {message}")),
    }
}
