use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use reqwest::blocking::Client;
use thiserror::Error;
use url::Url;

use super::model::{Record, TargetTable};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a load produced no table. The UI collapses all variants into one
/// message; the variant is kept for logs and optional details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("could not fetch source: {0}")]
    Network(String),
    #[error("could not parse CSV: {0}")]
    Parse(String),
    #[error("unexpected sheet layout: {0}")]
    Schema(String),
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Something that yields the raw CSV text of the sheet.
pub trait TableSource {
    fn fetch_csv(&self) -> Result<String, LoadError>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

/// Google Sheets CSV export over HTTP.
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

impl TableSource for HttpSource {
    fn fetch_csv(&self) -> Result<String, LoadError> {
        self.client
            .get(self.url.clone())
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(|e| LoadError::Network(e.to_string()))
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// A CSV file on disk (offline mode).
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for FileSource {
    fn fetch_csv(&self) -> Result<String, LoadError> {
        let bytes = std::fs::read(&self.path)
            .map_err(|e| LoadError::Network(format!("{}: {e}", self.path.display())))?;
        String::from_utf8(bytes)
            .map_err(|e| LoadError::Parse(format!("{}: {e}", self.path.display())))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Fetch and parse the sheet. Never returns a partial table.
pub fn load_table(source: &dyn TableSource) -> Result<TargetTable, LoadError> {
    let text = source.fetch_csv()?;
    parse_table(&text)
}

/// Column names the sheet must provide (matched trimmed, case-insensitively).
pub const REQUIRED_COLUMNS: [&str; 6] = ["Date", "Issuer", "Rating", "Target", "Actual_Price", "Note"];

/// Positions of the required columns within a CSV row.
struct ColumnIndex {
    date: usize,
    issuer: usize,
    rating: usize,
    target: usize,
    actual_price: usize,
    note: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| LoadError::Schema(format!("missing '{name}' column")))
        };
        Ok(ColumnIndex {
            date: find("Date")?,
            issuer: find("Issuer")?,
            rating: find("Rating")?,
            target: find("Target")?,
            actual_price: find("Actual_Price")?,
            note: find("Note")?,
        })
    }
}

/// Parse CSV text into a [`TargetTable`].
///
/// * Header names are whitespace-trimmed before lookup.
/// * `Date` must parse on every non-blank row, otherwise the whole load fails.
/// * `Target` / `Actual_Price` cells that are not numbers become missing.
/// * Rows where every cell is blank are skipped.
pub fn parse_table(text: &str) -> Result<TargetTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Parse(format!("reading header: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let cols = ColumnIndex::from_headers(&headers)?;

    let mut records = Vec::new();
    let mut coerced = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let row = result.map_err(|e| LoadError::Parse(format!("row {row_no}: {e}")))?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let cell = |idx: usize| row.get(idx).unwrap_or("");

        let raw_date = cell(cols.date);
        let date = parse_date(raw_date).ok_or_else(|| {
            LoadError::Parse(format!("row {row_no}: cannot parse date '{raw_date}'"))
        })?;

        let mut numeric = |idx: usize, name: &str| match coerce_number(cell(idx)) {
            Ok(v) => v,
            Err(()) => {
                log::warn!("row {row_no}: '{name}' value '{}' is not a number", cell(idx));
                coerced += 1;
                None
            }
        };
        let target = numeric(cols.target, "Target");
        let actual_price = numeric(cols.actual_price, "Actual_Price");

        records.push(Record::new(
            date,
            cell(cols.issuer),
            cell(cols.rating),
            target,
            actual_price,
            cell(cols.note),
        ));
    }

    let mut table = TargetTable::from_records(records);
    table.coerced_cells = coerced;
    Ok(table)
}

// -- Cell helpers --

// `%Y` also accepts one or two digits, so four-digit forms come first and
// anything before year 100 falls through to the `%y` forms.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%m/%d/%y"];

const DATETIME_FORMATS: [&str; 11] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
];

/// Earliest year accepted from a `%Y` field.
const MIN_YEAR: i32 = 100;

/// Parse the date formats Sheets commonly exports. Times and offsets are dropped.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let plausible = |d: &NaiveDate| d.year() >= MIN_YEAR;

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive()).filter(plausible);
    }
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .find(plausible)
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
                .find(plausible)
        })
}

/// `Ok(None)` for a blank cell, `Err(())` for text that is not a finite number.
fn coerce_number(s: &str) -> Result<Option<f64>, ()> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    const HEADER: &str = "Date,Issuer,Rating,Target,Actual_Price,Note";

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct StaticSource(Result<String, LoadError>);

    impl TableSource for StaticSource {
        fn fetch_csv(&self) -> Result<String, LoadError> {
            self.0.clone()
        }

        fn describe(&self) -> String {
            "static".into()
        }
    }

    #[test]
    fn parses_single_row() {
        let csv = format!("{HEADER}\n2024-01-01,BankA,Buy,10.0,8.0,init\n");
        let table = parse_table(&csv).unwrap();
        assert_eq!(table.len(), 1);
        let rec = &table.records[0];
        assert_eq!(rec.date, day(2024, 1, 1));
        assert_eq!(rec.issuer, "BankA");
        assert_eq!(rec.rating, "Buy");
        assert_eq!(rec.target, Some(10.0));
        assert_eq!(rec.actual_price, Some(8.0));
        assert_eq!(rec.note, "init");
        assert_eq!(rec.upside, Some(0.25));
        assert_eq!(rec.upside_text, "+25.0%");
    }

    #[test]
    fn header_whitespace_and_case_do_not_matter() {
        let body = "2024-01-01,BankA,Buy,10.0,8.0,init\n2024-02-01,BankB,Hold,,9.0,x\n";
        let clean = parse_table(&format!("{HEADER}\n{body}")).unwrap();
        let padded = parse_table(&format!(
            " Date ,Issuer  ,  rating,TARGET , Actual_Price,Note \n{body}"
        ))
        .unwrap();
        assert_eq!(clean, padded);
    }

    #[test]
    fn quoted_gviz_output() {
        let csv = "\"Date\",\"Issuer\",\"Rating\",\"Target\",\"Actual_Price\",\"Note\"\n\
                   \"1/15/2024\",\"Bank, Inc\",\"Buy\",\"30\",\"25\",\"raised, again\"\n";
        let table = parse_table(csv).unwrap();
        assert_eq!(table.records[0].date, day(2024, 1, 15));
        assert_eq!(table.records[0].issuer, "Bank, Inc");
        assert_eq!(table.records[0].note, "raised, again");
    }

    #[test]
    fn bad_numbers_become_missing() {
        let csv = format!("{HEADER}\n2024-01-01,BankA,Buy,TBD,8.0,x\n2024-01-02,BankA,Buy,12,n/a,y\n");
        let table = parse_table(&csv).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].target, None);
        assert_eq!(table.records[0].upside, None);
        assert_eq!(table.records[1].actual_price, None);
        assert_eq!(table.records[1].upside_text, "n/a");
        assert_eq!(table.coerced_cells, 2);
    }

    #[test]
    fn zero_price_gives_undefined_upside() {
        let csv = format!("{HEADER}\n2024-01-01,BankA,Buy,10,0,x\n");
        let table = parse_table(&csv).unwrap();
        assert_eq!(table.records[0].upside, None);
    }

    #[test]
    fn missing_column_is_schema_error() {
        let csv = "Date,Issuer,Rating,Target,Note\n2024-01-01,BankA,Buy,10,x\n";
        assert!(matches!(parse_table(csv), Err(LoadError::Schema(_))));
    }

    #[test]
    fn html_login_page_is_schema_error() {
        let html = "<!DOCTYPE html><html><body>Sign in</body></html>";
        assert!(matches!(parse_table(html), Err(LoadError::Schema(_))));
    }

    #[test]
    fn bad_date_fails_whole_load() {
        let csv = format!("{HEADER}\n2024-01-01,BankA,Buy,10,8,x\nsoon,BankB,Buy,10,8,y\n");
        assert!(matches!(parse_table(&csv), Err(LoadError::Parse(_))));
    }

    #[test]
    fn ragged_row_is_parse_error() {
        let csv = format!("{HEADER}\n2024-01-01,BankA,Buy\n");
        assert!(matches!(parse_table(&csv), Err(LoadError::Parse(_))));
    }

    #[test]
    fn blank_rows_are_skipped_and_duplicates_kept() {
        let csv = format!(
            "{HEADER}\n2024-01-01,BankA,Buy,10,8,x\n,,,,,\n2024-01-01,BankA,Buy,10,8,x\n"
        );
        let table = parse_table(&csv).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.issuers, vec!["BankA".to_string()]);
    }

    #[test]
    fn header_only_gives_empty_table() {
        let table = parse_table(&format!("{HEADER}\n")).unwrap();
        assert!(table.is_empty());
        assert!(table.issuers.is_empty());
    }

    #[test]
    fn date_formats() {
        assert_eq!(parse_date("2024-03-05"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("2024/03/05"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("3/5/2024"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date(" 2024-03-05 14:30:00 "), Some(day(2024, 3, 5)));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn two_digit_years_land_in_this_century() {
        assert_eq!(parse_date("1/5/24"), Some(day(2024, 1, 5)));
        assert_eq!(parse_date("12/31/99"), Some(day(1999, 12, 31)));
        assert_eq!(parse_date("1/5/24 09:15"), Some(day(2024, 1, 5)));
        assert_eq!(parse_date("0024-01-05"), None);
    }

    #[test]
    fn datetime_variants() {
        assert_eq!(parse_date("2024-01-05 10:30"), Some(day(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T10:30"), Some(day(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05 10:30:00.123"), Some(day(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T10:30:00.5"), Some(day(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T00:00:00Z"), Some(day(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T23:00:00-05:00"), Some(day(2024, 1, 5)));
    }

    #[test]
    fn datetime_cell_does_not_fail_load() {
        let csv = format!("{HEADER}\n2024-01-05 10:30,BankA,Buy,10,8,x\n1/6/24,BankA,Buy,11,8,y\n");
        let table = parse_table(&csv).unwrap();
        assert_eq!(table.records[0].date, day(2024, 1, 5));
        assert_eq!(table.records[1].date, day(2024, 1, 6));
    }

    #[test]
    fn load_table_propagates_source_failure() {
        let source = StaticSource(Err(LoadError::Network("unreachable".into())));
        assert_eq!(
            load_table(&source),
            Err(LoadError::Network("unreachable".into()))
        );
    }

    #[test]
    fn file_source_reads_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "2024-01-01,BankA,Buy,10,8,x").unwrap();
        let source = FileSource::new(file.path());
        assert_eq!(load_table(&source).unwrap().len(), 1);
    }

    #[test]
    fn invalid_utf8_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Date,Issuer\n2024-01-01,\xff\xfe\n").unwrap();
        let source = FileSource::new(file.path());
        assert!(matches!(load_table(&source), Err(LoadError::Parse(_))));
    }

    /// Serve one canned HTTP response on a local port.
    fn serve_once(response: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream.write_all(response.as_bytes());
        });
        Url::parse(&format!("http://{addr}/sheet/gviz/tq?tqx=out:csv")).unwrap()
    }

    #[test]
    fn http_source_returns_body() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\nContent-Length: 72\r\nConnection: close\r\n\r\n\
             Date,Issuer,Rating,Target,Actual_Price,Note\n2024-01-01,BankA,Buy,10,8,x\n",
        );
        let source = HttpSource::new(url, Duration::from_secs(5)).unwrap();
        let table = load_table(&source).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].issuer, "BankA");
    }

    #[test]
    fn http_forbidden_is_network_error() {
        let url = serve_once("HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let source = HttpSource::new(url, Duration::from_secs(5)).unwrap();
        match source.fetch_csv() {
            Err(LoadError::Network(msg)) => assert!(msg.contains("403"), "{msg}"),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[test]
    fn http_timeout_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            // Accept and never answer.
            let _held = listener.accept();
            std::thread::sleep(Duration::from_secs(3));
        });
        let url = Url::parse(&format!("http://{addr}/slow")).unwrap();
        let source = HttpSource::new(url, Duration::from_millis(200)).unwrap();
        let started = std::time::Instant::now();
        assert!(matches!(source.fetch_csv(), Err(LoadError::Network(_))));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("nope.csv"));
        assert!(matches!(load_table(&source), Err(LoadError::Network(_))));
    }
}
