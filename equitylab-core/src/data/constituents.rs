//! S&P 500 constituent list scraped from Wikipedia.
//!
//! The page carries a `table#constituents` whose header row names the
//! columns. Columns are located by header text rather than position, so a
//! reordering on the page does not silently shift fields.

use super::provider::DataError;
use super::yahoo::BROWSER_USER_AGENT;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SP500_CONSTITUENTS_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constituent {
    pub symbol: String,
    pub security: String,
    pub sector: String,
    pub sub_industry: String,
    pub headquarters: String,
    pub date_added: String,
    pub cik: String,
    pub founded: String,
}

/// Download and parse the current constituent table.
pub fn fetch_sp500_constituents() -> Result<Vec<Constituent>, DataError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

    let resp = client
        .get(SP500_CONSTITUENTS_URL)
        .send()
        .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
    if !resp.status().is_success() {
        return Err(DataError::Other(format!(
            "HTTP {} for constituents page",
            resp.status()
        )));
    }
    let html = resp
        .text()
        .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

    let constituents = parse_constituents(&html)?;
    tracing::info!(count = constituents.len(), "parsed S&P 500 constituents");
    Ok(constituents)
}

fn selector(css: &str) -> Result<Selector, DataError> {
    Selector::parse(css).map_err(|e| DataError::Other(format!("bad selector '{css}': {e}")))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the constituent table out of the page HTML.
pub fn parse_constituents(html: &str) -> Result<Vec<Constituent>, DataError> {
    let document = Html::parse_document(html);
    let table_sel = selector("table#constituents")?;
    let row_sel = selector("tr")?;
    let th_sel = selector("th")?;
    let td_sel = selector("td")?;

    let table = document.select(&table_sel).next().ok_or_else(|| {
        DataError::ResponseFormatChanged("no table with id 'constituents' on page".into())
    })?;

    let mut rows = table.select(&row_sel);
    let header: Vec<String> = rows
        .next()
        .map(|r| r.select(&th_sel).map(cell_text).collect())
        .unwrap_or_default();

    let column = |name: &str| header.iter().position(|h| h.eq_ignore_ascii_case(name));
    let symbol_idx = column("Symbol").ok_or_else(|| {
        DataError::ResponseFormatChanged("constituents table has no 'Symbol' column".into())
    })?;
    let security_idx = column("Security");
    let sector_idx = column("GICS Sector");
    let sub_idx = column("GICS Sub-Industry");
    let hq_idx = column("Headquarters Location");
    let added_idx = column("Date added");
    let cik_idx = column("CIK");
    let founded_idx = column("Founded");

    let mut out = Vec::new();
    for row in rows {
        let cells: Vec<String> = row.select(&td_sel).map(cell_text).collect();
        let get = |idx: Option<usize>| {
            idx.and_then(|i| cells.get(i))
                .cloned()
                .unwrap_or_default()
        };
        let symbol = get(Some(symbol_idx));
        if symbol.is_empty() {
            continue;
        }
        out.push(Constituent {
            symbol,
            security: get(security_idx),
            sector: get(sector_idx),
            sub_industry: get(sub_idx),
            headquarters: get(hq_idx),
            date_added: get(added_idx),
            cik: get(cik_idx),
            founded: get(founded_idx),
        });
    }

    if out.is_empty() {
        return Err(DataError::ResponseFormatChanged(
            "constituents table has no data rows".into(),
        ));
    }
    Ok(out)
}

/// Distinct sectors in first-seen order.
pub fn sectors(constituents: &[Constituent]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for c in constituents {
        if !c.sector.is_empty() && !seen.contains(&c.sector) {
            seen.push(c.sector.clone());
        }
    }
    seen
}

/// Constituents whose symbol is in `symbols` (case-insensitive), table order.
pub fn filter_symbols<'a>(constituents: &'a [Constituent], symbols: &[&str]) -> Vec<&'a Constituent> {
    constituents
        .iter()
        .filter(|c| symbols.iter().any(|s| s.eq_ignore_ascii_case(&c.symbol)))
        .collect()
}

pub fn filter_sector<'a>(constituents: &'a [Constituent], sector: &str) -> Vec<&'a Constituent> {
    constituents
        .iter()
        .filter(|c| c.sector.eq_ignore_ascii_case(sector))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
        <html><body>
        <table class="wikitable" id="other"><tr><th>Symbol</th></tr><tr><td>NOPE</td></tr></table>
        <table class="wikitable sortable" id="constituents">
          <tbody>
            <tr>
              <th>Symbol</th><th>Security</th><th>GICS Sector</th><th>GICS Sub-Industry</th>
              <th>Headquarters Location</th><th>Date added</th><th>CIK</th><th>Founded</th>
            </tr>
            <tr>
              <td><a href="#">MMM</a></td><td><a href="#">3M</a></td><td>Industrials</td>
              <td>Industrial Conglomerates</td><td>Saint Paul, Minnesota</td><td>1957-03-04</td>
              <td>0000066740</td><td>1902</td>
            </tr>
            <tr>
              <td><a href="#">AAPL</a></td><td>Apple Inc.</td><td>Information Technology</td>
              <td>Technology Hardware, Storage &amp; Peripherals</td><td>Cupertino, California</td>
              <td>1982-11-30</td><td>0000320193</td><td>1977</td>
            </tr>
            <tr>
              <td>AMZN</td><td>Amazon</td><td>Consumer Discretionary</td><td>Broadline Retail</td>
              <td>Seattle, Washington</td><td>2005-11-18</td><td>0001018724</td><td>1994</td>
            </tr>
            <tr>
              <td>GOOG</td><td>Alphabet Inc. (Class C)</td><td>Communication Services</td>
              <td>Interactive Media &amp; Services</td><td>Mountain View, California</td>
              <td>2006-04-03</td><td>0001652044</td><td>1998</td>
            </tr>
            <tr>
              <td>MSFT</td><td>Microsoft</td><td>Information Technology</td><td>Systems Software</td>
              <td>Redmond, Washington</td><td>1994-06-01</td><td>0000789019</td><td>1975</td>
            </tr>
          </tbody>
        </table>
        </body></html>"##;

    #[test]
    fn parses_rows_by_header_name() {
        let rows = parse_constituents(PAGE).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].symbol, "MMM");
        assert_eq!(rows[0].security, "3M");
        assert_eq!(rows[1].sub_industry, "Technology Hardware, Storage & Peripherals");
        assert_eq!(rows[3].cik, "0001652044");
    }

    #[test]
    fn unique_sectors_in_order() {
        let rows = parse_constituents(PAGE).unwrap();
        assert_eq!(
            sectors(&rows),
            vec![
                "Industrials",
                "Information Technology",
                "Consumer Discretionary",
                "Communication Services"
            ]
        );
    }

    #[test]
    fn filters_big_tech() {
        let rows = parse_constituents(PAGE).unwrap();
        let picked: Vec<&str> = filter_symbols(&rows, &["AAPL", "goog", "AMZN"])
            .iter()
            .map(|c| c.symbol.as_str())
            .collect();
        assert_eq!(picked, vec!["AAPL", "AMZN", "GOOG"]);
        assert_eq!(filter_sector(&rows, "information technology").len(), 2);
    }

    #[test]
    fn missing_table_is_format_change() {
        let err = parse_constituents("<html><table id='x'></table></html>").unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
    }
}
