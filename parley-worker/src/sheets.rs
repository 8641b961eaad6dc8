//! Translation source backed by the Google Sheets values API
//!
//! Each sheet row is `[key, localized text]`; a leading `key` header row and
//! rows with fewer than two cells are skipped.

use async_trait::async_trait;
use parley::{Error, Result, SheetSettings, TranslationData, TranslationSource};
use serde::Deserialize;
use worker::{Fetch, Method, Request, RequestInit, Url};

const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub struct GoogleSheetsSource;

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

fn fetch_error(e: worker::Error) -> Error {
    Error::TranslatorInitFailed(format!("sheet fetch failed: {e}"))
}

fn values_url(sheet: &SheetSettings, api_key: &str) -> Result<Url> {
    let mut url = Url::parse(SHEETS_API_URL)
        .map_err(|e| Error::TranslatorInitFailed(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| Error::TranslatorInitFailed("invalid sheets API URL".to_string()))?
        .push(&sheet.spreadsheet_id)
        .push("values")
        .push(&sheet.sheet_name);
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

fn rows(values: Vec<Vec<String>>) -> impl Iterator<Item = (String, String)> {
    values
        .into_iter()
        .filter_map(|row| {
            let mut cells = row.into_iter();
            let key = cells.next()?.trim().to_string();
            let text = cells.next()?;
            Some((key, text))
        })
        .filter(|(key, _)| !key.is_empty() && !key.eq_ignore_ascii_case("key"))
}

#[async_trait(?Send)]
impl TranslationSource for GoogleSheetsSource {
    async fn fetch(&self, sheet: &SheetSettings, credentials: &str) -> Result<TranslationData> {
        let url = values_url(sheet, credentials)?;

        let mut init = RequestInit::new();
        init.with_method(Method::Get);
        let request = Request::new_with_init(url.as_str(), &init).map_err(fetch_error)?;
        let mut response = Fetch::Request(request).send().await.map_err(fetch_error)?;

        let status = response.status_code();
        let text = response.text().await.map_err(fetch_error)?;
        if !(200..300).contains(&status) {
            tracing::error!(status, body = %text, "sheets API returned an error");
            return Err(Error::TranslatorInitFailed(format!(
                "sheets API error {status}"
            )));
        }

        let range: ValueRange = serde_json::from_str(&text)?;
        let data = TranslationData::default().with_sheet(sheet.sheet_name.clone(), rows(range.values));
        tracing::info!(
            spreadsheet = %sheet.spreadsheet_id,
            sheet = %sheet.sheet_name,
            "fetched translation sheet"
        );
        Ok(data)
    }
}
