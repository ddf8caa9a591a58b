use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::compare::{Comparator, ComparisonResult, ErrorReport, MISSING_URLS};
use crate::errors::{ArtmatchError, Result};
use crate::fetch::ImageSource;
use crate::types::ImageLocator;

/// A comparison request as read from standard input.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CompareRequest {
    /// First image URL.
    #[serde(default)]
    pub url1: Option<String>,
    /// Second image URL.
    #[serde(default)]
    pub url2: Option<String>,
}

impl CompareRequest {
    /// Parse a JSON object; arrays and scalars are rejected.
    pub fn from_json(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        if !value.is_object() {
            return Err(ArtmatchError::Serde(serde::de::Error::custom(
                "request must be a JSON object",
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Both locators, or [`ArtmatchError::Input`] if either is absent or empty.
    pub fn validate(&self) -> Result<(ImageLocator, ImageLocator)> {
        let locator = |url: &Option<String>| {
            url.as_deref()
                .and_then(|u| ImageLocator::new(u).ok())
                .ok_or_else(|| ArtmatchError::Input(MISSING_URLS.to_string()))
        };
        Ok((locator(&self.url1)?, locator(&self.url2)?))
    }
}

/// The single JSON document written to standard output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// The comparison ran to completion.
    Result(ComparisonResult),
    /// The request was rejected or an unexpected failure occurred.
    Error(ErrorReport),
}

/// Output document plus process exit status.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Document for standard output.
    pub body: ResponseBody,
    /// Process exit status.
    pub exit_code: u8,
}

impl Response {
    fn completed(result: ComparisonResult) -> Self {
        Self {
            body: ResponseBody::Result(result),
            exit_code: 0,
        }
    }

    /// Failure response for `err`, exiting 1.
    pub fn failed(err: &ArtmatchError) -> Self {
        let report = match err {
            ArtmatchError::Input(_) => ErrorReport::missing_input(),
            other => ErrorReport::unexpected(other.to_string()),
        };
        Self {
            body: ResponseBody::Error(report),
            exit_code: 1,
        }
    }
}

/// Run one request end to end: parse, validate, compare.
pub async fn handle<S: ImageSource + Sync>(input: &str, comparator: &Comparator<S>) -> Response {
    let (url1, url2) = match CompareRequest::from_json(input).and_then(|req| req.validate()) {
        Ok(urls) => urls,
        Err(err) => {
            error!(error = %err, "rejected request");
            return Response::failed(&err);
        }
    };

    match comparator.compare(&url1, &url2).await {
        Ok(result) => Response::completed(result),
        Err(err) => {
            error!(error = %err, "comparison failed");
            Response::failed(&err)
        }
    }
}

/// Write `body` as one JSON document followed by a newline.
pub fn emit<W: Write, T: Serialize>(mut out: W, body: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut out, body)?;
    } else {
        serde_json::to_writer(&mut out, body)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
