//! One request per line in, one response per line out.

use rolodex::{Error, Exchange, Gateway, Request, Response};
use serde_json::Value;

/// Handle a single input line.
///
/// Blank lines produce no output. Lines that aren't a valid request body get an errors-only
/// response with the `BAD_REQUEST` code.
pub async fn handle_line<M: Exchange>(
    gateway: &Gateway<M>,
    line: &str
) -> serde_json::Result<Option<String>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => gateway.execute(request).await,
        Err(e) => {
            tracing::debug!(error = %e, "malformed request line");
            Response::<Value>::from_errors(vec![
                Error::new(format!("Malformed request: {}", e)).with_code("BAD_REQUEST")
            ])
        }
    };

    serde_json::to_string(&response).map(Some)
}
