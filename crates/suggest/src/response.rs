//! Envelope decoding for the search, blurb and mqlread services.

use serde_json::Value;

use crate::candidate::Candidate;
use crate::error::{Result, SuggestError};

const STATUS_OK: &str = "200 OK";
const MQL_OK: &str = "/api/status/ok";

/// Candidates from a search/autocomplete envelope.
///
/// The list is taken from `list.listItems`, then `result`, then `results`.
pub fn parse_search(body: &str) -> Result<Vec<Candidate>> {
    let o: Value = serde_json::from_str(body)?;
    check_status(&o)?;

    let list = o
        .get("list")
        .and_then(|l| l.get("listItems"))
        .or_else(|| o.get("result"))
        .or_else(|| o.get("results"))
        .ok_or_else(|| {
            SuggestError::UnrecognizedResponse("no list.listItems, result or results".into())
        })?;

    candidates(list)
}

/// Article body from a blurb envelope.
pub fn parse_blurb(body: &str) -> Result<String> {
    let o: Value = serde_json::from_str(body)?;
    check_status(&o)?;

    match o.get("result").and_then(|r| r.get("body")) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(SuggestError::UnrecognizedResponse(
            "blurb without result.body".into(),
        )),
        Some(other) => Ok(other.to_string()),
    }
}

/// Enumeration rows from an mqlread `queries` envelope keyed `"query"`.
pub fn parse_mqlread(body: &str) -> Result<Vec<Candidate>> {
    let o: Value = serde_json::from_str(body)?;
    let Some(q) = o.get("query") else {
        return Err(SuggestError::UnrecognizedResponse(
            "mqlread envelope without query".into(),
        ));
    };

    let code = q.get("code").and_then(Value::as_str).unwrap_or_default();
    if code != MQL_OK {
        return Err(SuggestError::Service {
            code: code.to_string(),
            message: messages(q),
        });
    }

    match q.get("result") {
        Some(list) => candidates(list),
        None => Err(SuggestError::UnrecognizedResponse(
            "mqlread query without result".into(),
        )),
    }
}

fn check_status(o: &Value) -> Result<()> {
    if o.get("status").and_then(Value::as_str) == Some(STATUS_OK) {
        return Ok(());
    }
    Err(SuggestError::Service {
        code: o
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        message: messages(o),
    })
}

fn candidates(list: &Value) -> Result<Vec<Candidate>> {
    match list {
        Value::Array(_) => Ok(serde_json::from_value(list.clone())?),
        Value::Null => Ok(Vec::new()),
        _ => Err(SuggestError::UnrecognizedResponse(
            "candidate list is not an array".into(),
        )),
    }
}

/// Flatten a `messages` array (`[{code, message}, ..]` or strings) to one line.
fn messages(o: &Value) -> String {
    let Some(Value::Array(items)) = o.get("messages") else {
        return String::new();
    };
    items
        .iter()
        .map(|m| match m {
            Value::String(s) => s.clone(),
            other => other
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_prefers_list_items() {
        let body = r#"{"status":"200 OK","list":{"listItems":[{"id":"/film/film","name":"Film"}]},"result":[]}"#;
        let list = parse_search(body).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id.as_deref(), Some("/film/film"));
    }

    #[test]
    fn search_falls_back_to_result_then_results() {
        let a = parse_search(r#"{"status":"200 OK","result":[{"id":"/a"}]}"#).unwrap();
        assert_eq!(a[0].id.as_deref(), Some("/a"));
        let b = parse_search(r#"{"status":"200 OK","results":[{"id":"/b"},{"id":"/c"}]}"#).unwrap();
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn search_without_a_list_is_unrecognized() {
        let err = parse_search(r#"{"status":"200 OK","prefix":"fil"}"#).unwrap_err();
        assert!(matches!(err, SuggestError::UnrecognizedResponse(_)));
    }

    #[test]
    fn non_ok_status_is_a_service_error() {
        let err = parse_search(
            r#"{"status":"400 Bad Request","code":"/api/status/error/input","messages":[{"message":"query is required"}]}"#,
        )
        .unwrap_err();
        match err {
            SuggestError::Service { code, message } => {
                assert_eq!(code, "/api/status/error/input");
                assert_eq!(message, "query is required");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        assert!(matches!(
            parse_search("callback({})"),
            Err(SuggestError::Decode(_))
        ));
    }

    #[test]
    fn blurb_body_is_extracted() {
        let body = r#"{"status":"200 OK","result":{"body":"A 1982 film."}}"#;
        assert_eq!(parse_blurb(body).unwrap(), "A 1982 film.");
        assert!(parse_blurb(r#"{"status":"200 OK","result":{}}"#).is_err());
        assert!(parse_blurb(r#"{"status":"404 Not Found"}"#).is_err());
    }

    #[test]
    fn mqlread_result_is_decoded() {
        let body = r#"{"code":"/api/status/ok","query":{"code":"/api/status/ok","result":[{"id":"/en/alabama","name":"Alabama"},{"id":"/en/alaska","name":"Alaska"}]}}"#;
        let list = parse_mqlread(body).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].display_name(), "Alaska");
    }

    #[test]
    fn mqlread_error_code_is_reported() {
        let body = r#"{"code":"/api/status/error","query":{"code":"/api/status/error","messages":["bad type"]}}"#;
        match parse_mqlread(body).unwrap_err() {
            SuggestError::Service { message, .. } => assert_eq!(message, "bad type"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
