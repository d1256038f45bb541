use anyhow::Result;
use apihelper::{ApiResponse, Error};
use serde_json::Value;

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// Prints the envelope for either outcome. Failures are printed and then
/// returned so the process exits non-zero.
pub fn print_outcome(outcome: Result<ApiResponse<Value>, Error>) -> Result<()> {
    match outcome {
        Ok(resp) => {
            print_json(&resp);
            Ok(())
        }
        Err(err) => {
            if err.is_unauthorized() {
                tracing::warn!("Token rejected; log in again and update APIHELPER_TOKEN");
            }
            let message = err.to_string();
            let resp: ApiResponse<Value> = err.into_response();
            print_json(&resp);
            anyhow::bail!("{}", message)
        }
    }
}

/// Parses `KEY=VALUE` command-line pairs.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", s))?;
    if key.is_empty() {
        return Err(format!("empty key in {:?}", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_val_pairs() {
        assert_eq!(
            parse_key_val("x-app-version=4.2"),
            Ok(("x-app-version".to_string(), "4.2".to_string()))
        );
        assert_eq!(
            parse_key_val("note=a=b"),
            Ok(("note".to_string(), "a=b".to_string()))
        );
        assert_eq!(parse_key_val("empty="), Ok(("empty".to_string(), String::new())));
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn failure_outcome_is_error() {
        let result = print_outcome(Err(Error::Unauthorized));
        assert_eq!(result.unwrap_err().to_string(), "Authorization Failed!");
    }

    #[test]
    fn success_outcome_is_ok() {
        let resp = ApiResponse {
            result: true,
            msg: "ok".to_string(),
            data: None,
            next_link: None,
        };
        assert!(print_outcome(Ok(resp)).is_ok());
    }
}
