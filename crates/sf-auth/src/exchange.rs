//! Exchange a username for a live session.

use std::future::Future;

use sobject_browser_client::security::sanitize_message;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::credentials::SalesforceCredentials;
use crate::error::{Error, ErrorKind, Result};

/// Turns a username (or alias) into session credentials.
pub trait SessionExchange: Send + Sync {
    /// Obtain credentials for `username`.
    fn exchange(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<SalesforceCredentials>> + Send;
}

/// Exchange through `sf org display --target-org <username> --json`.
///
/// The CLI refreshes the access token from its own auth store when needed.
#[derive(Debug, Clone)]
pub struct SfCliExchange {
    program: String,
}

impl Default for SfCliExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl SfCliExchange {
    /// Use the `sf` binary on `PATH`.
    pub fn new() -> Self {
        Self::with_program("sf")
    }

    /// Use a different executable, e.g. an absolute path to `sf`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this exchange runs.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SessionExchange for SfCliExchange {
    #[instrument(skip(self), fields(program = %self.program))]
    async fn exchange(&self, username: &str) -> Result<SalesforceCredentials> {
        let output = Command::new(&self.program)
            .args(["org", "display", "--target-org", username, "--json"])
            .output()
            .await
            .map_err(|e| {
                Error::with_source(
                    ErrorKind::SfCli(format!("Failed to run {}: {}", self.program, e)),
                    e,
                )
            })?;

        if !output.status.success() {
            return Err(Error::new(ErrorKind::SfCli(format!(
                "sf org display failed: {}",
                failure_message(&output.stdout, &output.stderr)
            ))));
        }

        let creds = SalesforceCredentials::parse_org_display(&output.stdout)?;
        debug!(instance_url = %crate::Credentials::instance_url(&creds), "Session obtained from sf CLI");

        Ok(match creds.username() {
            Some(_) => creds,
            None => creds.with_username(username),
        })
    }
}

/// `sf --json` reports failures as `{"status":1,"message":"..."}` on stdout;
/// older versions only write to stderr.
fn failure_message(stdout: &[u8], stderr: &[u8]) -> String {
    let from_json = serde_json::from_slice::<serde_json::Value>(stdout)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));

    let raw = from_json.unwrap_or_else(|| String::from_utf8_lossy(stderr).trim().to_string());
    sanitize_message(&raw)
}

/// Exchange that ignores the username and reads `SF_INSTANCE_URL` and
/// `SF_ACCESS_TOKEN` from the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvExchange;

impl SessionExchange for EnvExchange {
    async fn exchange(&self, username: &str) -> Result<SalesforceCredentials> {
        Ok(SalesforceCredentials::from_env()?.with_username(username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Credentials;

    #[test]
    fn test_failure_message_prefers_json_message() {
        let stdout = br#"{"status":1,"name":"NamedOrgNotFoundError","message":"No authorization information found for hub@acme.dev."}"#;
        let msg = failure_message(stdout, b"ignored");
        assert_eq!(msg, "No authorization information found for hub@acme.dev.");
    }

    #[test]
    fn test_failure_message_falls_back_to_stderr() {
        let msg = failure_message(b"", b"  command not found  \n");
        assert_eq!(msg, "command not found");
    }

    #[test]
    fn test_failure_message_is_sanitized() {
        let stderr = b"bad token 00Dxx0000001gEF!AQcAQH3k9s7LKbp_example";
        let msg = failure_message(b"", stderr);
        assert!(!msg.contains("AQcAQH3k9s7LKbp"));
    }

    #[tokio::test]
    async fn test_missing_program_is_sf_cli_error() {
        let exchange = SfCliExchange::with_program("sobject-browser-definitely-not-installed");
        let err = exchange.exchange("hub@acme.dev").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SfCli(_)));
        assert!(err.source.is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sf_cli_exchange_parses_stub_output() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("sf");
        std::fs::write(
            &script,
            "#!/bin/sh\necho '{\"status\":0,\"result\":{\"accessToken\":\"00Dxx!tok\",\"instanceUrl\":\"https://acme.my.salesforce.com\",\"apiVersion\":\"61.0\"}}'\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let exchange = SfCliExchange::with_program(script.to_string_lossy());
        let creds = exchange.exchange("hub@acme.dev").await.unwrap();

        assert_eq!(creds.instance_url(), "https://acme.my.salesforce.com");
        assert_eq!(creds.access_token(), "00Dxx!tok");
        assert_eq!(creds.api_version(), "61.0");
        assert_eq!(creds.username(), Some("hub@acme.dev"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sf_cli_exchange_reports_failure() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("sf");
        std::fs::write(
            &script,
            "#!/bin/sh\necho '{\"status\":1,\"message\":\"No authorization information found\"}'\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let exchange = SfCliExchange::with_program(script.to_string_lossy());
        let err = exchange.exchange("hub@acme.dev").await.unwrap_err();
        assert!(err.to_string().contains("No authorization information found"));
    }
}
