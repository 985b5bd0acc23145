//! Analyzer backed by an external command
//!
//! The command receives the request as JSON on stdin and prints a
//! `VehicleAnalysis` JSON object on stdout. Surrounding text and markdown
//! fences are tolerated, which lets CLI wrappers around AI models be
//! plugged in directly.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use detailer_types::VehicleAnalysis;

use crate::analyzer::{AnalysisError, AnalysisRequest, VehicleAnalyzer};
use crate::response::parse_analysis;

pub const DEFAULT_ANALYZER_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandAnalyzer {
    /// Build from a shell-style command line, e.g. `analyzer --model fast`
    pub fn new(command: &str, timeout: Duration) -> Result<Self, AnalysisError> {
        let mut parts = shell_words::split(command)
            .map_err(|e| AnalysisError::InvalidCommand(format!("{}: {}", command, e)))?;
        if parts.is_empty() {
            return Err(AnalysisError::NotConfigured);
        }
        let program = parts.remove(0);
        Ok(Self {
            program,
            args: parts,
            timeout,
        })
    }

    /// Build from an optional configured command line
    pub fn from_config(command: Option<&str>, timeout: Duration) -> Result<Self, AnalysisError> {
        match command {
            Some(cmd) if !cmd.trim().is_empty() => Self::new(cmd, timeout),
            _ => Err(AnalysisError::NotConfigured),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl VehicleAnalyzer for CommandAnalyzer {
    async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<VehicleAnalysis, AnalysisError> {
        let payload =
            serde_json::to_vec(request).map_err(|e| AnalysisError::Parse(e.to_string()))?;

        debug!(
            program = %self.program,
            args = ?self.args,
            assessment_id = %request.assessment_id,
            "running analyzer"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take();
        let run = async move {
            // stdin is dropped at the end of this block so the command sees EOF
            if let Some(mut stdin) = stdin {
                // A command that ignores its input may exit before reading it
                if let Err(e) = stdin.write_all(&payload).await {
                    if e.kind() != ErrorKind::BrokenPipe {
                        return Err(e);
                    }
                }
            }
            child.wait_with_output().await
        };

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| AnalysisError::Timeout(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(program = %self.program, status = %output.status, "analyzer failed");
            return Err(AnalysisError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_analysis(&stdout)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use detailer_types::VehicleClass;

    const BODY: &str = r#"{"bodyType":"sedan","damageAreas":[],"cleanlinessLevel":"clean","recommendedServices":["waxing"],"confidenceScore":0.9}"#;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            assessment_id: "a-1".to_string(),
            vehicle_class: VehicleClass::Sedan,
            images: vec!["front.jpg".to_string()],
            description: "bird droppings".to_string(),
            interior_condition: 80,
            exterior_condition: 40,
        }
    }

    fn sh(script: &str, timeout: Duration) -> CommandAnalyzer {
        CommandAnalyzer::new(&format!("sh -c {}", shell_words::quote(script)), timeout).unwrap()
    }

    #[test]
    fn test_command_is_split_like_a_shell() {
        let analyzer =
            CommandAnalyzer::new("my-tool --model 'fast one'", DEFAULT_ANALYZER_TIMEOUT).unwrap();
        assert_eq!(analyzer.program(), "my-tool");
        assert_eq!(analyzer.args, vec!["--model", "fast one"]);
    }

    #[test]
    fn test_missing_command() {
        assert!(matches!(
            CommandAnalyzer::from_config(None, DEFAULT_ANALYZER_TIMEOUT),
            Err(AnalysisError::NotConfigured)
        ));
        assert!(matches!(
            CommandAnalyzer::from_config(Some("   "), DEFAULT_ANALYZER_TIMEOUT),
            Err(AnalysisError::NotConfigured)
        ));
        assert!(matches!(
            CommandAnalyzer::new("tool 'unterminated", DEFAULT_ANALYZER_TIMEOUT),
            Err(AnalysisError::InvalidCommand(_))
        ));
    }

    #[tokio::test]
    async fn test_reads_request_and_parses_fenced_output() {
        let script = format!(
            "grep -q '\"assessmentId\":\"a-1\"' && printf '```json\\n%s\\n```\\n' '{}'",
            BODY
        );
        let analysis = sh(&script, Duration::from_secs(10))
            .analyze(&request())
            .await
            .unwrap();
        assert_eq!(analysis.body_type, "sedan");
        assert_eq!(analysis.recommended_services, vec!["waxing"]);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let err = sh("echo boom >&2; exit 3", Duration::from_secs(10))
            .analyze(&request())
            .await
            .unwrap_err();
        match err {
            AnalysisError::Failed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_slow_command_times_out() {
        let err = sh("sleep 5", Duration::from_millis(100))
            .analyze(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_missing_program_is_io_error() {
        let analyzer =
            CommandAnalyzer::new("definitely-not-a-real-analyzer-binary", Duration::from_secs(5))
                .unwrap();
        let err = analyzer.analyze(&request()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Io(_)));

        let converted: detailer_types::Error = err.into();
        assert!(matches!(
            converted,
            detailer_types::Error::AnalysisUnavailable(_)
        ));
    }
}
