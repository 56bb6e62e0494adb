//! Writes a generated token into the scanner's properties file.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{ProvisionStage, Result, SonarError};
use crate::fs::write_atomic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenWrite {
    /// The placeholder was found and replaced.
    Placeholder,
    /// The placeholder was already consumed; the token property was rewritten.
    PropertyRewritten,
}

#[derive(Debug, Clone)]
pub struct ScanConfigArtifact {
    pub path: PathBuf,
    pub placeholder: String,
    pub token_property: String,
}

impl ScanConfigArtifact {
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        placeholder: impl Into<String>,
        token_property: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            placeholder: placeholder.into(),
            token_property: token_property.into(),
        }
    }

    /// Confirms the file is readable and has somewhere to put a token,
    /// without touching it. Returns the write that [`Self::write_token`]
    /// would perform.
    pub fn check(&self) -> Result<TokenWrite> {
        let content = self.read()?;
        self.substitute(&content, "").map(|(_, mode)| mode)
    }

    /// Substitutes `secret` for the first placeholder occurrence. When the
    /// placeholder is gone (a re-run), the value of the token property line is
    /// replaced instead.
    pub fn write_token(&self, secret: &str) -> Result<TokenWrite> {
        let content = self.read()?;
        let (updated, mode) = self.substitute(&content, secret)?;
        write_atomic(&self.path, &updated)
            .map_err(|err| scan_config_error(&self.path, &err.to_string()))?;
        Ok(mode)
    }

    fn read(&self) -> Result<String> {
        std::fs::read_to_string(&self.path)
            .map_err(|err| scan_config_error(&self.path, &err.to_string()))
    }

    fn substitute(&self, content: &str, secret: &str) -> Result<(String, TokenWrite)> {
        if content.contains(&self.placeholder) {
            return Ok((
                content.replacen(&self.placeholder, secret, 1),
                TokenWrite::Placeholder,
            ));
        }
        rewrite_property(content, &self.token_property, secret)
            .map(|updated| (updated, TokenWrite::PropertyRewritten))
            .ok_or_else(|| {
                scan_config_error(
                    &self.path,
                    &format!(
                        "neither placeholder {} nor property {} found",
                        self.placeholder, self.token_property
                    ),
                )
            })
    }
}

fn scan_config_error(path: &Path, detail: &str) -> SonarError {
    SonarError::Provision {
        stage: ProvisionStage::ScanConfig,
        status: None,
        body_excerpt: format!("{}: {detail}", path.display()),
    }
}

/// Rewrites the first `key=value` (or `key: value`) line for `key`.
fn rewrite_property(content: &str, key: &str, value: &str) -> Option<String> {
    let mut replaced = false;
    let mut out = Vec::new();
    for line in content.split_inclusive('\n') {
        if !replaced && property_key(line) == Some(key) {
            let ending = if line.ends_with("\r\n") {
                "\r\n"
            } else if line.ends_with('\n') {
                "\n"
            } else {
                ""
            };
            out.push(format!("{key}={value}{ending}"));
            replaced = true;
        } else {
            out.push(line.to_string());
        }
    }
    replaced.then(|| out.concat())
}

fn property_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') || trimmed.starts_with('!') {
        return None;
    }
    let end = trimmed.find(['=', ':'])?;
    Some(trimmed[..end].trim_end())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    const PROPERTIES: &str = "sonar.projectKey=sample-project\n\
        # sonar.token=commented\n\
        sonar.token=<TOKEN_PLACEHOLDER>\n\
        sonar.sources=src\n";

    fn artifact(path: &Path) -> ScanConfigArtifact {
        ScanConfigArtifact::new(path, "<TOKEN_PLACEHOLDER>", "sonar.token")
    }

    #[test]
    fn placeholder_is_replaced_exactly_once() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("sonar-project.properties");
        fs::write(&path, PROPERTIES).expect("seed");

        let mode = artifact(&path).write_token("abc123").expect("write");
        assert_eq!(mode, TokenWrite::Placeholder);
        let written = fs::read_to_string(&path).expect("read");
        assert!(written.contains("sonar.token=abc123\n"));
        assert!(!written.contains("<TOKEN_PLACEHOLDER>"));
        assert!(written.contains("# sonar.token=commented"));
    }

    #[test]
    fn rerun_rewrites_existing_token_property() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("sonar-project.properties");
        fs::write(&path, PROPERTIES).expect("seed");
        artifact(&path).write_token("first").expect("first");

        let mode = artifact(&path).write_token("second").expect("second");
        assert_eq!(mode, TokenWrite::PropertyRewritten);
        let written = fs::read_to_string(&path).expect("read");
        assert!(written.contains("sonar.token=second\n"));
        assert!(!written.contains("first"));
        assert!(written.ends_with("sonar.sources=src\n"));
    }

    #[test]
    fn missing_placeholder_and_property_is_a_scan_config_error() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("sonar-project.properties");
        fs::write(&path, "sonar.projectKey=x\n").expect("seed");

        match artifact(&path).write_token("abc") {
            Err(SonarError::Provision { stage, status, .. }) => {
                assert_eq!(stage, ProvisionStage::ScanConfig);
                assert_eq!(status, None);
            }
            other => panic!("expected scan-config error, got: {other:?}"),
        }
    }

    #[test]
    fn check_reports_the_pending_write_and_leaves_the_file_alone() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("sonar-project.properties");
        fs::write(&path, PROPERTIES).expect("seed");

        assert_eq!(artifact(&path).check().expect("check"), TokenWrite::Placeholder);
        assert_eq!(fs::read_to_string(&path).expect("read"), PROPERTIES);

        artifact(&path).write_token("abc").expect("write");
        assert_eq!(
            artifact(&path).check().expect("check"),
            TokenWrite::PropertyRewritten
        );

        fs::write(&path, "sonar.projectKey=x\n").expect("reseed");
        assert!(artifact(&path).check().is_err());
    }

    #[test]
    fn missing_file_is_a_scan_config_error() {
        let temp = tempdir().expect("tempdir");
        let err = artifact(&temp.path().join("absent.properties"))
            .write_token("abc")
            .expect_err("must fail");
        assert!(err.to_string().contains("scan-config"));
    }
}
