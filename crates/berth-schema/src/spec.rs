use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read container spec file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse container spec: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported spec_version: {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("image must not be empty")]
    EmptyImage,
}

/// A container creation request, as written in `berth.toml`.
///
/// ```toml
/// spec_version = 1
/// image = "registry.example.com/app:1.2"
/// name = "web"
/// env = ["PATH=/usr/bin", "DEBUG=1"]
/// security_opt = ["apparmor=docker-default", "seccomp=unconfined"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContainerSpec {
    #[serde(default = "default_version")]
    pub spec_version: u32,
    pub image: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default)]
    pub security_opt: Vec<String>,
}

fn default_version() -> u32 {
    1
}

impl ContainerSpec {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            spec_version: default_version(),
            image: image.into(),
            name: None,
            env: Vec::new(),
            security_opt: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        if self.spec_version != 1 {
            return Err(SpecError::UnsupportedVersion(self.spec_version));
        }
        if self.image.trim().is_empty() {
            return Err(SpecError::EmptyImage);
        }
        Ok(())
    }
}

pub fn parse_spec_str(input: &str) -> Result<ContainerSpec, SpecError> {
    let spec: ContainerSpec = toml::from_str(input)?;
    spec.validate()?;
    Ok(spec)
}

pub fn parse_spec_file(path: impl AsRef<Path>) -> Result<ContainerSpec, SpecError> {
    let content = fs::read_to_string(path)?;
    parse_spec_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_spec() {
        let input = r#"
spec_version = 1
image = "alpine:3.20"
name = "web"
env = ["A=1", "B"]
security_opt = ["apparmor=docker-default"]
"#;
        let spec = parse_spec_str(input).expect("should parse");
        assert_eq!(spec.image, "alpine:3.20");
        assert_eq!(spec.name.as_deref(), Some("web"));
        assert_eq!(spec.env, vec!["A=1", "B"]);
        assert_eq!(spec.security_opt.len(), 1);
    }

    #[test]
    fn parses_minimal_spec() {
        let spec = parse_spec_str("image = \"busybox\"\n").expect("should parse");
        assert_eq!(spec.spec_version, 1);
        assert!(spec.name.is_none());
        assert!(spec.env.is_empty());
        assert!(spec.security_opt.is_empty());
    }

    #[test]
    fn rejects_unknown_fields() {
        let input = r#"
image = "busybox"
privileged = true
"#;
        assert!(parse_spec_str(input).is_err());
    }

    #[test]
    fn rejects_empty_image() {
        assert!(matches!(
            parse_spec_str("image = \"  \"\n"),
            Err(SpecError::EmptyImage)
        ));
    }

    #[test]
    fn rejects_future_version() {
        assert!(matches!(
            parse_spec_str("spec_version = 2\nimage = \"busybox\"\n"),
            Err(SpecError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("berth.toml");
        fs::write(&path, "image = \"busybox\"\nname = \"box\"\n").unwrap();
        let spec = parse_spec_file(&path).unwrap();
        assert_eq!(spec.name.as_deref(), Some("box"));
    }
}
