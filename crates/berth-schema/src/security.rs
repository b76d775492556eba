use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecurityOptError {
    #[error("invalid security option '{option}': {reason}")]
    InvalidSecurityOption { option: String, reason: String },
}

/// Confinement settings attached to a container's metadata.
///
/// `None` means the runtime default applies.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apparmor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seccomp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_new_privileges: Option<bool>,
}

impl SecurityProfile {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Render the profile back to `key=value` directives, in a fixed key order.
    pub fn to_options(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(ref v) = self.apparmor {
            out.push(format!("apparmor={v}"));
        }
        if let Some(ref v) = self.seccomp {
            out.push(format!("seccomp={v}"));
        }
        if let Some(v) = self.no_new_privileges {
            out.push(format!("no-new-privileges={v}"));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SecurityOpt {
    AppArmor(String),
    Seccomp(String),
    NoNewPrivileges(bool),
}

fn invalid(option: &str, reason: &str) -> SecurityOptError {
    SecurityOptError::InvalidSecurityOption {
        option: option.to_owned(),
        reason: reason.to_owned(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_one(option: &str) -> Result<SecurityOpt, SecurityOptError> {
    let Some((key, value)) = option.split_once('=') else {
        return Err(invalid(option, "must be in format of key=value"));
    };
    match key {
        "apparmor" => Ok(SecurityOpt::AppArmor(value.to_owned())),
        "seccomp" => Ok(SecurityOpt::Seccomp(value.to_owned())),
        "no-new-privileges" => parse_bool(value)
            .map(SecurityOpt::NoNewPrivileges)
            .ok_or_else(|| invalid(option, "no-new-privileges expects a boolean")),
        _ => Err(invalid(
            option,
            "unknown key, expected one of apparmor, seccomp, no-new-privileges",
        )),
    }
}

/// Validate `options` and apply them to `profile`.
///
/// Every entry is checked before anything is written, so on error `profile` is
/// unchanged. When a key repeats, the last occurrence wins.
pub fn parse_security_opts<S: AsRef<str>>(
    profile: &mut SecurityProfile,
    options: &[S],
) -> Result<(), SecurityOptError> {
    let parsed = options
        .iter()
        .map(|o| parse_one(o.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    for opt in parsed {
        match opt {
            SecurityOpt::AppArmor(v) => profile.apparmor = Some(v),
            SecurityOpt::Seccomp(v) => profile.seccomp = Some(v),
            SecurityOpt::NoNewPrivileges(v) => profile.no_new_privileges = Some(v),
        }
    }
    Ok(())
}
