//! Entitlement value objects.
//!
//! An [`EntitlementDefinition`] is the effective set of feature flags and
//! numeric limits for one plan. One definition exists per plan in the
//! catalog; a resolved, possibly-overridden copy is computed per request and
//! never persisted. Feature keys and limit keys are disjoint enums: a limit
//! key is never a feature key and vice versa.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boolean feature flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    CapacityEngine,
    TimelineView,
    GuestSharing,
    CustomBranding,
    AuditLog,
}

impl FeatureKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKey::CapacityEngine => "capacity_engine",
            FeatureKey::TimelineView => "timeline_view",
            FeatureKey::GuestSharing => "guest_sharing",
            FeatureKey::CustomBranding => "custom_branding",
            FeatureKey::AuditLog => "audit_log",
        }
    }
}

impl std::fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "capacity_engine" => Ok(FeatureKey::CapacityEngine),
            "timeline_view" => Ok(FeatureKey::TimelineView),
            "guest_sharing" => Ok(FeatureKey::GuestSharing),
            "custom_branding" => Ok(FeatureKey::CustomBranding),
            "audit_log" => Ok(FeatureKey::AuditLog),
            _ => Err(format!("invalid feature key: {}", s)),
        }
    }
}

/// Numeric limits. `None` in the definition is the sentinel for "unlimited".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitKey {
    MaxProjects,
    MaxSeats,
    MaxDashboards,
    MaxAttachmentMb,
}

impl LimitKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitKey::MaxProjects => "max_projects",
            LimitKey::MaxSeats => "max_seats",
            LimitKey::MaxDashboards => "max_dashboards",
            LimitKey::MaxAttachmentMb => "max_attachment_mb",
        }
    }

    /// Stable error code for a limit breach, e.g. `MAX_PROJECTS_LIMIT_EXCEEDED`.
    pub fn exceeded_code(&self) -> String {
        format!("{}_LIMIT_EXCEEDED", self.as_str().to_ascii_uppercase())
    }
}

impl std::fmt::Display for LimitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LimitKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max_projects" => Ok(LimitKey::MaxProjects),
            "max_seats" => Ok(LimitKey::MaxSeats),
            "max_dashboards" => Ok(LimitKey::MaxDashboards),
            "max_attachment_mb" => Ok(LimitKey::MaxAttachmentMb),
            _ => Err(format!("invalid limit key: {}", s)),
        }
    }
}

/// Effective entitlements for one plan: five feature flags, four numeric
/// limits (`None` = unlimited), one rate multiplier and one retention window
/// (`None` = never expires).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitlementDefinition {
    pub capacity_engine: bool,
    pub timeline_view: bool,
    pub guest_sharing: bool,
    pub custom_branding: bool,
    pub audit_log: bool,
    pub max_projects: Option<u32>,
    pub max_seats: Option<u32>,
    pub max_dashboards: Option<u32>,
    pub max_attachment_mb: Option<u32>,
    pub api_rate_multiplier: f64,
    pub activity_retention_days: Option<u32>,
}

impl EntitlementDefinition {
    pub fn feature(&self, key: FeatureKey) -> bool {
        match key {
            FeatureKey::CapacityEngine => self.capacity_engine,
            FeatureKey::TimelineView => self.timeline_view,
            FeatureKey::GuestSharing => self.guest_sharing,
            FeatureKey::CustomBranding => self.custom_branding,
            FeatureKey::AuditLog => self.audit_log,
        }
    }

    pub fn limit(&self, key: LimitKey) -> Option<u32> {
        match key {
            LimitKey::MaxProjects => self.max_projects,
            LimitKey::MaxSeats => self.max_seats,
            LimitKey::MaxDashboards => self.max_dashboards,
            LimitKey::MaxAttachmentMb => self.max_attachment_mb,
        }
    }
}

/// Error produced when validating a custom-plan override patch at write time.
#[derive(Debug, Error, PartialEq)]
pub enum OverrideError {
    #[error("override {key} expects a boolean, got {found}")]
    ExpectedBool { key: String, found: String },
    #[error("override {key} expects a non-negative integer or null, got {found}")]
    ExpectedLimit { key: String, found: String },
    #[error("override {key} expects a number, got {found}")]
    ExpectedNumber { key: String, found: String },
}

/// Typed partial patch over [`EntitlementDefinition`], stored on custom-plan
/// organizations. Validated field-by-field when the organization record is
/// written; the resolver merges present fields verbatim.
///
/// Limit fields are doubled `Option`s: the outer layer means "override
/// present", the inner layer keeps `null` = unlimited expressible.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitlementOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_engine: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_view: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_sharing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_branding: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_projects: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_seats: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_dashboards: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attachment_mb: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_rate_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_retention_days: Option<Option<u32>>,
}

impl EntitlementOverrides {
    pub fn is_empty(&self) -> bool {
        *self == EntitlementOverrides::default()
    }

    /// Build a validated patch from a raw key→value map.
    ///
    /// Unknown keys are silently ignored; recognized keys with a wrong-typed
    /// value are rejected. Intended for the write path of the organization
    /// record, so the read path never sees malformed overrides.
    pub fn from_json(map: &serde_json::Map<String, serde_json::Value>) -> Result<Self, OverrideError> {
        use serde_json::Value;

        fn type_name(v: &Value) -> String {
            match v {
                Value::Null => "null".into(),
                Value::Bool(_) => "boolean".into(),
                Value::Number(_) => "number".into(),
                Value::String(_) => "string".into(),
                Value::Array(_) => "array".into(),
                Value::Object(_) => "object".into(),
            }
        }

        fn as_bool(key: &str, v: &Value) -> Result<bool, OverrideError> {
            v.as_bool().ok_or_else(|| OverrideError::ExpectedBool {
                key: key.to_string(),
                found: type_name(v),
            })
        }

        fn as_limit(key: &str, v: &Value) -> Result<Option<u32>, OverrideError> {
            match v {
                Value::Null => Ok(None),
                Value::Number(n) => n
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .map(Some)
                    .ok_or_else(|| OverrideError::ExpectedLimit {
                        key: key.to_string(),
                        found: format!("number {}", n),
                    }),
                other => Err(OverrideError::ExpectedLimit {
                    key: key.to_string(),
                    found: type_name(other),
                }),
            }
        }

        let mut patch = EntitlementOverrides::default();
        for (key, value) in map {
            match key.as_str() {
                "capacity_engine" => patch.capacity_engine = Some(as_bool(key, value)?),
                "timeline_view" => patch.timeline_view = Some(as_bool(key, value)?),
                "guest_sharing" => patch.guest_sharing = Some(as_bool(key, value)?),
                "custom_branding" => patch.custom_branding = Some(as_bool(key, value)?),
                "audit_log" => patch.audit_log = Some(as_bool(key, value)?),
                "max_projects" => patch.max_projects = Some(as_limit(key, value)?),
                "max_seats" => patch.max_seats = Some(as_limit(key, value)?),
                "max_dashboards" => patch.max_dashboards = Some(as_limit(key, value)?),
                "max_attachment_mb" => patch.max_attachment_mb = Some(as_limit(key, value)?),
                "api_rate_multiplier" => {
                    patch.api_rate_multiplier =
                        Some(value.as_f64().ok_or_else(|| OverrideError::ExpectedNumber {
                            key: key.clone(),
                            found: type_name(value),
                        })?)
                }
                "activity_retention_days" => {
                    patch.activity_retention_days = Some(as_limit(key, value)?)
                }
                // Keys that don't name a definition field are ignored.
                _ => {}
            }
        }
        Ok(patch)
    }

    /// Overwrite the fields present in this patch, verbatim.
    pub fn apply(&self, def: &mut EntitlementDefinition) {
        if let Some(v) = self.capacity_engine {
            def.capacity_engine = v;
        }
        if let Some(v) = self.timeline_view {
            def.timeline_view = v;
        }
        if let Some(v) = self.guest_sharing {
            def.guest_sharing = v;
        }
        if let Some(v) = self.custom_branding {
            def.custom_branding = v;
        }
        if let Some(v) = self.audit_log {
            def.audit_log = v;
        }
        if let Some(v) = self.max_projects {
            def.max_projects = v;
        }
        if let Some(v) = self.max_seats {
            def.max_seats = v;
        }
        if let Some(v) = self.max_dashboards {
            def.max_dashboards = v;
        }
        if let Some(v) = self.max_attachment_mb {
            def.max_attachment_mb = v;
        }
        if let Some(v) = self.api_rate_multiplier {
            def.api_rate_multiplier = v;
        }
        if let Some(v) = self.activity_retention_days {
            def.activity_retention_days = v;
        }
    }
}
