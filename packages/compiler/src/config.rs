//! Configuration
//!
//! The options a host passes in, and the code generation options the
//! pipeline derives from them.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_ROOT_NAMESPACE: &str = "AspNetCore";

/// Host-facing configuration, usually deserialized from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RazorConfiguration {
    /// Selects design-time (editor) code generation instead of runtime.
    pub design_time: bool,
    pub suppress_checksum: bool,
    pub suppress_metadata_attributes: bool,
    pub root_namespace: String,
}

impl Default for RazorConfiguration {
    fn default() -> Self {
        RazorConfiguration {
            design_time: false,
            suppress_checksum: false,
            suppress_metadata_attributes: false,
            root_namespace: DEFAULT_ROOT_NAMESPACE.to_string(),
        }
    }
}

impl RazorConfiguration {
    pub fn from_json(content: &str) -> Result<Self> {
        let config: RazorConfiguration = serde_json::from_str(content)?;
        Ok(config)
    }

    pub fn code_generation_options(&self) -> CodeGenerationOptions {
        CodeGenerationOptions::from_configuration(self)
    }
}

/// Options consumed by lowering and by code generation downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeGenerationOptions {
    pub design_time: bool,
    pub suppress_checksum: bool,
    pub suppress_metadata_attributes: bool,
    pub root_namespace: String,
}

impl CodeGenerationOptions {
    pub fn from_configuration(config: &RazorConfiguration) -> Self {
        // Design time never emits checksums or metadata attributes.
        CodeGenerationOptions {
            design_time: config.design_time,
            suppress_checksum: config.design_time || config.suppress_checksum,
            suppress_metadata_attributes: config.design_time
                || config.suppress_metadata_attributes,
            root_namespace: config.root_namespace.clone(),
        }
    }

    pub fn runtime() -> Self {
        Self::from_configuration(&RazorConfiguration::default())
    }

    pub fn design_time() -> Self {
        Self::from_configuration(&RazorConfiguration {
            design_time: true,
            ..RazorConfiguration::default()
        })
    }
}

impl Default for CodeGenerationOptions {
    fn default() -> Self {
        Self::runtime()
    }
}
