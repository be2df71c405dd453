//! Manifest loading
//!
//! ```json
//! {
//!   "resources": [
//!     {"type": "firewall_address", "name": "web", "attributes": {"name": "web-srv"}}
//!   ]
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, bail};
use fortios_core::resource::{Resource, Value};
use fortios_core::schema::ResourceSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    resources: Vec<ManifestResource>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestResource {
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    attributes: serde_json::Map<String, serde_json::Value>,
}

/// Read a manifest file into desired resources, in declaration order
pub fn load(path: &Path, schemas: &HashMap<String, ResourceSchema>) -> Result<Vec<Resource>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&content, schemas).with_context(|| format!("Invalid manifest {}", path.display()))
}

pub fn parse(content: &str, schemas: &HashMap<String, ResourceSchema>) -> Result<Vec<Resource>> {
    let manifest: Manifest = serde_json::from_str(content)?;

    let mut seen = HashSet::new();
    let mut resources = Vec::with_capacity(manifest.resources.len());
    for entry in manifest.resources {
        if !schemas.contains_key(&entry.resource_type) {
            bail!("Unknown resource type: {}", entry.resource_type);
        }
        if !seen.insert((entry.resource_type.clone(), entry.name.clone())) {
            bail!("Duplicate resource {}.{}", entry.resource_type, entry.name);
        }

        let mut resource = Resource::new(entry.resource_type, entry.name);
        for (key, value) in &entry.attributes {
            if let Some(value) = Value::from_json(value) {
                resource.attributes.insert(key.clone(), value);
            }
        }
        resources.push(resource);
    }
    Ok(resources)
}

/// Validate every resource against its schema, collecting all errors
pub fn validate(resources: &[Resource], schemas: &HashMap<String, ResourceSchema>) -> Result<()> {
    let mut all_errors = Vec::new();

    for resource in resources {
        if let Some(schema) = schemas.get(&resource.id.resource_type)
            && let Err(errors) = schema.validate(&resource.attributes)
        {
            for error in errors {
                all_errors.push(format!("{}: {}", resource.id, error));
            }
        }
    }

    if all_errors.is_empty() {
        Ok(())
    } else {
        bail!("Validation failed:\n  {}", all_errors.join("\n  "))
    }
}
