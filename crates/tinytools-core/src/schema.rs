//! JSON schema and example config generation from [`AppConfig`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use schemars::Schema;
use schemars::generate::SchemaSettings;
use serde_json::json;

use crate::AppConfig;
use crate::paths::CONFIG_FILENAME;

/// Generated schema filename.
pub const SCHEMA_FILENAME: &str = "config.schema.json";

/// Generate the draft-07 JSON schema for [`AppConfig`].
pub fn generate_schema(project_name: &str, repo_url: &str) -> Result<String> {
    // draft-07 is what TOML language servers understand
    let generator = SchemaSettings::draft07().into_generator();
    let mut schema: Schema = generator.into_root_schema_for::<AppConfig>();

    schema.insert(
        "$id".to_string(),
        json!(format!("{repo_url}/schemas/{SCHEMA_FILENAME}")),
    );
    schema.insert(
        "title".to_string(),
        json!(format!("{project_name} configuration")),
    );
    schema.insert(
        "description".to_string(),
        json!(format!("Configuration schema for {project_name}")),
    );

    if let Some(props) = schema
        .get_mut("properties")
        .and_then(serde_json::Value::as_object_mut)
    {
        props.insert(
            "$schema".to_string(),
            json!({
                "type": "string",
                "description": "JSON Schema reference for editor support"
            }),
        );
    }

    serde_json::to_string_pretty(&schema).context("serializing JSON schema")
}

/// Generate a commented example TOML configuration from the defaults.
pub fn generate_example_config(project_name: &str, repo_url: &str) -> Result<String> {
    let toml_body = toml::to_string_pretty(&AppConfig::default())
        .context("serializing default config to TOML")?;

    let mut output = format!(
        "\"$schema\" = \"{repo_url}/schemas/{SCHEMA_FILENAME}\"\n\
         # Configuration for {project_name}.\n\
         # Copy this file to $XDG_CONFIG_HOME/{project_name}/{CONFIG_FILENAME} and adjust as needed.\n\n"
    );
    output.push_str(&toml_body);
    Ok(output)
}

/// Write the schema and example config into `output_dir`.
pub fn write_generated_files(output_dir: &Path, project_name: &str, repo_url: &str) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory: {}", output_dir.display()))?;

    let schema_path = output_dir.join(SCHEMA_FILENAME);
    fs::write(&schema_path, generate_schema(project_name, repo_url)?)
        .with_context(|| format!("writing schema to {}", schema_path.display()))?;

    let config_path = output_dir.join(CONFIG_FILENAME);
    fs::write(&config_path, generate_example_config(project_name, repo_url)?)
        .with_context(|| format!("writing config to {}", config_path.display()))?;

    Ok(())
}
