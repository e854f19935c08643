//! §4.7: the artifact renderer (C8). Renders the `.properties` sidecar for a
//! generated `.item` and the project-level `talend.project` descriptor.
//! Constants are verbatim from `original_source/translation_service.py`.

use sha2::{Digest, Sha256};

use crate::uuidgen::generate_talend_id;
use migrator_ir::IRParameter;

pub const TALEND_PRODUCT_VERSION: &str = "8.0.1.20250218_0945-patch";
pub const TALEND_PRODUCT_FULLNAME: &str = "Talend Cloud Data Fabric";
pub const PROJECT_TYPE: &str = "DQ";
pub const MIGRATION_TASK_CLASS: &str = "org.talend.repository.model.migration.CheckProductVersionMigrationTask";
pub const MIGRATION_BREAKS_VERSION: &str = "7.1.0";
pub const MIGRATION_VERSION: &str = "7.1.1";
pub const AUTHOR_LOGIN: &str = "etl.migrator@local";

fn project_product_version() -> String {
    format!("{TALEND_PRODUCT_FULLNAME}-{TALEND_PRODUCT_VERSION}")
}

/// `<job_name>.properties` — an XMI `ProcessItem` sidecar.
pub fn render_properties(job_name: &str, generated_at: &str) -> String {
    let item_key = item_key(job_name, generated_at);
    let id = generate_talend_id();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<properties:ProcessItem xmi:version="2.0" xmlns:xmi="http://www.omg.org/XMI" xmlns:properties="http://www.talend.org/0.1/gui/properties" id="{id}">
  <property>
    <id>{id}</id>
    <version>0.1</version>
    <label>{job_name}</label>
    <item_key>{item_key}</item_key>
    <author>
      <login>{author}</login>
    </author>
    <additionalProperties key="created_product_fullname" value="{fullname}"/>
    <additionalProperties key="created_product_version" value="{version}"/>
    <additionalProperties key="created_date" value="{timestamp}"/>
    <additionalProperties key="modified_product_fullname" value="{fullname}"/>
    <additionalProperties key="modified_product_version" value="{version}"/>
    <additionalProperties key="modified_date" value="{timestamp}"/>
  </property>
</properties:ProcessItem>
"#,
        id = id,
        job_name = job_name,
        item_key = item_key,
        author = AUTHOR_LOGIN,
        fullname = TALEND_PRODUCT_FULLNAME,
        version = TALEND_PRODUCT_VERSION,
        timestamp = generated_at,
    )
}

fn item_key(job_name: &str, generated_at: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(job_name.as_bytes());
    hasher.update(generated_at.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// `talend.project` — project descriptor asserting a minimum product version.
pub fn render_project_descriptor(project_name: &str, generated_at: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<talend.project label="{project_name}" author="{author}" productVersion="{product_version}" type="{project_type}">
  <migrationTasks>
    <task class="{task_class}" breaksVersion="{breaks_version}" version="{migration_version}"/>
  </migrationTasks>
  <generatedAt>{timestamp}</generatedAt>
</talend.project>
"#,
        project_name = project_name,
        author = AUTHOR_LOGIN,
        product_version = project_product_version(),
        project_type = PROJECT_TYPE,
        task_class = MIGRATION_TASK_CLASS,
        breaks_version = MIGRATION_BREAKS_VERSION,
        migration_version = MIGRATION_VERSION,
        timestamp = generated_at,
    )
}

/// `Default.properties` for the job's context group — one `name=default`
/// line per DSX `ROOT` parameter (§4.3 "Parameters" / spec Scenario C).
/// Talend resolves an unset default to an empty string at design time, so
/// a parameter with no `Default` in the DSX still gets a line, just blank.
pub fn render_context_properties(parameters: &[IRParameter]) -> String {
    let mut out = String::new();
    for param in parameters {
        out.push_str(&param.name);
        out.push('=');
        if let Some(default) = &param.default_value {
            out.push_str(&escape_properties_value(default));
        }
        out.push('\n');
    }
    out
}

fn escape_properties_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_embed_constants_and_deterministic_item_key() {
        let rendered = render_properties("Sample_Job", "2026-01-01T00:00:00+0000");
        assert!(rendered.contains(TALEND_PRODUCT_VERSION));
        assert!(rendered.contains(AUTHOR_LOGIN));
        let key_a = item_key("Sample_Job", "2026-01-01T00:00:00+0000");
        let key_b = item_key("Sample_Job", "2026-01-01T00:00:00+0000");
        assert_eq!(key_a, key_b);
        assert_eq!(key_a.len(), 64);
    }

    #[test]
    fn project_descriptor_asserts_minimum_version() {
        let rendered = render_project_descriptor("MyProject", "2026-01-01T00:00:00+0000");
        assert!(rendered.contains(MIGRATION_BREAKS_VERSION));
        assert!(rendered.contains(PROJECT_TYPE));
        assert!(rendered.contains("MyProject"));
    }

    #[test]
    fn context_properties_carry_defaults_and_blank_unset_ones() {
        let params = vec![
            IRParameter {
                name: "TEST_Param".to_string(),
                prompt: None,
                default_value: None,
            },
            IRParameter {
                name: "STMT_START".to_string(),
                prompt: Some("Start date".to_string()),
                default_value: Some("2016-03-01".to_string()),
            },
        ];
        let rendered = render_context_properties(&params);
        assert!(rendered.contains("TEST_Param=\n"));
        assert!(rendered.contains("STMT_START=2016-03-01\n"));
    }
}
