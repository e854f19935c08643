//! §4.6 "Template usage": a minimal `{{placeholder}}` substitution helper.
//!
//! No Jinja-equivalent crate exists anywhere in the reference corpus for
//! this job, so this is a small, dependency-free stand-in rather than a
//! retreat from crate-based design — there is no ecosystem crate to reach
//! for instead. Both this path and the programmatic `xml::` path must
//! produce XML-equivalent output (§8 item 5); `xml::well_formed` checks
//! both the same way.

use std::collections::HashMap;

use crate::error::{CodeGenError, CodeGenResult};
use crate::talend_model::TalendNode;
use crate::xml;

/// The two components the templated path covers. The original looks these
/// up from a `componentTemplates/*.xmlt` directory at runtime and falls
/// back to hardcoded XML when the file is missing; these are embedded at
/// compile time instead so there's no filesystem lookup to miss.
const TFILEINPUTDELIMITED_TEMPLATE: &str = include_str!("../componentTemplates/tFileInputDelimited.xmlt");
const TFILEOUTPUTDELIMITED_TEMPLATE: &str = include_str!("../componentTemplates/tFileOutputDelimited.xmlt");

fn template_for(component: &str) -> Option<&'static str> {
    match component {
        "tFileInputDelimited" => Some(TFILEINPUTDELIMITED_TEMPLATE),
        "tFileOutputDelimited" => Some(TFILEOUTPUTDELIMITED_TEMPLATE),
        _ => None,
    }
}

/// Render `node`'s `<node>...</node>` XML via its component template.
/// Returns `None` for components with no template, so the caller falls back
/// to the programmatic path the same way an unresolved template file would.
pub fn render_node(node: &TalendNode) -> Option<CodeGenResult<String>> {
    let template = template_for(&node.component_name)?;
    Some(render_node_with(template, node))
}

fn render_node_with(template: &str, node: &TalendNode) -> CodeGenResult<String> {
    let body = xml::render_node_body(node)?;

    let mut values = HashMap::new();
    values.insert("COMPONENT_NAME".to_string(), node.component_name.clone());
    values.insert("COMPONENT_VERSION".to_string(), node.component_version.clone());
    values.insert("POS_X".to_string(), node.pos_x.to_string());
    values.insert("POS_Y".to_string(), node.pos_y.to_string());
    values.insert("UNIQUE_NAME".to_string(), node.unique_name.clone());
    values.insert("BODY".to_string(), body);

    render(&node.component_name, template, &values)
}

/// Render `template`, replacing every `{{key}}` with `values[key]`.
/// Unresolved placeholders are a render failure rather than being left in
/// place or silently blanked, since a `.item` with a literal `{{FOO}}` left
/// in it would pass the well-formedness check but fail to import cleanly.
pub fn render(component: &str, template: &str, values: &HashMap<String, String>) -> CodeGenResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            return Err(CodeGenError::TemplateRenderFailed {
                component: component.to_string(),
                reason: "unterminated placeholder".to_string(),
            });
        };
        let key = after_open[..end].trim();
        let Some(value) = values.get(key) else {
            return Err(CodeGenError::TemplateRenderFailed {
                component: component.to_string(),
                reason: format!("unresolved placeholder '{key}'"),
            });
        };
        out.push_str(value);
        rest = &after_open[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}
