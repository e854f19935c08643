//! §4.6: the XML emitter (C7). Turns a [`TalendJob`] into Talend's process
//! XMI. Uses `quick_xml::Writer` for the programmatic path (the crate is
//! already a dependency reached for XML in
//! `bsharp_analysis::workspace::csproj::reader`, there on the reading side);
//! re-parses with `quick_xml::Reader` afterwards to confirm well-formedness,
//! the same library on both sides of the round-trip.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use std::io::Cursor;

use crate::error::{CodeGenError, CodeGenResult};
use crate::talend_model::{ElementParameter, Metadata, NodeData, TalendJob, TalendNode};

const XMI_NS: &str = "http://www.omg.org/XMI";
const TALENDFILE_NS: &str = "http://www.talend.org/0.1/gui/process";
const MAPPER_NS: &str = "http://www.talend.org/0.1/gui/mapper";

pub fn render(job: &TalendJob) -> CodeGenResult<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    let mut root = BytesStart::new("talendfile:ProcessType");
    root.push_attribute(("xmi:version", "2.0"));
    root.push_attribute(("xmlns:xmi", XMI_NS));
    root.push_attribute(("xmlns:talendfile", TALENDFILE_NS));
    root.push_attribute(("defaultContext", "Default"));
    root.push_attribute(("jobType", "Standard"));
    root.push_attribute(("name", job.name.as_str()));
    writer
        .write_event(Event::Start(root))
        .map_err(|e| malformed(&job.name, e.to_string()))?;

    for node in &job.nodes {
        write_node(&mut writer, node).map_err(|e| malformed(&job.name, e.to_string()))?;
    }
    for connection in &job.connections {
        write_connection(&mut writer, connection).map_err(|e| malformed(&job.name, e.to_string()))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("talendfile:ProcessType")))
        .map_err(|e| malformed(&job.name, e.to_string()))?;

    let bytes = writer.into_inner().into_inner();
    let rendered = String::from_utf8(bytes).map_err(|e| malformed(&job.name, e.to_string()))?;
    well_formed(&job.name, &rendered)?;
    Ok(rendered)
}

/// §4.6 "Template usage": `tFileInputDelimited`/`tFileOutputDelimited` try
/// the templated path first, falling back to the programmatic one below on
/// template failure, same as the original's `componentTemplates/*.xmlt`
/// lookup falling through to hardcoded XML when no template file is found.
fn write_node(writer: &mut Writer<Cursor<Vec<u8>>>, node: &TalendNode) -> quick_xml::Result<()> {
    if let Some(rendered) = crate::template::render_node(node) {
        match rendered {
            Ok(fragment) => return writer.write_event(Event::Text(BytesText::from_escaped(fragment))),
            Err(err) => {
                log::warn!("template render failed for node '{}', falling back to programmatic XML: {err}", node.unique_name);
            }
        }
    }
    write_node_programmatic(writer, node)
}

/// Render a single node standalone (its own indentation root), for
/// comparing against the templated path in tests.
pub fn render_node_standalone(node: &TalendNode) -> CodeGenResult<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    write_node_programmatic(&mut writer, node).map_err(|e| body_render_failed(node, e.to_string()))?;
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| body_render_failed(node, e.to_string()))
}

/// Render just `node`'s children (`elementParameter`/`metadata`/`nodeData`),
/// no enclosing `<node>` tag. Fills the templated path's `{{BODY}}`
/// placeholder so both paths serialize parameters/metadata identically.
pub fn render_node_body(node: &TalendNode) -> CodeGenResult<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    for param in &node.parameters {
        write_element_parameter(&mut writer, param).map_err(|e| body_render_failed(node, e.to_string()))?;
    }
    for metadata in &node.metadata {
        write_metadata(&mut writer, metadata).map_err(|e| body_render_failed(node, e.to_string()))?;
    }
    if let Some(node_data) = &node.node_data {
        write_node_data(&mut writer, node_data).map_err(|e| body_render_failed(node, e.to_string()))?;
    }
    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| body_render_failed(node, e.to_string()))
}

fn body_render_failed(node: &TalendNode, reason: String) -> CodeGenError {
    CodeGenError::TemplateRenderFailed {
        component: node.component_name.clone(),
        reason,
    }
}

fn write_node_programmatic(writer: &mut Writer<Cursor<Vec<u8>>>, node: &TalendNode) -> quick_xml::Result<()> {
    let mut start = BytesStart::new("node");
    start.push_attribute(("componentName", node.component_name.as_str()));
    start.push_attribute(("componentVersion", node.component_version.as_str()));
    start.push_attribute(("posX", node.pos_x.to_string().as_str()));
    start.push_attribute(("posY", node.pos_y.to_string().as_str()));
    start.push_attribute(("offsetLabelX", "0"));
    start.push_attribute(("offsetLabelY", "0"));
    start.push_attribute(("uniqueName", node.unique_name.as_str()));
    writer.write_event(Event::Start(start))?;

    for param in &node.parameters {
        write_element_parameter(writer, param)?;
    }
    for metadata in &node.metadata {
        write_metadata(writer, metadata)?;
    }
    if let Some(node_data) = &node.node_data {
        write_node_data(writer, node_data)?;
    }

    writer.write_event(Event::End(BytesEnd::new("node")))
}

/// `push_attribute` escapes its value once (quick-xml's `Attribute::from`
/// turns `&`/`<`/`>`/`"` into entities), so callers must hand it raw text,
/// never a value that's already been through a manual `&quot;`-style encode.
fn write_element_parameter(writer: &mut Writer<Cursor<Vec<u8>>>, param: &ElementParameter) -> quick_xml::Result<()> {
    let mut el = BytesStart::new("elementParameter");
    el.push_attribute(("field", param.field.as_str()));
    el.push_attribute(("name", param.name.as_str()));
    if param.rows.is_empty() {
        el.push_attribute(("value", param.value.as_str()));
    }
    if let Some(false) = param.show {
        el.push_attribute(("show", "false"));
    }

    if param.rows.is_empty() {
        return writer.write_event(Event::Empty(el));
    }

    writer.write_event(Event::Start(el))?;
    for row in &param.rows {
        let mut value_el = BytesStart::new("elementValue");
        value_el.push_attribute(("elementRef", row.element_ref.as_str()));
        value_el.push_attribute(("value", row.value.as_str()));
        value_el.push_attribute(("id", row.id.to_string().as_str()));
        writer.write_event(Event::Empty(value_el))?;
    }
    writer.write_event(Event::End(BytesEnd::new("elementParameter")))
}

fn write_metadata(writer: &mut Writer<Cursor<Vec<u8>>>, metadata: &Metadata) -> quick_xml::Result<()> {
    let mut start = BytesStart::new("metadata");
    start.push_attribute(("connector", metadata.connector.as_str()));
    start.push_attribute(("name", metadata.name.as_str()));
    writer.write_event(Event::Start(start))?;

    for column in &metadata.columns {
        let mut col = BytesStart::new("column");
        col.push_attribute(("name", column.name.as_str()));
        col.push_attribute(("type", column.talend_type.as_str()));
        col.push_attribute(("nullable", if column.nullable { "true" } else { "false" }));
        col.push_attribute(("length", column.length.map(|v| v.to_string()).unwrap_or_else(|| "-1".to_string()).as_str()));
        col.push_attribute((
            "precision",
            column.precision.map(|v| v.to_string()).unwrap_or_else(|| "-1".to_string()).as_str(),
        ));
        col.push_attribute(("key", if column.key { "true" } else { "false" }));
        col.push_attribute(("sourceType", column.source_type.as_str()));
        col.push_attribute(("pattern", column.pattern.as_str()));
        col.push_attribute((
            "originalLength",
            column
                .original_length
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-1".to_string())
                .as_str(),
        ));
        col.push_attribute(("usefulColumn", "true"));
        col.push_attribute(("comment", column.comment.as_str()));
        writer.write_event(Event::Empty(col))?;
    }

    writer.write_event(Event::End(BytesEnd::new("metadata")))
}

fn write_node_data(writer: &mut Writer<Cursor<Vec<u8>>>, node_data: &NodeData) -> quick_xml::Result<()> {
    match node_data {
        NodeData::Mapper(mapper) => write_mapper_data(writer, mapper),
        NodeData::Json(value) => {
            let mut start = BytesStart::new("nodeData");
            start.push_attribute(("xsi:type", "json"));
            writer.write_event(Event::Start(start))?;
            let cdata = format!("<![CDATA[{}]]>", value);
            writer.write_event(Event::Text(BytesText::from_escaped(cdata)))?;
            writer.write_event(Event::End(BytesEnd::new("nodeData")))
        }
    }
}

fn write_mapper_data(writer: &mut Writer<Cursor<Vec<u8>>>, mapper: &crate::talend_model::MapperData) -> quick_xml::Result<()> {
    let mut start = BytesStart::new("nodeData");
    start.push_attribute(("xsi:type", "TalendMapper:MapperData"));
    start.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
    start.push_attribute(("xmlns:TalendMapper", MAPPER_NS));
    writer.write_event(Event::Start(start))?;

    writer.write_event(Event::Empty(BytesStart::new("uiProperties")))?;

    for input in &mapper.input_tables {
        let mut el = BytesStart::new("inputTables");
        el.push_attribute(("name", input.name.as_str()));
        el.push_attribute(("matchingMode", input.matching_mode.as_str()));
        el.push_attribute(("lookupMode", input.lookup_mode.as_str()));
        writer.write_event(Event::Start(el))?;
        for entry in &input.entries {
            let mut e = BytesStart::new("mapperTableEntries");
            e.push_attribute(("name", entry.name.as_str()));
            e.push_attribute(("type", entry.type_name.as_str()));
            e.push_attribute(("nullable", if entry.nullable { "true" } else { "false" }));
            writer.write_event(Event::Empty(e))?;
        }
        writer.write_event(Event::End(BytesEnd::new("inputTables")))?;
    }

    for output in &mapper.output_tables {
        let mut el = BytesStart::new("outputTables");
        el.push_attribute(("name", output.name.as_str()));
        writer.write_event(Event::Start(el))?;
        for entry in &output.entries {
            let mut e = BytesStart::new("mapperTableEntries");
            e.push_attribute(("name", entry.name.as_str()));
            e.push_attribute(("expression", entry.expression.as_deref().unwrap_or("")));
            e.push_attribute(("type", entry.type_name.as_str()));
            e.push_attribute(("nullable", if entry.nullable { "true" } else { "false" }));
            writer.write_event(Event::Empty(e))?;
        }
        writer.write_event(Event::End(BytesEnd::new("outputTables")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("nodeData")))
}

fn write_connection(writer: &mut Writer<Cursor<Vec<u8>>>, connection: &crate::talend_model::TalendConnection) -> quick_xml::Result<()> {
    let mut start = BytesStart::new("connection");
    start.push_attribute(("connectorName", connection.connector_name.as_str()));
    start.push_attribute(("label", connection.label.as_str()));
    start.push_attribute(("lineStyle", connection.line_style.to_string().as_str()));
    start.push_attribute(("metaname", connection.metaname.as_str()));
    start.push_attribute(("offsetLabelX", connection.offset_label_x.to_string().as_str()));
    start.push_attribute(("offsetLabelY", connection.offset_label_y.to_string().as_str()));
    start.push_attribute(("source", connection.source.as_str()));
    start.push_attribute(("target", connection.target.as_str()));
    writer.write_event(Event::Start(start))?;

    let mut monitor = BytesStart::new("elementParameter");
    monitor.push_attribute(("field", "CHECK"));
    monitor.push_attribute(("name", "MONITOR_CONNECTION"));
    monitor.push_attribute(("value", "false"));
    writer.write_event(Event::Empty(monitor))?;

    let mut unique = BytesStart::new("elementParameter");
    unique.push_attribute(("field", "TEXT"));
    unique.push_attribute(("name", "UNIQUE_NAME"));
    unique.push_attribute(("value", format!("row{}", connection.source).as_str()));
    writer.write_event(Event::Empty(unique))?;

    for param in &connection.parameters {
        write_element_parameter(writer, param)?;
    }

    writer.write_event(Event::End(BytesEnd::new("connection")))
}

/// §4.6 "Validation": re-parse to confirm well-formedness.
pub fn well_formed(job_name: &str, xml: &str) -> CodeGenResult<()> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
            Err(e) => {
                let pos = reader.buffer_position();
                return Err(malformed(job_name, format!("at byte {pos}: {e}")));
            }
        }
        buf.clear();
    }
}

fn malformed(job: &str, reason: String) -> CodeGenError {
    CodeGenError::MalformedXml {
        job: job.to_string(),
        reason,
    }
}
