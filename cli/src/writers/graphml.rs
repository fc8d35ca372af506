use std::io::Cursor;

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use classgraph_core::GraphView;

const KEY_SIZE: &str = "d_size";
const KEY_EXTERNAL: &str = "d_external";

/// Hand-rolled GraphML writer over `quick-xml`'s `Writer` (the teacher
/// crate already depends on `quick-xml`; this reuses it rather than
/// pulling in a dedicated GraphML crate).
pub(crate) fn render(view: &GraphView) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut graphml = BytesStart::new("graphml");
    graphml.push_attribute(("xmlns", "http://graphml.graphdrawing.org/xmlns"));
    writer.write_event(Event::Start(graphml))?;

    write_key(&mut writer, KEY_SIZE, "node", "size", "long")?;
    write_key(&mut writer, KEY_EXTERNAL, "node", "external", "boolean")?;

    let mut graph = BytesStart::new("graph");
    graph.push_attribute(("id", "G"));
    graph.push_attribute(("edgedefault", "directed"));
    writer.write_event(Event::Start(graph))?;

    for node in view.nodes() {
        let mut node_el = BytesStart::new("node");
        node_el.push_attribute(("id", node.id.as_str()));
        writer.write_event(Event::Start(node_el))?;

        write_data(&mut writer, KEY_SIZE, &node.size.to_string())?;
        write_data(&mut writer, KEY_EXTERNAL, &node.external.to_string())?;

        writer.write_event(Event::End(BytesEnd::new("node")))?;
    }

    for (index, (src, dst)) in view.edges().enumerate() {
        let mut edge_el = BytesStart::new("edge");
        edge_el.push_attribute(("id", format!("e{index}").as_str()));
        edge_el.push_attribute(("source", src));
        edge_el.push_attribute(("target", dst));
        writer.write_event(Event::Empty(edge_el))?;
    }

    writer.write_event(Event::End(BytesEnd::new("graph")))?;
    writer.write_event(Event::End(BytesEnd::new("graphml")))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

fn write_key<W: std::io::Write>(
    writer: &mut Writer<W>,
    id: &str,
    domain: &str,
    attr_name: &str,
    attr_type: &str,
) -> Result<()> {
    let mut key = BytesStart::new("key");
    key.push_attribute(("id", id));
    key.push_attribute(("for", domain));
    key.push_attribute(("attr.name", attr_name));
    key.push_attribute(("attr.type", attr_type));
    writer.write_event(Event::Empty(key))?;
    Ok(())
}

fn write_data<W: std::io::Write>(writer: &mut Writer<W>, key: &str, value: &str) -> Result<()> {
    let mut data = BytesStart::new("data");
    data.push_attribute(("key", key));
    writer.write_event(Event::Start(data))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new("data")))?;
    Ok(())
}
