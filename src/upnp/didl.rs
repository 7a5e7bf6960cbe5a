//! DIDL-Lite listings returned in the `Result` field of `Browse`.

use super::xml;
use crate::media::{MediaClass, RemoteObject, Resource};
use tracing::debug;

/// Parse the `item` entries of a DIDL-Lite document. Containers and items
/// of classes other than image/video are skipped.
pub fn parse_didl(document: &str) -> Result<Vec<RemoteObject>, String> {
    if document.trim().is_empty() {
        return Ok(Vec::new());
    }

    let root = xml::parse(document)?;
    let didl = root
        .find("DIDL-Lite")
        .ok_or_else(|| "missing DIDL-Lite element".to_string())?;

    let mut objects = Vec::new();
    for item in didl.children_named("item") {
        let Some(id) = item.attribute("id") else {
            debug!("Skipping DIDL item without id");
            continue;
        };
        let class_text = item.child_text("class").unwrap_or_default();
        let Some(class) = MediaClass::from_upnp_class(class_text) else {
            debug!("Skipping object {} of class '{}'", id, class_text);
            continue;
        };

        let resources = item
            .children_named("res")
            .filter(|res| !res.text.trim().is_empty())
            .map(|res| Resource {
                uri: res.text.trim().to_string(),
                size: res.attribute("size").and_then(|size| size.trim().parse().ok()),
                protocol_info: res.attribute("protocolInfo").map(str::to_string),
            })
            .collect();

        objects.push(RemoteObject {
            id: id.to_string(),
            title: item.child_text("title").unwrap_or_default().to_string(),
            class,
            resources,
        });
    }

    Ok(objects)
}

/// Render objects as a DIDL-Lite document
pub fn render_didl(objects: &[RemoteObject]) -> String {
    let mut out = String::from(
        r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">"#,
    );
    for object in objects {
        let class = match object.class {
            MediaClass::Image => "object.item.imageItem.photo",
            MediaClass::Video => "object.item.videoItem.movie",
        };
        out.push_str(&format!(
            r#"<item id="{}" parentID="0" restricted="0"><dc:title>{}</dc:title><upnp:class>{}</upnp:class>"#,
            xml::escape(&object.id),
            xml::escape(&object.title),
            class
        ));
        for res in &object.resources {
            out.push_str("<res");
            if let Some(info) = &res.protocol_info {
                out.push_str(&format!(r#" protocolInfo="{}""#, xml::escape(info)));
            }
            if let Some(size) = res.size {
                out.push_str(&format!(r#" size="{}""#, size));
            }
            out.push_str(&format!(">{}</res>", xml::escape(&res.uri)));
        }
        out.push_str("</item>");
    }
    out.push_str("</DIDL-Lite>");
    out
}
