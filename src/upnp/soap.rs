//! SOAP envelopes for ContentDirectory actions and parsing of their replies.

use super::xml::{self, XmlNode};
use crate::camera::{BrowseRequest, BrowseResponse};
use crate::error::ContentDirectoryError;

/// Build a SOAP 1.1 request envelope for `action` on `service_type`
pub fn envelope(action: &str, service_type: &str, arguments: &[(&str, String)]) -> String {
    let mut body = String::new();
    for (name, value) in arguments {
        body.push_str(&format!("<{name}>{}</{name}>", xml::escape(value)));
    }
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" "#,
            r#"s:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#,
            r#"<s:Body><u:{action} xmlns:u="{service}">{body}</u:{action}></s:Body></s:Envelope>"#
        ),
        action = action,
        service = service_type,
        body = body
    )
}

/// Value of the SOAPACTION header
pub fn soap_action_header(action: &str, service_type: &str) -> String {
    format!("\"{}#{}\"", service_type, action)
}

pub fn browse_arguments(request: &BrowseRequest) -> Vec<(&'static str, String)> {
    vec![
        ("ObjectID", request.object_id.clone()),
        ("BrowseFlag", "BrowseDirectChildren".to_string()),
        ("Filter", request.filter.clone()),
        ("StartingIndex", request.starting_index.to_string()),
        ("RequestedCount", request.requested_count.to_string()),
        ("SortCriteria", request.sort_criteria.clone()),
    ]
}

fn action_response<'a>(root: &'a XmlNode, action: &str) -> Option<&'a XmlNode> {
    root.find(&format!("{}Response", action))
}

fn required_number(
    node: &XmlNode,
    field: &str,
    action: &str,
) -> Result<u32, ContentDirectoryError> {
    let text = node
        .child_text(field)
        .ok_or_else(|| ContentDirectoryError::malformed(action, format!("missing {}", field)))?;
    text.parse().map_err(|_| {
        ContentDirectoryError::malformed(action, format!("{} is not a number: '{}'", field, text))
    })
}

/// Parse the body of a successful `Browse` reply
pub fn parse_browse_response(body: &str) -> Result<BrowseResponse, ContentDirectoryError> {
    let root = xml::parse(body).map_err(|e| ContentDirectoryError::malformed("Browse", e))?;
    let response = action_response(&root, "Browse")
        .ok_or_else(|| ContentDirectoryError::malformed("Browse", "missing BrowseResponse"))?;

    let result = response
        .child("Result")
        .map(|node| node.text.clone())
        .ok_or_else(|| ContentDirectoryError::malformed("Browse", "missing Result"))?;

    Ok(BrowseResponse {
        result,
        number_returned: required_number(response, "NumberReturned", "Browse")?,
        total_matches: required_number(response, "TotalMatches", "Browse")?,
        update_id: response
            .child_text("UpdateID")
            .and_then(|text| text.parse().ok()),
    })
}

/// Check that a reply carries the expected `<action>Response` element
pub fn expect_action_response(body: &str, action: &str) -> Result<(), ContentDirectoryError> {
    let root = xml::parse(body).map_err(|e| ContentDirectoryError::malformed(action, e))?;
    action_response(&root, action)
        .map(|_| ())
        .ok_or_else(|| ContentDirectoryError::malformed(action, format!("missing {}Response", action)))
}

/// Extract `(errorCode, errorDescription)` from a SOAP fault body
pub fn parse_fault(body: &str) -> Option<(u32, String)> {
    let root = xml::parse(body).ok()?;
    let error = root.find("UPnPError")?;
    let code = error.child_text("errorCode")?.parse().ok()?;
    let description = error.child_text("errorDescription").unwrap_or_default().to_string();
    Some((code, description))
}
