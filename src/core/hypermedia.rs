//! Hypermedia `_links` injection for filtered resources

use serde_json::{Value, json};

/// Append HAL-style navigation links to a filtered resource.
///
/// Adds a `_links` object with three entries:
/// - `self`: the resource's canonical URL, tagged with its kind
/// - `associations`: the collection of all its relations
/// - `associate`: a URI template for creating a relation
///
/// The resource's `id` is not validated; callers invoke this after a
/// successful create/update/fetch that guarantees one. An absent id yields an
/// empty path segment.
pub fn append_links(resource: &mut Value, kind: &str, api_base: &str) {
    let id = id_segment(resource);

    let links = json!({
        "self": {
            "href": format!("/{}/{}/{}", api_base, kind, id),
            "type": kind,
        },
        "associations": {
            "href": format!("/{}/{}/{}/associations", api_base, kind, id),
        },
        "associate": {
            "href": format!("/{}/{}/{}/associate/{{associationName}}", api_base, kind, id),
            "templated": true,
        },
    });

    if let Value::Object(obj) = resource {
        obj.insert("_links".to_string(), links);
    }
}

/// Read the kind tag back out of a linked resource (`_links.self.type`)
pub fn self_link_type(resource: &Value) -> Option<&str> {
    resource
        .get("_links")?
        .get("self")?
        .get("type")?
        .as_str()
}

fn id_segment(resource: &Value) -> String {
    match resource.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}
