use crate::media::{extension, file_name_from_url, strip_extension, RemoteObject, Resource};

/// Local file name for a resource: the last URL segment when it carries an
/// extension, else the title, else whatever identifies the object
pub(crate) fn file_name_for(object: &RemoteObject, resource: &Resource) -> String {
    file_name_for_url(&resource.uri, &object.title, &object.id)
}

pub(crate) fn file_name_for_url(url: &str, title: &str, fallback: &str) -> String {
    let from_url = sanitize(file_name_from_url(url));
    let title = sanitize(title);

    let name = [&from_url, &title]
        .into_iter()
        .find(|name| extension(name).is_some())
        .or_else(|| [&title, &from_url].into_iter().find(|name| !name.is_empty()))
        .cloned()
        .unwrap_or_else(|| sanitize(fallback));
    name
}

/// The `attempt`-th name tried for `name`: `name`, `stem_1.ext`, `stem_2.ext`...
pub(crate) fn candidate(name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match extension(name) {
        Some(ext) => format!("{}_{}.{}", strip_extension(name), attempt, ext),
        None => format!("{}_{}", name, attempt),
    }
}

/// Keep names inside the output directory and free of control characters
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    cleaned.trim().trim_start_matches('.').to_string()
}
