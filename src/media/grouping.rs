use super::{LogicalMediaItem, RemoteObject};
use std::collections::HashMap;

/// Fold one Browse page into logical items.
///
/// Objects sharing a base key pair up only when the group is exactly one RAW
/// and one non-RAW image; every other group yields one item per object.
/// Items come out in the order their first object was listed.
pub fn group_page(objects: Vec<RemoteObject>) -> Vec<LogicalMediaItem> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<RemoteObject>> = HashMap::new();

    for object in objects {
        let key = object.base_key();
        let group = groups.entry(key.clone()).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(object);
    }

    let mut items = Vec::with_capacity(order.len());
    for key in order {
        let Some(mut group) = groups.remove(&key) else {
            continue;
        };

        if group.len() == 2 && is_jpeg_raw_pair(&group[0], &group[1]) {
            let second = group.pop();
            let first = group.pop();
            if let (Some(first), Some(second)) = (first, second) {
                items.push(LogicalMediaItem::pair(first, second));
            }
        } else {
            items.extend(group.into_iter().map(LogicalMediaItem::single));
        }
    }

    items
}

fn is_jpeg_raw_pair(a: &RemoteObject, b: &RemoteObject) -> bool {
    a.class == super::MediaClass::Image
        && b.class == super::MediaClass::Image
        && a.is_raw() != b.is_raw()
}
