use super::*;

fn object(id: &str, title: &str, class: MediaClass, resources: Vec<Resource>) -> RemoteObject {
    RemoteObject {
        id: id.to_string(),
        title: title.to_string(),
        class,
        resources,
    }
}

fn res(uri: &str, size: Option<u64>, info: &str) -> Resource {
    Resource {
        uri: uri.to_string(),
        size,
        protocol_info: Some(info.to_string()),
    }
}

fn jpeg(id: &str, title: &str) -> RemoteObject {
    object(
        id,
        title,
        MediaClass::Image,
        vec![res(
            &format!("http://cam/DO{}.JPG", id),
            Some(1000),
            "http-get:*:image/jpeg:DLNA.ORG_PN=JPEG_LRG",
        )],
    )
}

fn rw2(id: &str, title: &str) -> RemoteObject {
    object(
        id,
        title,
        MediaClass::Image,
        vec![res(
            &format!("http://cam/DO{}.RW2", id),
            Some(20000),
            "http-get:*:image/x-panasonic-rw2:*",
        )],
    )
}

fn mp4(id: &str, title: &str) -> RemoteObject {
    object(
        id,
        title,
        MediaClass::Video,
        vec![
            res(&format!("http://cam/DT{}.JPG", id), Some(9000), "http-get:*:image/jpeg:DLNA.ORG_PN=JPEG_TN"),
            res(&format!("http://cam/DO{}.MP4", id), Some(5000), "http-get:*:video/mp4:*"),
        ],
    )
}

#[test]
fn test_media_class_from_upnp_class() {
    assert_eq!(
        MediaClass::from_upnp_class("object.item.imageItem.photo"),
        Some(MediaClass::Image)
    );
    assert_eq!(
        MediaClass::from_upnp_class(" object.item.videoItem "),
        Some(MediaClass::Video)
    );
    assert_eq!(MediaClass::from_upnp_class("object.container"), None);
    assert_eq!(MediaClass::from_upnp_class("object.item.audioItem"), None);
}

#[test]
fn test_primary_resource_skips_thumbnails() {
    let photo = object(
        "1",
        "P1",
        MediaClass::Image,
        vec![
            res("http://cam/DT1.JPG", Some(90_000_000), "http-get:*:image/jpeg:DLNA.ORG_PN=JPEG_TN"),
            res("http://cam/DO1.JPG", Some(4000), "http-get:*:image/jpeg:DLNA.ORG_PN=JPEG_LRG"),
            res("http://cam/DS1.JPG", Some(100), "http-get:*:image/jpeg:DLNA.ORG_PN=JPEG_SM"),
        ],
    );
    assert_eq!(photo.primary_resource().unwrap().uri, "http://cam/DO1.JPG");
}

#[test]
fn test_primary_resource_prefers_video_and_keeps_order_on_ties() {
    let clip = mp4("7", "P7");
    assert_eq!(clip.primary_resource().unwrap().uri, "http://cam/DO7.MP4");

    let tied = object(
        "2",
        "P2",
        MediaClass::Image,
        vec![Resource::new("http://cam/a.JPG"), Resource::new("http://cam/b.JPG")],
    );
    assert_eq!(tied.primary_resource().unwrap().uri, "http://cam/a.JPG");

    let empty = object("3", "P3", MediaClass::Image, Vec::new());
    assert!(empty.primary_resource().is_none());
    assert!(!empty.is_raw());
}

#[test]
fn test_raw_detection() {
    assert!(rw2("1", "P1").is_raw());
    assert!(!jpeg("1", "P1").is_raw());
    assert!(!mp4("1", "P1").is_raw());
    assert!(Resource::new("http://cam/IMG_0001.CR3?x=1").is_raw());
    assert_eq!(
        res("http://cam/x", None, "http-get:*:image/jpeg:*").mime_type(),
        Some("image/jpeg")
    );
    assert_eq!(res("http://cam/x", None, "http-get:*:*:*").mime_type(), None);
}

#[test]
fn test_base_key() {
    assert_eq!(jpeg("1", "p1050344").base_key(), "P1050344");
    assert_eq!(jpeg("1", "P1050344.JPG").base_key(), "P1050344");

    let untitled = object(
        "1",
        "  ",
        MediaClass::Image,
        vec![Resource::new("http://cam/DO1050344.RW2")],
    );
    assert_eq!(untitled.base_key(), "DO1050344");

    let bare = object("obj-9", "", MediaClass::Image, Vec::new());
    assert_eq!(bare.base_key(), "OBJ-9");
}

#[test]
fn test_group_page_pairs_jpeg_and_raw() {
    let items = group_page(vec![
        jpeg("10", "P100"),
        mp4("11", "P101"),
        rw2("12", "P100"),
        jpeg("13", "P102"),
    ]);

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].key(), "P100");
    assert_eq!(items[0].kind(), MediaKind::Photo);
    assert_eq!(items[0].object_ids().collect::<Vec<_>>(), vec!["10", "12"]);
    assert!(items[0].has_raw());
    assert_eq!(items[0].jpeg().unwrap().id, "10");
    assert_eq!(items[0].to_string(), "<Photo+RAW: P100>");

    assert_eq!(items[1].kind(), MediaKind::Video);
    assert!(items[1].jpeg().is_none());
    assert_eq!(items[1].to_string(), "<Video: P101>");

    assert_eq!(items[2].key(), "P102");
    assert!(!items[2].has_raw());
}

#[test]
fn test_group_page_does_not_pair_ambiguous_groups() {
    // Two JPEGs with the same title are distinct shots
    let items = group_page(vec![jpeg("1", "P1"), jpeg("2", "P1")]);
    assert_eq!(items.len(), 2);

    // A clip and its still frame share a key but are not a RAW pair
    let items = group_page(vec![mp4("3", "P3"), jpeg("4", "P3")]);
    assert_eq!(items.len(), 2);

    let items = group_page(vec![jpeg("5", "P5"), rw2("6", "P5"), rw2("7", "P5")]);
    assert_eq!(items.len(), 3);

    assert!(group_page(Vec::new()).is_empty());
}

#[test]
fn test_pair_lists_every_object_id() {
    let items = group_page(vec![jpeg("10", "P100"), rw2("12", "P100")]);
    assert_eq!(items[0].object_ids().collect::<Vec<_>>(), vec!["10", "12"]);
    assert_eq!(items[0].key(), "P100");

    let alone = LogicalMediaItem::single(jpeg("10", "P100"));
    assert_eq!(alone.object_ids().collect::<Vec<_>>(), vec!["10"]);
    assert_eq!(alone.key(), items[0].key());
}

#[test]
fn test_url_helpers() {
    assert_eq!(file_name_from_url("http://cam:50001/a/DO1.JPG?t=1#f"), "DO1.JPG");
    assert_eq!(extension("DO1.JPG"), Some("JPG"));
    assert_eq!(extension("README"), None);
    assert_eq!(strip_extension(".hidden"), ".hidden");
    assert_eq!(strip_extension("a.b.c"), "a.b");

    assert_eq!(
        replace_url_extension("http://cam:50001/DO1050344.JPG", "RW2").as_deref(),
        Some("http://cam:50001/DO1050344.RW2")
    );
    assert_eq!(
        replace_url_extension("http://cam/JPG/DO1.JPG?size=JPG", "RW2").as_deref(),
        Some("http://cam/JPG/DO1.RW2?size=JPG")
    );
    assert_eq!(replace_url_extension("http://cam/object", "RW2"), None);
}
