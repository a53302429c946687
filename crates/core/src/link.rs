use std::sync::LazyLock;

use regex::Regex;

use crate::types::ContentId;

const VIDEO_SEGMENT: &str = "/video/";

static PLAY_PAIR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/play/(\d+)/(\d+)").expect("play pair regex is valid"));

static PLAY_SINGLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/play/(\d+)").expect("play regex is valid"));

/// Pull the content identifier out of a bilibili.tv link.
///
/// `/video/<id>` wins over `/play/...`. For `/play/<season>/<episode>` the
/// episode number is returned, for a bare `/play/<id>` the id itself. Query
/// strings are not stripped.
pub fn extract_id(link: &str) -> Option<ContentId> {
    if link.contains(VIDEO_SEGMENT) {
        // Non-overlapping split from the left; the last piece holds the id.
        let rest = link.split(VIDEO_SEGMENT).last().unwrap_or_default();
        let id = rest.split('/').next().unwrap_or_default();
        return (!id.is_empty()).then(|| ContentId::new(id));
    }

    if let Some(caps) = PLAY_PAIR_REGEX.captures(link) {
        return Some(ContentId::new(&caps[2]));
    }

    PLAY_SINGLE_REGEX
        .captures(link)
        .map(|caps| ContentId::new(&caps[1]))
}
