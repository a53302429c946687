use reqwest::{Client, header};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    error::{BilitvError, Result},
    session::Session,
    types::{ContentId, IdKind, Playurl, QualityTier, StreamSet},
};

/// Quality hint sent with episode requests.
const EPISODE_QN: &str = "64";
/// Quality hint sent with asset requests.
const ASSET_QN: &str = "120";
const LOCALE: &str = "en_US";

/// Resolves identifiers to a video and an audio stream URL through the playurl API.
pub struct StreamResolver {
    client: Client,
    session: Session,
}

impl StreamResolver {
    pub fn with_client(client: Client, session: Session) -> Self {
        Self { client, session }
    }

    pub async fn resolve(&self, id: &ContentId, qualities: &QualityTier) -> Result<StreamSet> {
        let query = build_query(id);
        debug!(%id, kind = ?id.kind(), ?query, "Requesting playurl");

        let response = self
            .client
            .get(&self.session.api_url)
            .query(&query)
            .header(header::REFERER, &self.session.referer)
            .header(header::COOKIE, &self.session.cookie)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BilitvError::Api { status });
        }

        let body: Value = serde_json::from_str(&response.text().await?)?;
        let playurl = parse_playurl(&body)?;

        let (quality, video_url) =
            select_video(&playurl, qualities).ok_or(BilitvError::NoStreams)?;
        let audio_url = select_audio(&playurl).ok_or(BilitvError::NoStreams)?;
        info!(%id, quality, "Resolved streams");

        Ok(StreamSet {
            video_url: video_url.to_string(),
            audio_url: audio_url.to_string(),
            quality,
        })
    }
}

/// Query parameters for the playurl request, chosen by identifier kind.
pub fn build_query(id: &ContentId) -> Vec<(&'static str, String)> {
    match id.kind() {
        IdKind::Episode => vec![
            ("ep_id", id.to_string()),
            ("device", "wap".to_string()),
            ("platform", "web".to_string()),
            ("qn", EPISODE_QN.to_string()),
            ("tf", "0".to_string()),
            ("type", "0".to_string()),
        ],
        IdKind::Asset => vec![
            ("s_locale", LOCALE.to_string()),
            ("platform", "web".to_string()),
            ("aid", id.to_string()),
            ("qn", ASSET_QN.to_string()),
        ],
    }
}

/// `data.playurl` must be a non-empty object.
pub fn parse_playurl(body: &Value) -> Result<Playurl> {
    let playurl = body
        .get("data")
        .and_then(|data| data.get("playurl"))
        .filter(|playurl| playurl.as_object().is_some_and(|obj| !obj.is_empty()))
        .ok_or(BilitvError::MissingPlayurl)?;

    Ok(Playurl::deserialize(playurl)?)
}

/// First entry, in response order, whose quality is accepted and whose URL is set.
///
/// Response order is trusted: a later entry with a better quality code does not
/// displace an earlier accepted one.
pub fn select_video<'a>(playurl: &'a Playurl, qualities: &QualityTier) -> Option<(u32, &'a str)> {
    playurl
        .video
        .iter()
        .find_map(|entry| {
            let quality = entry.stream_info.quality.filter(|q| qualities.accepts(*q))?;
            let url = entry.video_resource.url.as_str();
            (!url.is_empty()).then_some((quality, url))
        })
}

/// The first audio resource, whatever its quality.
pub fn select_audio(playurl: &Playurl) -> Option<&str> {
    playurl
        .audio_resource
        .first()
        .map(|audio| audio.url.as_str())
        .filter(|url| !url.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn playurl(value: Value) -> Playurl {
        parse_playurl(&json!({ "data": { "playurl": value } })).unwrap()
    }

    fn video(quality: u32, url: &str) -> Value {
        json!({ "stream_info": { "quality": quality }, "video_resource": { "url": url } })
    }

    #[test]
    fn test_episode_query() {
        let query = build_query(&ContentId::new("67890"));
        assert_eq!(query[0], ("ep_id", "67890".to_string()));
        assert!(query.contains(&("qn", "64".to_string())));
        assert!(query.contains(&("device", "wap".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "aid" || *k == "s_locale"));
    }

    #[test]
    fn test_asset_query() {
        let query = build_query(&ContentId::new("4780916840315904"));
        assert!(query.contains(&("aid", "4780916840315904".to_string())));
        assert!(query.contains(&("qn", "120".to_string())));
        assert!(query.contains(&("s_locale", "en_US".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "ep_id"));
    }

    #[test]
    fn test_nine_digit_id_is_asset_query() {
        let query = build_query(&ContentId::new("123456789"));
        assert!(query.contains(&("aid", "123456789".to_string())));
    }

    #[test]
    fn test_select_video_keeps_response_order() {
        let playurl = playurl(json!({ "video": [video(32, "a"), video(112, "b")] }));
        assert_eq!(
            select_video(&playurl, &QualityTier::default()),
            Some((32, "a"))
        );
    }

    #[test]
    fn test_select_video_skips_unaccepted_and_empty() {
        let playurl = playurl(json!({
            "video": [video(120, "4k"), video(80, ""), video(16, "low"), video(64, "ok")]
        }));
        assert_eq!(
            select_video(&playurl, &QualityTier::default()),
            Some((64, "ok"))
        );
    }

    #[test]
    fn test_select_video_none_acceptable() {
        let playurl = playurl(json!({ "video": [video(16, "low"), video(120, "4k")] }));
        assert_eq!(select_video(&playurl, &QualityTier::default()), None);
    }

    #[test]
    fn test_select_video_custom_tier() {
        let playurl = playurl(json!({ "video": [video(80, "hd"), video(120, "4k")] }));
        assert_eq!(
            select_video(&playurl, &QualityTier::new([120])),
            Some((120, "4k"))
        );
    }

    #[test]
    fn test_select_video_skips_malformed_quality() {
        let playurl = playurl(json!({
            "video": [
                { "stream_info": { "quality": -1 }, "video_resource": { "url": "x" } },
                { "stream_info": { "quality": "high" }, "video_resource": { "url": "y" } },
                video(80, "ok")
            ]
        }));
        assert_eq!(
            select_video(&playurl, &QualityTier::default()),
            Some((80, "ok"))
        );
    }

    #[test]
    fn test_select_audio_takes_first() {
        let playurl = playurl(json!({
            "audio_resource": [{ "url": "first", "quality": 30216 }, { "url": "second" }]
        }));
        assert_eq!(select_audio(&playurl), Some("first"));
    }

    #[test]
    fn test_select_audio_empty() {
        let playurl = playurl(json!({ "video": [video(80, "hd")], "audio_resource": [] }));
        assert_eq!(select_audio(&playurl), None);
    }

    #[test]
    fn test_missing_playurl() {
        for body in [
            json!({}),
            json!({ "data": null }),
            json!({ "data": {} }),
            json!({ "data": { "playurl": null } }),
            json!({ "data": { "playurl": {} } }),
        ] {
            assert!(matches!(
                parse_playurl(&body),
                Err(BilitvError::MissingPlayurl)
            ));
        }
    }
}
