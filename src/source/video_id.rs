use reqwest::Url;

/// Extract a YouTube video identifier from a watch or short-link URL.
///
/// `youtu.be/<id>` yields the path, `youtube.com/watch?v=<id>` the `v`
/// parameter. Anything else, including unparsable input, yields `None`.
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;

    let id = if host.contains("youtu.be") {
        parsed.path().trim_start_matches('/').to_string()
    } else if host.contains("youtube.com") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())?
    } else {
        return None;
    };

    if id.is_empty() { None } else { Some(id) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://youtube.com/watch?list=PL1&v=abc123&t=42s"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn short_link() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=10"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn mobile_host() {
        assert_eq!(
            extract_video_id("https://m.youtube.com/watch?v=xyz"),
            Some("xyz".to_string())
        );
    }

    #[test]
    fn missing_v_param() {
        assert_eq!(extract_video_id("https://www.youtube.com/feed/trending"), None);
    }

    #[test]
    fn empty_short_link() {
        assert_eq!(extract_video_id("https://youtu.be/"), None);
    }

    #[test]
    fn other_hosts_and_garbage() {
        assert_eq!(extract_video_id("https://vimeo.com/12345"), None);
        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id(""), None);
    }
}
