use url::{Position, Url, form_urlencoded};

use crate::AuthError;

/// Rebuilds `base` with `query` merged over its existing query parameters.
///
/// Keys already present keep their position and take the override's value;
/// new keys are appended in the order given. Segments no override touches,
/// bare keys such as `flag` included, are copied byte-for-byte. When
/// `strip_fragment` is set the existing fragment is dropped before `fragment`
/// is merged into it the same way. Spaces in override values are written
/// literally rather than as `+`.
pub fn create_uri(
    base: &str,
    query: &[(&str, &str)],
    fragment: &[(&str, &str)],
    strip_fragment: bool,
) -> Result<String, AuthError> {
    let url = Url::parse(base)?;
    let mut uri = url[..Position::AfterPath].to_string();

    if let Some(query) = merge_component(url.query(), query) {
        uri.push('?');
        uri.push_str(&query);
    }

    let existing_fragment = if strip_fragment { None } else { url.fragment() };
    if let Some(fragment) = merge_component(existing_fragment, fragment) {
        uri.push('#');
        uri.push_str(&fragment);
    }

    Ok(uri)
}

fn merge_component(existing: Option<&str>, overrides: &[(&str, &str)]) -> Option<String> {
    if overrides.is_empty() {
        return existing.map(str::to_string);
    }

    let mut segments: Vec<Segment> = existing
        .unwrap_or_default()
        .split('&')
        .filter(|raw| !raw.is_empty())
        .map(|raw| Segment {
            key: form_urlencoded::parse(raw.as_bytes())
                .next()
                .map(|(key, _)| key.into_owned())
                .unwrap_or_default(),
            raw: raw.to_string(),
        })
        .collect();
    for (key, value) in overrides {
        set_param(&mut segments, key, value);
    }

    let merged: Vec<&str> = segments.iter().map(|segment| segment.raw.as_str()).collect();
    Some(merged.join("&"))
}

/// One `key[=value]` pair, kept in its encoded form.
struct Segment {
    key: String,
    raw: String,
}

fn set_param(segments: &mut Vec<Segment>, key: &str, value: &str) {
    let raw = form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish()
        .replace('+', " ");

    let Some(first) = segments.iter().position(|segment| segment.key == key) else {
        segments.push(Segment {
            key: key.to_string(),
            raw,
        });
        return;
    };
    segments[first].raw = raw;

    // Repeated keys collapse into the first position.
    let mut index = 0;
    segments.retain(|segment| {
        let keep = index <= first || segment.key != key;
        index += 1;
        keep
    });
}

#[cfg(test)]
mod tests {
    use super::create_uri;
    use crate::AuthError;

    #[test]
    fn override_wins_and_new_keys_are_appended() {
        let uri = create_uri("https://h/p?a=1", &[("a", "2"), ("b", "3")], &[], true).unwrap();
        assert_eq!(uri, "https://h/p?a=2&b=3");
    }

    #[test]
    fn untouched_keys_keep_their_position() {
        let uri = create_uri("https://h/p?a=1&c=4", &[("a", "2"), ("b", "3")], &[], true).unwrap();
        assert_eq!(uri, "https://h/p?a=2&c=4&b=3");
    }

    #[test]
    fn no_overrides_leaves_query_untouched() {
        let uri = create_uri("https://h/p?z=1&a=b+c", &[], &[], true).unwrap();
        assert_eq!(uri, "https://h/p?z=1&a=b+c");
    }

    #[test]
    fn bare_and_untouched_segments_are_copied_verbatim() {
        let uri = create_uri("https://h/p?a=1&flag", &[("b", "2")], &[], true).unwrap();
        assert_eq!(uri, "https://h/p?a=1&flag&b=2");

        let uri = create_uri("https://h/p?a=x+y&c=%7E", &[("b", "2")], &[], true).unwrap();
        assert_eq!(uri, "https://h/p?a=x+y&c=%7E&b=2");
    }

    #[test]
    fn repeated_key_keeps_first_position() {
        let uri = create_uri("https://h/p?a=1&c=2&a=3", &[("a", "4")], &[], true).unwrap();
        assert_eq!(uri, "https://h/p?a=4&c=2");
    }

    #[test]
    fn spaces_render_literally() {
        let uri = create_uri("https://h/authorize", &[("scope", "uuid email")], &[], true).unwrap();
        assert_eq!(uri, "https://h/authorize?scope=uuid email");
    }

    #[test]
    fn reserved_characters_are_encoded() {
        let uri = create_uri(
            "https://h/p",
            &[("redirect_uri", "https://app.example/cb?x=1"), ("v", "a+b")],
            &[],
            true,
        )
        .unwrap();
        assert_eq!(
            uri,
            "https://h/p?redirect_uri=https%3A%2F%2Fapp.example%2Fcb%3Fx%3D1&v=a%2Bb"
        );
    }

    #[test]
    fn strip_fragment_drops_existing_fragment() {
        let uri = create_uri("https://h/p?a=1#x=1", &[], &[], true).unwrap();
        assert_eq!(uri, "https://h/p?a=1");
    }

    #[test]
    fn kept_fragment_is_merged() {
        let kept = create_uri("https://h/p#x=1", &[], &[], false).unwrap();
        assert_eq!(kept, "https://h/p#x=1");

        let merged = create_uri("https://h/p#x=1", &[], &[("x", "2"), ("y", "3")], false).unwrap();
        assert_eq!(merged, "https://h/p#x=2&y=3");
    }

    #[test]
    fn stripped_fragment_is_replaced() {
        let uri = create_uri("https://h/p#x=1", &[], &[("y", "2")], true).unwrap();
        assert_eq!(uri, "https://h/p#y=2");
    }

    #[test]
    fn rejects_relative_base() {
        let result = create_uri("/oauth2/authorize", &[("a", "1")], &[], true);
        assert!(matches!(result, Err(AuthError::Url(_))));
    }
}
