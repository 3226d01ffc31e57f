//! Root-relative JSON pointers as used in `$ref` (`#/definitions/fields/Foo`).

use serde_json::Value;

/// Split a `#/a/b` reference into unescaped tokens.
///
/// Returns `None` for anything that is not a local fragment reference, such as
/// `other.json#/a` or `https://example.com/schema`.
pub fn parse(reference: &str) -> Option<Vec<String>> {
    let fragment = reference.strip_prefix('#')?;
    if fragment.is_empty() {
        return Some(Vec::new());
    }
    let rest = fragment.strip_prefix('/')?;
    rest.split('/').map(unescape_token).collect()
}

fn unescape_token(token: &str) -> Option<String> {
    let decoded = urlencoding::decode(token).ok()?;
    Some(decoded.replace("~1", "/").replace("~0", "~"))
}

/// Escape a single token for use inside a pointer.
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Build a `#/...` pointer from tokens.
pub fn join<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut pointer = String::from("#");
    for token in tokens {
        pointer.push('/');
        pointer.push_str(&escape_token(token.as_ref()));
    }
    pointer
}

/// Walk `root` along `tokens`.
pub fn lookup<'a>(root: &'a Value, tokens: &[String]) -> Option<&'a Value> {
    tokens.iter().try_fold(root, |node, token| match node {
        Value::Object(map) => map.get(token),
        Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_local_pointers() {
        assert_eq!(parse("#"), Some(vec![]));
        assert_eq!(
            parse("#/definitions/fields/Name"),
            Some(vec!["definitions".into(), "fields".into(), "Name".into()])
        );
        assert_eq!(parse("#/a~1b/c~0d"), Some(vec!["a/b".into(), "c~d".into()]));
        assert_eq!(parse("#/with%20space"), Some(vec!["with space".into()]));
    }

    #[test]
    fn test_parse_rejects_external_references() {
        assert_eq!(parse("other.json#/definitions/A"), None);
        assert_eq!(parse("https://example.com/schema.json"), None);
        assert_eq!(parse("#definitions"), None);
    }

    #[test]
    fn test_join_escapes_tokens() {
        assert_eq!(join(["properties", "a/b"]), "#/properties/a~1b");
        assert_eq!(join(Vec::<String>::new()), "#");
    }

    #[test]
    fn test_lookup_objects_and_arrays() {
        let doc = json!({ "a": { "list": [ { "x": 1 }, { "x": 2 } ] } });
        let tokens = parse("#/a/list/1/x").unwrap();
        assert_eq!(lookup(&doc, &tokens), Some(&json!(2)));
        assert_eq!(lookup(&doc, &parse("#/a/list/9").unwrap()), None);
        assert_eq!(lookup(&doc, &parse("#/a/missing").unwrap()), None);
        assert_eq!(lookup(&doc, &parse("#").unwrap()), Some(&doc));
    }
}
