use crate::types::addon::AddonManifest;
use regex::Regex;
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex is valid"));

static ADDON_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<addon((?:\s+[\w.:-]+\s*=\s*(?:"[^"]*"|'[^']*'))*)\s*/?>"#)
        .expect("addon tag regex is valid")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w.:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("attribute regex is valid")
});

struct Attribute {
    name: String,
    value: String,
    /// Byte range of the value (without quotes) in the original text.
    span: Range<usize>,
}

/// Reads `id` and `version` from the `<addon>` element of a Kodi manifest.
///
/// ### Parameters
/// - `path`: Path to `addon.xml`
///
pub fn read_manifest(path: &Path) -> Result<AddonManifest, String> {
    if !path.is_file() {
        return Err(format!("Manifest not found: {}", path.display()));
    }
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_manifest(&text).map_err(|e| format!("{} ({})", e, path.display()))
}

pub fn parse_manifest(text: &str) -> Result<AddonManifest, String> {
    let attrs = addon_attributes(text)?;
    let id = required_attr(&attrs, "id")?;
    let version = required_attr(&attrs, "version")?;
    validate_id(&id.value)?;
    validate_version(&version.value)?;
    Ok(AddonManifest {
        id: id.value.clone(),
        version: version.value.clone(),
    })
}

/// Returns `text` with only the addon element's `version` attribute replaced.
pub fn write_version(text: &str, new_version: &str) -> Result<String, String> {
    if new_version.is_empty() || new_version.contains(['"', '\'', '<', '>', '&']) {
        return Err(format!("Refusing to write version '{}'", new_version));
    }
    let attrs = addon_attributes(text)?;
    let version = required_attr(&attrs, "version")?;

    let mut out = String::with_capacity(text.len() + new_version.len());
    out.push_str(&text[..version.span.start]);
    out.push_str(new_version);
    out.push_str(&text[version.span.end..]);
    Ok(out)
}

fn addon_attributes(text: &str) -> Result<Vec<Attribute>, String> {
    // Blank out comments byte-for-byte so offsets still point into `text`.
    let masked = COMMENT_RE.replace_all(text, |caps: &regex::Captures| {
        " ".repeat(caps[0].len())
    });

    let caps = ADDON_TAG_RE
        .captures(&masked)
        .ok_or_else(|| "No <addon> element found in manifest".to_string())?;
    let Some(group) = caps.get(1) else {
        return Ok(Vec::new());
    };
    let base = group.start();

    let mut attrs = Vec::new();
    for a in ATTR_RE.captures_iter(group.as_str()) {
        let value = match (a.get(2), a.get(3)) {
            (Some(v), _) | (None, Some(v)) => v,
            (None, None) => continue,
        };
        attrs.push(Attribute {
            name: a[1].to_string(),
            value: value.as_str().to_string(),
            span: (base + value.start())..(base + value.end()),
        });
    }
    Ok(attrs)
}

/// The id names the archive root and the repo-plugins subdirectory, so it must
/// be a single plain path component made of `[A-Za-z0-9._-]`.
fn validate_id(id: &str) -> Result<(), String> {
    let plain = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !plain || id == "." || id == ".." {
        return Err(format!(
            "Addon id '{}' is not valid (expected letters, digits, '.', '_' or '-')",
            id
        ));
    }
    Ok(())
}

/// The version ends up in the archive file name.
fn validate_version(version: &str) -> Result<(), String> {
    if version.contains(['/', '\\']) || version.chars().any(|c| c.is_control()) {
        return Err(format!("Addon version '{}' is not valid", version));
    }
    Ok(())
}

fn required_attr<'a>(attrs: &'a [Attribute], name: &str) -> Result<&'a Attribute, String> {
    match attrs.iter().find(|a| a.name == name) {
        Some(a) if !a.value.trim().is_empty() => Ok(a),
        Some(_) => Err(format!("Attribute '{}' of <addon> is empty", name)),
        None => Err(format!("Attribute '{}' missing from <addon>", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<!-- <addon id="commented.out" version="9.9.9"> -->
<addon id="plugin.video.invidious"
       name="Invidious"
       version="2.0.4"
       provider-name="TheAssassin, jdnl">
    <requires>
        <import addon="xbmc.python" version="3.0.0"/>
        <import addon="script.module.requests" version="2.22.0"/>
    </requires>
    <extension point="xbmc.python.pluginsource" library="main.py">
        <provides>video</provides>
    </extension>
</addon>
"#;

    #[test]
    fn reads_addon_attributes_not_declaration() {
        let m = parse_manifest(MANIFEST).unwrap();
        assert_eq!(m.id, "plugin.video.invidious");
        assert_eq!(m.version, "2.0.4");
    }

    #[test]
    fn accepts_single_quotes_and_any_order() {
        let m = parse_manifest("<addon version='1.2.3' id='plugin.test'></addon>").unwrap();
        assert_eq!(m.id, "plugin.test");
        assert_eq!(m.version, "1.2.3");
    }

    #[test]
    fn missing_or_empty_fields_are_errors() {
        assert!(parse_manifest("<addon id=\"x\"></addon>").is_err());
        assert!(parse_manifest("<addon id=\"\" version=\"1.0.0\"/>").is_err());
        assert!(parse_manifest("<addons><foo/></addons>").is_err());
    }

    #[test]
    fn ids_that_are_not_a_plain_component_are_rejected() {
        for id in [".", "..", "a/b", "../x", "a\\b", "plugin video"] {
            let text = format!("<addon id=\"{}\" version=\"1.0.0\"/>", id);
            let err = parse_manifest(&text).unwrap_err();
            assert!(err.contains("is not valid"), "{} -> {}", id, err);
        }
        let ok = parse_manifest("<addon id=\"plugin.video.a_b-c\" version=\"1.0.0\"/>").unwrap();
        assert_eq!(ok.id, "plugin.video.a_b-c");
    }

    #[test]
    fn versions_with_separators_are_rejected() {
        assert!(parse_manifest("<addon id=\"plugin.x\" version=\"1.0/../../x\"/>").is_err());
        assert!(parse_manifest("<addon id=\"plugin.x\" version=\"2.0.0~beta1\"/>").is_ok());
    }

    #[test]
    fn write_version_changes_only_the_addon_version() {
        let out = write_version(MANIFEST, "2.0.5").unwrap();
        assert_eq!(parse_manifest(&out).unwrap().version, "2.0.5");
        assert!(out.starts_with(r#"<?xml version="1.0""#));
        assert!(out.contains(r#"<import addon="xbmc.python" version="3.0.0"/>"#));
        assert!(out.contains(r#"version="9.9.9""#));
        assert_eq!(out.len(), MANIFEST.len());
    }

    #[test]
    fn write_version_rejects_markup() {
        assert!(write_version(MANIFEST, "1\"><x").is_err());
    }

    #[test]
    fn read_manifest_reports_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = read_manifest(&tmp.path().join("addon.xml")).unwrap_err();
        assert!(err.contains("Manifest not found"));
    }
}
