pub fn compute_bump(current: &str, bump: &str) -> Result<String, String> {
    // Bump on the x.y.z base; pre-release and build suffixes are dropped.
    let base = current
        .split(['-', '+', '~'])
        .next()
        .unwrap_or(current)
        .trim();
    let mut parts = Vec::with_capacity(3);
    for s in base.split('.') {
        let n = s
            .parse::<u64>()
            .map_err(|_| format!("Version '{}' is not in x.y.z form", current))?;
        parts.push(n);
    }
    if parts.is_empty() || parts.len() > 3 {
        return Err(format!("Version '{}' is not in x.y.z form", current));
    }
    while parts.len() < 3 {
        parts.push(0);
    }

    match bump.to_ascii_lowercase().as_str() {
        "major" => {
            parts[0] = parts[0].saturating_add(1);
            parts[1] = 0;
            parts[2] = 0;
        }
        "minor" => {
            parts[1] = parts[1].saturating_add(1);
            parts[2] = 0;
        }
        "patch" => {
            parts[2] = parts[2].saturating_add(1);
        }
        other => {
            return Err(format!(
                "Unknown bump type: {} (expected: major|minor|patch)",
                other
            ));
        }
    }
    Ok(format!("{}.{}.{}", parts[0], parts[1], parts[2]))
}

#[cfg(test)]
mod tests {
    use super::compute_bump;

    #[test]
    fn bumps_each_component() {
        assert_eq!(compute_bump("1.4.2", "patch").unwrap(), "1.4.3");
        assert_eq!(compute_bump("1.4.2", "minor").unwrap(), "1.5.0");
        assert_eq!(compute_bump("1.4.2", "MAJOR").unwrap(), "2.0.0");
    }

    #[test]
    fn drops_prerelease_and_pads() {
        assert_eq!(compute_bump("2.0.0~beta1", "patch").unwrap(), "2.0.1");
        assert_eq!(compute_bump("3", "minor").unwrap(), "3.1.0");
    }

    #[test]
    fn rejects_garbage() {
        assert!(compute_bump("one.two", "patch").is_err());
        assert!(compute_bump("1.0.0", "huge").is_err());
    }
}
