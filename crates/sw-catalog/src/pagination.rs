/// Extract the `rel="next"` target from an RFC 8288 `Link` header.
///
/// Returns `None` when the header is absent, malformed, or carries no next
/// relation; callers treat all three as "no more pages".
///
/// ```text
/// <https://shop/admin/api/2024-01/products.json?limit=250&page_info=abc>; rel="next"
/// ```
pub fn parse_next_link(header: Option<&str>) -> Option<String> {
    let mut rest = header?;

    // Commas inside `<...>` belong to the URL; link-values are separated only
    // by the first comma after the closing `>`.
    loop {
        let open = rest.find('<')?;
        let after_open = &rest[open + 1..];
        let close = after_open.find('>')?;
        let target = after_open[..close].trim();
        let tail = &after_open[close + 1..];
        let (params, next) = match tail.find(',') {
            Some(i) => (&tail[..i], &tail[i + 1..]),
            None => (tail, ""),
        };

        let is_next = params.split(';').any(|p| {
            let p = p.trim();
            let Some(value) = p.strip_prefix("rel=") else {
                return false;
            };
            value
                .trim_matches('"')
                .split_whitespace()
                .any(|r| r.eq_ignore_ascii_case("next"))
        });

        if is_next && !target.is_empty() {
            return Some(target.to_string());
        }
        rest = next;
    }
}
