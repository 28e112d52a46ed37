use monitor_core::JobHandle;

/// Windows-safe name for a downloaded result. Prefers the name the service
/// suggested and falls back to `{platform}_{job_id}.csv`.
pub fn result_filename(suggested: Option<&str>, platform: &str, handle: &JobHandle) -> String {
    if let Some(name) = suggested.map(sanitize).filter(|name| !name.is_empty()) {
        return name;
    }
    let platform = match sanitize(platform) {
        name if name.is_empty() => "job".to_string(),
        name => name,
    };
    let job_id = match sanitize(handle.job_id()) {
        id if id.is_empty() => "unknown".to_string(),
        id => id,
    };
    format!("{platform}_{job_id}.csv")
}

fn sanitize(input: &str) -> String {
    // Only the final path component of a suggested name is kept.
    let base = input.rsplit(&['/', '\\'][..]).next().unwrap_or(input);
    let cleaned: String = base
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);

    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    if compacted.len() > 120 {
        let mut cut = 120;
        while !compacted.is_char_boundary(cut) {
            cut -= 1;
        }
        compacted.truncate(cut);
    }
    if is_reserved_windows_name(&compacted) {
        compacted.push('_');
    }
    compacted
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    let stem = name.split('.').next().unwrap_or(name);
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(stem))
}
