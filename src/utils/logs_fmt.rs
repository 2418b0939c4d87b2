use once_cell::sync::Lazy;
use std::fmt;
use std::time::Instant;
use tracing_subscriber::fmt::time::FormatTime;

static START: Lazy<Instant> = Lazy::new(Instant::now);

pub struct UptimeSeconds;

impl FormatTime for UptimeSeconds {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let elapsed = START.elapsed();
        write!(w, "{:.3}s", elapsed.as_secs_f64())
    }
}

/// Shortens long identifiers (job ids, store keys) for log lines.
pub fn abbrev(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > 14 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::abbrev;

    #[test]
    fn short_ids_are_untouched() {
        assert_eq!(abbrev("job-42"), "job-42");
    }

    #[test]
    fn long_ids_keep_head_and_tail() {
        assert_eq!(abbrev("0123456789abcdefXYZW"), "01234567...XYZW");
    }
}
