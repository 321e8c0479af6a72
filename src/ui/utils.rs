use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Loading indicator frame for the given tick count
pub(crate) fn spinner(ticks: u64) -> &'static str {
    SPINNER[(ticks / 2 % SPINNER.len() as u64) as usize]
}

/// Simple word-wrap helper.
/// Uses `chars().count()` for the width check so multi-byte UTF-8 strings
/// are measured in characters, not bytes.
pub(crate) fn word_wrap(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }
    let mut result = Vec::new();
    for line in text.lines() {
        if line.chars().count() <= max_width {
            result.push(line.to_string());
            continue;
        }
        let mut current = String::new();
        for word in line.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.chars().count() + 1 + word.chars().count() <= max_width {
                current.push(' ');
                current.push_str(word);
            } else {
                result.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            result.push(current);
        }
    }
    if result.is_empty() {
        result.push(String::new());
    }
    result
}

/// Calculate a centered rectangle within an area
pub(crate) fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(r.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}

/// "3d ago" style age of an RFC 3339 timestamp; `None` if it does not parse
pub(crate) fn relative_time(timestamp: &str, now: DateTime<Utc>) -> Option<String> {
    let then = DateTime::parse_from_rfc3339(timestamp).ok()?;
    let secs = (now - then.with_timezone(&Utc)).num_seconds().max(0);
    Some(match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3600),
        s if s < 86_400 * 30 => format!("{}d ago", s / 86_400),
        s if s < 86_400 * 365 => format!("{}mo ago", s / (86_400 * 30)),
        s => format!("{}y ago", s / (86_400 * 365)),
    })
}

/// Replace tabs with `width` spaces
pub(crate) fn expand_tabs(line: &str, width: u8) -> String {
    if line.contains('\t') {
        line.replace('\t', &" ".repeat(usize::from(width.max(1))))
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_long_lines_on_words() {
        let wrapped = word_wrap("the quick brown fox jumps", 10);
        assert_eq!(wrapped, ["the quick", "brown fox", "jumps"]);
        assert_eq!(word_wrap("", 10), [""]);
    }

    #[test]
    fn relative_time_buckets() {
        let now = DateTime::parse_from_rfc3339("2024-06-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(relative_time("2024-06-10T11:59:30Z", now).as_deref(), Some("just now"));
        assert_eq!(relative_time("2024-06-10T09:00:00Z", now).as_deref(), Some("3h ago"));
        assert_eq!(relative_time("2024-06-07T12:00:00Z", now).as_deref(), Some("3d ago"));
        assert_eq!(relative_time("2022-06-01T12:00:00Z", now).as_deref(), Some("2y ago"));
        assert_eq!(relative_time("yesterday", now), None);
    }

    #[test]
    fn centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let r = centered_rect(50, 10, outer);
        assert_eq!((r.x, r.y, r.width, r.height), (25, 15, 50, 10));
    }

    #[test]
    fn tabs_expand_to_width() {
        assert_eq!(expand_tabs("\tx", 4), "    x");
        assert_eq!(expand_tabs("\tx", 0), " x");
    }
}
