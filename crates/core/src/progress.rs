use std::time::Duration;

/// Default essay word limit.
pub const DEFAULT_WORD_LIMIT: usize = 5000;

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Percentage of the word limit used, capped at 100.
pub fn progress_percent(words: usize, limit: usize) -> u16 {
    if limit == 0 {
        return 0;
    }
    let pct = words.saturating_mul(100) / limit;
    pct.min(100) as u16
}

pub fn format_word_count(words: usize, limit: usize) -> String {
    format!("{words} / {limit} words")
}

/// Render time spent writing as `"1h 5m"` or `"5m"`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let minutes = elapsed.as_secs() / 60;
    let hours = minutes / 60;
    if hours > 0 {
        format!("{hours}h {}m", minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t"), 0);
        assert_eq!(word_count(" one  two\nthree "), 3);
    }

    #[test]
    fn progress_is_capped() {
        assert_eq!(progress_percent(250, 500), 50);
        assert_eq!(progress_percent(900, 500), 100);
        assert_eq!(progress_percent(3, 0), 0);
    }

    #[test]
    fn formats_word_count() {
        assert_eq!(format_word_count(12, 650), "12 / 650 words");
    }

    #[test]
    fn formats_elapsed_time() {
        assert_eq!(format_elapsed(Duration::from_secs(59)), "0m");
        assert_eq!(format_elapsed(Duration::from_secs(5 * 60 + 10)), "5m");
        assert_eq!(format_elapsed(Duration::from_secs(3600 + 7 * 60)), "1h 7m");
    }
}
