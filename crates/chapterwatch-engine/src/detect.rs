use regex::Regex;

/// Finds the path fragment of one specific chapter in a page body.
///
/// Looks for `/chapters/<digits>/<series-slug>-chapter-<N>`, where `N` must
/// not continue with further digits (`-chapter-1099` does not match inside
/// `-chapter-10990`).
#[derive(Debug, Clone)]
pub struct ChapterDetector {
    chapter_number: i64,
    pattern: Regex,
}

impl ChapterDetector {
    pub fn new(series_slug: &str, chapter_number: i64) -> Result<Self, regex::Error> {
        let pattern = format!(
            r"/chapters/\d+/{}-chapter-{}\b",
            regex::escape(series_slug),
            chapter_number
        );
        Ok(Self {
            chapter_number,
            pattern: Regex::new(&pattern)?,
        })
    }

    pub fn chapter_number(&self) -> i64 {
        self.chapter_number
    }

    /// First matching fragment in `body`, if any.
    pub fn find<'a>(&self, body: &'a str) -> Option<&'a str> {
        self.pattern.find(body).map(|m| m.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(n: i64) -> ChapterDetector {
        ChapterDetector::new("one-piece", n).unwrap()
    }

    #[test]
    fn finds_fragment_inside_html() {
        let body = r#"<a href="/chapters/2/one-piece-chapter-1099">Chapter 1099</a>"#;
        assert_eq!(
            detector(1099).find(body),
            Some("/chapters/2/one-piece-chapter-1099")
        );
    }

    #[test]
    fn ignores_other_chapters() {
        let body = r#"<a href="/chapters/1/one-piece-chapter-1098">"#;
        assert_eq!(detector(1099).find(body), None);
    }

    #[test]
    fn longer_number_is_not_a_match() {
        let body = r#"<a href="/chapters/9/one-piece-chapter-10990">"#;
        assert_eq!(detector(1099).find(body), None);
    }

    #[test]
    fn fragment_at_end_of_body_matches() {
        assert!(detector(7).find("/chapters/3/one-piece-chapter-7").is_some());
    }

    #[test]
    fn chapter_id_segment_must_be_numeric() {
        let body = "/chapters/abc/one-piece-chapter-1099";
        assert_eq!(detector(1099).find(body), None);
    }

    #[test]
    fn slug_is_matched_literally() {
        let d = ChapterDetector::new("a.b", 3).unwrap();
        assert!(d.find("/chapters/1/a.b-chapter-3").is_some());
        assert!(d.find("/chapters/1/axb-chapter-3").is_none());
    }

    #[test]
    fn other_series_is_ignored() {
        let body = "/chapters/5/naruto-chapter-1099";
        assert_eq!(detector(1099).find(body), None);
        assert_eq!(detector(1099).chapter_number(), 1099);
    }
}
