//! Join per-page text into one document-level string.
//!
//! Markers exist so downstream consumers (and the form-filling model) can
//! tell which page a datum came from, but a single-page document must read
//! exactly as its OCR output — no decoration.

use serde::{Deserialize, Serialize};

/// OCR result for one page. `page` is the 0-based page index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    pub page: usize,
    pub text: String,
}

/// Concatenate page texts into the aggregated document string.
///
/// One page: the page's text verbatim. N > 1 pages: for each page k the
/// literal marker `=== Page k ===` (1-based), a newline, the page's text,
/// then a blank-line separator — except after the final page.
pub fn aggregate(pages: &[PageText]) -> String {
    if pages.len() == 1 {
        return pages[0].text.clone();
    }

    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        out.push_str(&format!("=== Page {} ===\n", page.page + 1));
        out.push_str(&page.text);
        if i + 1 < pages.len() {
            out.push_str("\n\n");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(index: usize, text: &str) -> PageText {
        PageText {
            page: index,
            text: text.to_string(),
        }
    }

    #[test]
    fn single_page_is_verbatim_with_no_markers() {
        let text = "MRZ: P<UTOERIKSSON<<ANNA<MARIA";
        let out = aggregate(&[page(0, text)]);
        assert_eq!(out, text);
        assert!(!out.contains("=== Page"));
    }

    #[test]
    fn two_pages_match_the_exact_marker_layout() {
        let out = aggregate(&[page(0, "PAGE1"), page(1, "PAGE2")]);
        assert_eq!(out, "=== Page 1 ===\nPAGE1\n\n=== Page 2 ===\nPAGE2");
    }

    #[test]
    fn n_pages_have_n_markers_in_ascending_order_and_no_trailing_separator() {
        let pages: Vec<PageText> = (0..4).map(|i| page(i, &format!("body{}", i + 1))).collect();
        let out = aggregate(&pages);

        for k in 1..=4 {
            assert!(out.contains(&format!("=== Page {} ===\n", k)));
        }
        // markers appear in ascending order
        let positions: Vec<usize> = (1..=4)
            .map(|k| out.find(&format!("=== Page {} ===", k)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        // exactly one blank line between pages, none after the last
        assert_eq!(out.matches("\n\n").count(), 3);
        assert!(out.ends_with("body4"));
    }

    #[test]
    fn markers_preserve_empty_page_text() {
        let out = aggregate(&[page(0, ""), page(1, "x")]);
        assert_eq!(out, "=== Page 1 ===\n\n\n=== Page 2 ===\nx");
    }
}
