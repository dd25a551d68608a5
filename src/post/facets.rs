use crate::types::{Facet, FacetedText};

const SEPARATOR: &str = "\n\n";

/// Appends the hashtags to the caption and computes one facet per hashtag.
///
/// Offsets are UTF-8 byte offsets into the returned text, which is what
/// Bluesky anchors rich-text facets to. A multi-byte character anywhere in
/// the caption shifts every facet after it.
pub fn build_facets(caption: &str, hashtags: &[String]) -> FacetedText {
    if hashtags.is_empty() {
        return FacetedText {
            text: caption.to_string(),
            facets: Vec::new(),
        };
    }

    let mut text = String::with_capacity(caption.len() + SEPARATOR.len() + 16 * hashtags.len());
    text.push_str(caption);
    text.push_str(SEPARATOR);

    let mut facets = Vec::with_capacity(hashtags.len());
    for (i, hashtag) in hashtags.iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        let byte_start = text.len();
        text.push_str(hashtag);

        facets.push(Facet {
            byte_start,
            byte_end: text.len(),
            tag: hashtag.strip_prefix('#').unwrap_or(hashtag).to_string(),
        });
    }

    FacetedText { text, facets }
}
