use crate::config::IMPORTANT_SELECTORS;
use lazy_static::lazy_static;
use scraper::{Html, Selector};

lazy_static! {
    static ref IMPORTANT: Vec<Selector> = IMPORTANT_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("valid selector"))
        .collect();
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Visible text with whitespace collapsed to single spaces.
    pub text: String,
    /// Raw text of heading and bold elements, used only for importance weighting.
    pub important: Vec<String>,
}

/// Pull plain text and important fragments out of raw markup.
/// Text nodes are concatenated as-is, so inline markup inside a word does not
/// split it. Text nested anywhere inside `script` or `style` is dropped.
pub fn extract(html: &str) -> Extracted {
    let doc = Html::parse_document(html);

    let mut important = Vec::new();
    for sel in IMPORTANT.iter() {
        for el in doc.select(sel) {
            important.push(el.text().collect::<String>());
        }
    }

    let mut pieces: Vec<&str> = Vec::new();
    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else { continue };
        let hidden = node.ancestors().any(|a| {
            a.value().as_element().map_or(false, |e| matches!(e.name(), "script" | "style"))
        });
        if !hidden {
            pieces.push(&**text);
        }
    }
    let text = pieces.concat().split_whitespace().collect::<Vec<_>>().join(" ");

    Extracted { text, important }
}
