/// Markdown to plain text for LLM output.
///
/// The model answers in markdown (lists, headings, emphasis, the odd table or
/// raw HTML). Callers want one readable line per block, so the text is
/// rendered to HTML with pulldown-cmark, parsed back into a tree with
/// scraper, and the text nodes are collected with a newline around every
/// block element. Entities are decoded and comments dropped by the HTML
/// parser. The result is normalized: each line trimmed, blank lines removed.
use pulldown_cmark::{html, Options, Parser};
use scraper::{ElementRef, Html};
use tracing::warn;

const LINE_BREAK: char = '\n';

/// Elements that start and end a line of output.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "li", "h1", "h2", "h3", "h4", "h5", "h6", "div", "tr", "ul", "ol", "pre",
    "blockquote", "hr", "table",
];

/// Table cells are joined with one space.
const CELL_ELEMENTS: &[&str] = &["td", "th"];

/// Elements whose whitespace-only text is layout between rows and cells.
const TABLE_STRUCTURE: &[&str] = &["table", "thead", "tbody", "tfoot", "tr"];

/// Elements whose text is never readable content.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style"];

/// Convert markdown to plain text, one block per line.
///
/// Empty input gives an empty string. If rendering fails the input is
/// returned unchanged; cleaning never fails the caller.
pub fn clean_markdown(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }
    match render_html(markdown) {
        Ok(rendered) => normalize_lines(&html_to_text(&rendered)),
        Err(e) => {
            warn!(error = %e, "markdown cleaning failed, returning input unchanged");
            markdown.to_string()
        }
    }
}

fn render_html(markdown: &str) -> Result<String, std::fmt::Error> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::write_html_fmt(&mut out, Parser::new_ext(markdown, options))?;
    Ok(out)
}

fn html_to_text(rendered: &str) -> String {
    let fragment = Html::parse_fragment(rendered);
    let mut out = String::with_capacity(rendered.len());
    collect_text(fragment.root_element(), &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    let in_table_structure = TABLE_STRUCTURE.contains(&element.value().name());
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            if in_table_structure && text.trim().is_empty() {
                continue;
            }
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            match child_el.value().name() {
                "br" => out.push(LINE_BREAK),
                name if SKIPPED_ELEMENTS.contains(&name) => {}
                name if BLOCK_ELEMENTS.contains(&name) => {
                    // Opening a block also breaks, so a nested list does not
                    // run into the text of its parent item.
                    ensure_line_break(out);
                    collect_text(child_el, out);
                    ensure_line_break(out);
                }
                name if CELL_ELEMENTS.contains(&name) => {
                    collect_text(child_el, out);
                    out.push(' ');
                }
                _ => collect_text(child_el, out),
            }
        }
    }
}

fn ensure_line_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with(LINE_BREAK) {
        out.push(LINE_BREAK);
    }
}

fn normalize_lines(text: &str) -> String {
    text.split(LINE_BREAK)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(clean_markdown(""), "");
    }

    #[test]
    fn emphasis_is_stripped() {
        let cleaned = clean_markdown("**bold** text");
        assert_eq!(cleaned, "bold text");
        assert!(!cleaned.contains('*'));
    }

    #[test]
    fn list_items_land_on_separate_lines() {
        assert_eq!(clean_markdown("- a\n- b"), "a\nb");
        assert_eq!(clean_markdown("1. first\n2. second\n3. third"), "first\nsecond\nthird");
    }

    #[test]
    fn nested_list_does_not_merge_with_parent() {
        let cleaned = clean_markdown("- parent\n  - child\n- sibling");
        assert_eq!(cleaned, "parent\nchild\nsibling");
    }

    #[test]
    fn headings_and_paragraphs() {
        let md = "# Best Espresso Beans\n\nA *short* intro.\n\n## Why it matters\n\nBecause.";
        assert_eq!(
            clean_markdown(md),
            "Best Espresso Beans\nA short intro.\nWhy it matters\nBecause."
        );
    }

    #[test]
    fn single_newlines_keep_lines_apart() {
        assert_eq!(
            clean_markdown("Title One\nTitle Two\nTitle Three"),
            "Title One\nTitle Two\nTitle Three"
        );
    }

    #[test]
    fn hard_break_becomes_newline() {
        assert_eq!(clean_markdown("line one  \nline two"), "line one\nline two");
    }

    #[test]
    fn links_keep_their_text() {
        assert_eq!(
            clean_markdown("See [the guide](https://example.com) and `code`."),
            "See the guide and code."
        );
    }

    #[test]
    fn table_rows_become_lines() {
        let md = "| Keyword | Volume |\n|---|---|\n| espresso | 100 |\n| latte | 80 |";
        assert_eq!(clean_markdown(md), "Keyword Volume\nespresso 100\nlatte 80");
    }

    #[test]
    fn raw_html_is_reduced_to_text() {
        assert_eq!(clean_markdown("<div>one<br>two</div>"), "one\ntwo");
        assert_eq!(clean_markdown("plain <em>inline</em> html"), "plain inline html");
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(
            clean_markdown("<p>Fish &amp; Chips &eacute;</p>"),
            "Fish & Chips é"
        );
        assert_eq!(clean_markdown("Salt &amp; pepper"), "Salt & pepper");
        assert_eq!(clean_markdown("a < b"), "a < b");
    }

    #[test]
    fn html_comments_are_dropped_whole() {
        let cleaned = clean_markdown("Intro <!-- a > b --> end");
        assert!(!cleaned.contains("b -->"), "{cleaned:?}");
        assert!(!cleaned.contains("<!--"), "{cleaned:?}");
        assert!(cleaned.starts_with("Intro"));
        assert!(cleaned.ends_with("end"));
    }

    #[test]
    fn script_contents_are_dropped() {
        assert_eq!(
            clean_markdown("<div>kept<script>var x = 1;</script></div>"),
            "kept"
        );
    }

    #[test]
    fn whitespace_only_lines_are_dropped() {
        assert_eq!(clean_markdown("   \n\n  text  \n\n\n"), "text");
    }

    #[test]
    fn plain_text_is_stable_under_repeated_cleaning() {
        for input in [
            "hello world",
            "first line\nsecond line",
            "Coffee lovers know espresso.\nA second thought here.",
        ] {
            let once = clean_markdown(input);
            assert_eq!(clean_markdown(&once), once, "input: {input:?}");
        }
    }
}
