//! Pull the news, tool and fun-fact sections out of a newsletter's HTML.
//!
//! The generated HTML has one `<h2>` per section (`Daily News`, `Daily Tool`,
//! `Daily Fun Fact`) followed by paragraphs. A section runs from its heading
//! to the next `<h2>`.

use scraper::{ElementRef, Html};
use serde::Serialize;
use url::Url;

const MAX_TITLE_CHARS: usize = 60;
const TOOL_TITLE_FALLBACK: &str = "Outil du jour";
const TOOL_TITLE_PREFIX: &str = "nom de l'outil";

/// Fields recovered from one newsletter; empty when a section is absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewsletterContent {
    pub news_title: String,
    pub news_content: String,
    pub news_link: String,
    pub tool_title: String,
    pub tool_content: String,
    pub tool_link: String,
    pub fun_content: String,
}

impl NewsletterContent {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    News,
    Tool,
    FunFact,
}

impl Section {
    fn from_heading(heading: &str) -> Option<Self> {
        let heading = heading.to_lowercase();
        if heading.contains("daily fun fact") {
            Some(Section::FunFact)
        } else if heading.contains("daily tool") {
            Some(Section::Tool)
        } else if heading.contains("daily new") {
            Some(Section::News)
        } else {
            None
        }
    }
}

/// Extract every section found in `html`. Never fails; missing parts stay empty.
pub fn extract_content(html: &str) -> NewsletterContent {
    let document = Html::parse_document(html);
    let mut content = NewsletterContent::default();
    let mut seen: Vec<Section> = Vec::new();

    let headings = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "h2");

    for heading in headings {
        let Some(section) = Section::from_heading(&collapse(heading.text())) else {
            continue;
        };
        // first occurrence wins
        if seen.contains(&section) {
            continue;
        }
        seen.push(section);

        let body = section_body(heading);
        match section {
            Section::News => fill_news(&mut content, &body),
            Section::Tool => fill_tool(&mut content, &body),
            Section::FunFact => {
                if let Some(paragraph) = first_paragraph(&body) {
                    content.fun_content = collapse(paragraph.text());
                }
            }
        }
    }

    content
}

fn fill_news(content: &mut NewsletterContent, body: &[ElementRef<'_>]) {
    if let Some(paragraph) = first_paragraph(body) {
        let strong = first_strong(paragraph);
        if let Some(strong) = strong {
            content.news_title = truncate_title(&collapse(strong.text()));
        }

        let text = text_without(paragraph, strong);
        content.news_content = text
            .trim_start_matches(|c: char| c == '-' || c == '–' || c.is_whitespace())
            .to_string();

        if content.news_title.is_empty() && !content.news_content.is_empty() {
            content.news_title = truncate_title(first_sentence(&content.news_content));
        }
    }
    content.news_link = first_link(body).unwrap_or_default();
}

fn fill_tool(content: &mut NewsletterContent, body: &[ElementRef<'_>]) {
    if let Some(paragraph) = first_paragraph(body) {
        if let Some(strong) = first_strong(paragraph) {
            content.tool_title = strip_tool_prefix(&collapse(strong.text())).to_string();
        }
        content.tool_content = collapse(paragraph.text());
        if content.tool_title.is_empty() && !content.tool_content.is_empty() {
            content.tool_title = TOOL_TITLE_FALLBACK.to_string();
        }
    }
    content.tool_link = first_link(body).unwrap_or_default();
}

/// Element siblings after `heading`, up to the next `<h2>`
fn section_body(heading: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| el.value().name() != "h2")
        .collect()
}

fn first_paragraph<'a>(body: &[ElementRef<'a>]) -> Option<ElementRef<'a>> {
    body.iter()
        .flat_map(|el| el.descendants().filter_map(ElementRef::wrap))
        .find(|el| el.value().name() == "p")
}

fn first_strong(paragraph: ElementRef<'_>) -> Option<ElementRef<'_>> {
    paragraph
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "strong")
}

/// First `href` in the section that is an absolute http(s) URL
fn first_link(body: &[ElementRef<'_>]) -> Option<String> {
    body.iter()
        .flat_map(|el| el.descendants().filter_map(ElementRef::wrap))
        .filter(|el| el.value().name() == "a")
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .find(|href| {
            Url::parse(href)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false)
        })
        .map(str::to_string)
}

/// Text of `el` with the text under `skip` left out
fn text_without(el: ElementRef<'_>, skip: Option<ElementRef<'_>>) -> String {
    let texts = el.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let skipped = skip.is_some_and(|s| node.ancestors().any(|a| a.id() == s.id()));
        (!skipped).then_some(&**text)
    });
    collapse(texts)
}

fn collapse<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let joined: String = parts.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_title(title: &str) -> String {
    let title = title.trim();
    if title.chars().count() > MAX_TITLE_CHARS {
        let head: String = title.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}

pub(crate) fn first_sentence(text: &str) -> &str {
    text.split(['.', '!', '?']).next().unwrap_or("").trim()
}

fn strip_tool_prefix(title: &str) -> &str {
    let Some(head) = title.get(..TOOL_TITLE_PREFIX.len()) else {
        return title;
    };
    if !head.eq_ignore_ascii_case(TOOL_TITLE_PREFIX) {
        return title;
    }
    title[TOOL_TITLE_PREFIX.len()..]
        .trim_start()
        .trim_start_matches(':')
        .trim_start()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <html><body>
        <h2>Daily News</h2>
        <p><strong>OpenAI lance GPT-5</strong> - OpenAI a annonce aujourd'hui la sortie de GPT-5.
        <a href="https://techcrunch.com/openai-gpt5">Lire plus</a></p>
        <h2>Daily Tool</h2>
        <p><strong>Cursor AI</strong> - Un editeur de code propulse par l'IA.
        <a href="https://cursor.sh">Decouvrir</a></p>
        <h2>Daily Fun Fact</h2>
        <p>Le premier bug informatique documente etait un vrai papillon de nuit trouve dans le
        Harvard Mark II en 1947 par Grace Hopper.</p>
        </body></html>
    "#;

    #[test]
    fn extracts_all_sections() {
        let content = extract_content(SAMPLE);

        assert_eq!(content.news_title, "OpenAI lance GPT-5");
        assert!(content.news_content.starts_with("OpenAI a annonce"));
        assert!(!content.news_content.contains("OpenAI lance GPT-5"));
        assert_eq!(content.news_link, "https://techcrunch.com/openai-gpt5");

        assert_eq!(content.tool_title, "Cursor AI");
        assert!(content.tool_content.contains("editeur de code"));
        assert_eq!(content.tool_link, "https://cursor.sh");

        assert!(content.fun_content.contains("papillon de nuit"));
        assert!(content.fun_content.contains("Harvard Mark II"));
        assert!(!content.fun_content.contains('\n'));
    }

    #[test]
    fn empty_output_yields_empty_content() {
        let content = extract_content("<html><body>Error occurred</body></html>");
        assert!(content.is_empty());
    }

    #[test]
    fn long_news_title_is_truncated() {
        let html = format!(
            "<h2>Daily News</h2><p><strong>{}</strong> - Content here.</p>",
            "A".repeat(100)
        );
        let content = extract_content(&html);
        assert_eq!(content.news_title.chars().count(), 60);
        assert!(content.news_title.ends_with("..."));
        assert_eq!(content.news_content, "Content here.");
    }

    #[test]
    fn news_title_falls_back_to_first_sentence() {
        let html = "<h2>Daily News</h2><p>Rust 2.0 est sorti. Tout le monde migre.</p>";
        let content = extract_content(html);
        assert_eq!(content.news_title, "Rust 2");
    }

    #[test]
    fn tool_prefix_and_fallback_title() {
        let html = "<h2>Daily Tool</h2><p><strong>Nom de l'outil : Zed</strong> editeur</p>";
        assert_eq!(extract_content(html).tool_title, "Zed");

        let html = "<h2>Daily Tool</h2><p>Un outil sans nom.</p>";
        assert_eq!(extract_content(html).tool_title, "Outil du jour");
    }

    #[test]
    fn relative_links_are_ignored() {
        let html = r#"<h2>Daily Tool</h2>
            <p><strong>Zed</strong> <a href="/local">ici</a> <a href="mailto:x@y.z">mail</a></p>
            <p><a href="https://zed.dev">site</a></p>
            <h2>Daily Fun Fact</h2><p><a href="https://not-the-tool.example">x</a></p>"#;
        assert_eq!(extract_content(html).tool_link, "https://zed.dev");
    }
}
