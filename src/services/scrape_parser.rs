// src/services/scrape_parser.rs
//
// Parte pura do scraper: varre o HTML da federação por âncoras de
// documentos, limpa títulos e classifica por palavras-chave. Sem I/O,
// para poder ser testada isolada.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

use crate::models::document::DocumentCategory;

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a>"#)
        .expect("regex de âncora")
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("regex de tag"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("regex de espaço"));
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(20\d{2})\b").expect("regex de versão"));

// Extensões de arquivo que contam como documento publicado.
const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx", ".xls", ".xlsx"];

// Prefixos de botão que poluem os títulos dos links.
const BOILERPLATE_PREFIXES: &[&str] = &["ladda ner", "ladda ned", "hämta", "download"];

// Tabela ordenada de classificação: a primeira regra que casar vence.
const CLASSIFICATION_RULES: &[(&[&str], DocumentCategory)] = &[
    (
        &["tävlingsbestämmelse", "tavlingsbestammelse"],
        DocumentCategory::CompetitionRegulations,
    ),
    (&["spelregel", "regelbok"], DocumentCategory::GameRules),
    (&["domar"], DocumentCategory::RefereeGuidelines),
    (
        &["utveckling", "u-serie", "ungdom"],
        DocumentCategory::DevelopmentSeries,
    ),
    (
        &["säkerhet", "sakerhet", "medicinsk"],
        DocumentCategory::SafetyMedical,
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    pub url: String,
    pub title: String,
}

// Varre as âncoras do HTML, mantendo só as que apontam para arquivos
// de documento. URLs relativas são resolvidas contra a página; URLs
// repetidas são descartadas (a primeira ocorrência vence).
pub fn extract_document_links(html: &str, base: &Url) -> Vec<DocumentLink> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for caps in ANCHOR_RE.captures_iter(html) {
        let href = caps[1].trim();
        if !is_document_href(href) {
            continue;
        }
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        let url = resolved.to_string();
        if !seen.insert(url.clone()) {
            continue;
        }

        let mut title = clean_title(&caps[2]);
        if title.is_empty() {
            title = filename_from_url(&resolved);
        }
        links.push(DocumentLink { url, title });
    }

    links
}

pub fn is_document_href(href: &str) -> bool {
    let lower = href.to_lowercase();
    let path = lower
        .split(['?', '#'])
        .next()
        .unwrap_or(&lower);
    DOCUMENT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

// Remove tags internas, decodifica entidades comuns, colapsa espaços
// e corta os prefixos de botão.
pub fn clean_title(raw: &str) -> String {
    let without_tags = TAG_RE.replace_all(raw, " ");
    let decoded = decode_entities(&without_tags);
    let collapsed = WHITESPACE_RE.replace_all(decoded.trim(), " ").to_string();

    let mut title = collapsed;
    let lower = title.to_lowercase();
    for prefix in BOILERPLATE_PREFIXES {
        if lower.starts_with(prefix) {
            title = title[prefix.len()..].to_string();
            break;
        }
    }
    title.trim_matches([' ', ':', '-', '–']).to_string()
}

// Primeiro ano plausível (20xx) no texto, usado como versão.
pub fn extract_version(text: &str) -> Option<String> {
    VERSION_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
}

pub fn classify(text: &str) -> DocumentCategory {
    let haystack = text.to_lowercase();
    for (keywords, category) in CLASSIFICATION_RULES {
        if keywords.iter().any(|k| haystack.contains(k)) {
            return *category;
        }
    }
    DocumentCategory::General
}

fn filename_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .unwrap_or("document")
        .to_string()
}

// Só as entidades que aparecem nas páginas da federação; `&amp;` por
// último para não decodificar duas vezes.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&auml;", "ä")
        .replace("&Auml;", "Ä")
        .replace("&aring;", "å")
        .replace("&Aring;", "Å")
        .replace("&ouml;", "ö")
        .replace("&Ouml;", "Ö")
        .replace("&eacute;", "é")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://amerikanskfotboll.swe3.se/information-verktyg/spelregler-tavlingsbestammelser/")
            .expect("base de teste")
    }

    #[test]
    fn extracts_and_resolves_document_links() {
        let html = r#"
            <p>Intro</p>
            <a href="/files/Tavlingsbestammelser-2024.pdf"><strong>Tävlingsbestämmelser 2024</strong></a>
            <a href="https://cdn.swe3.se/regler/spelregler.docx" class="btn">Ladda ner: Spelregler</a>
            <a href="/om-oss/">Om oss</a>
        "#;
        let links = extract_document_links(html, &base());
        assert_eq!(links.len(), 2);
        assert_eq!(
            links[0].url,
            "https://amerikanskfotboll.swe3.se/files/Tavlingsbestammelser-2024.pdf"
        );
        assert_eq!(links[0].title, "Tävlingsbestämmelser 2024");
        assert_eq!(links[1].url, "https://cdn.swe3.se/regler/spelregler.docx");
        assert_eq!(links[1].title, "Spelregler");
    }

    #[test]
    fn duplicate_urls_keep_first_occurrence() {
        let html = r#"
            <a href="/a.pdf">Primeiro</a>
            <a href="/a.pdf">Segundo</a>
        "#;
        let links = extract_document_links(html, &base());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "Primeiro");
    }

    #[test]
    fn empty_anchor_text_falls_back_to_filename() {
        let html = r#"<a href="/files/regelbok-2023.pdf"><img src="x.png"></a>"#;
        let links = extract_document_links(html, &base());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "regelbok-2023.pdf");
    }

    #[test]
    fn href_extension_check_ignores_query_strings() {
        assert!(is_document_href("/docs/file.PDF?version=2"));
        assert!(is_document_href("file.xlsx#sheet1"));
        assert!(!is_document_href("/docs/page.html"));
        assert!(!is_document_href("/docs/"));
    }

    #[test]
    fn titles_are_cleaned_of_markup_and_boilerplate() {
        assert_eq!(
            clean_title("  Ladda ner:  <b>S&auml;kerhetsmanual</b>\n2022  "),
            "Säkerhetsmanual 2022"
        );
        assert_eq!(clean_title("Download - Rules &amp; Regulations"), "Rules & Regulations");
    }

    #[test]
    fn classification_follows_rule_order() {
        assert_eq!(
            classify("Tävlingsbestämmelser 2024"),
            DocumentCategory::CompetitionRegulations
        );
        // "spelregler" contém a palavra-chave de regras de jogo mesmo
        // quando o texto também menciona domare mais adiante
        assert_eq!(classify("Spelregler för domare"), DocumentCategory::GameRules);
        assert_eq!(classify("Domarhandbok"), DocumentCategory::RefereeGuidelines);
        assert_eq!(classify("U-serie ungdom"), DocumentCategory::DevelopmentSeries);
        assert_eq!(classify("Medicinsk handbok"), DocumentCategory::SafetyMedical);
        assert_eq!(classify("Årsmöte protokoll"), DocumentCategory::General);
    }

    #[test]
    fn version_is_first_plausible_year() {
        assert_eq!(extract_version("Regelbok 2024/2025"), Some("2024".to_string()));
        assert_eq!(extract_version("utan år"), None);
        // 1999 não conta como versão
        assert_eq!(extract_version("sedan 1999"), None);
    }
}
