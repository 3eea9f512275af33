use crate::filter::ExclusionFilter;
use crate::parsers::{ImageTag, ParseResult};
use scraper::{ElementRef, Html, Selector};

/// Parses HTML content and enumerates its `<img>` elements
pub fn parse(html: &str) -> ParseResult {
    parse_with_exclusions(html, &ExclusionFilter::default())
}

/// Parses HTML content, dropping images inside excluded subtrees
pub fn parse_with_exclusions(html: &str, filter: &ExclusionFilter) -> ParseResult {
    let doc = Html::parse_document(html);

    for pattern in filter.patterns() {
        ::log::debug!("Running exclusion rule for '{}'", pattern);
    }

    let img_selector = match Selector::parse("img") {
        Ok(selector) => selector,
        Err(_) => return ParseResult::default(),
    };

    let images = doc
        .select(&img_selector)
        .filter(|el| !filter.is_excluded(el))
        .map(|el| ImageTag {
            src: el.value().attr("src").map(str::to_string),
            alt: el.value().attr("alt").map(str::to_string),
            css_path: css_path(&el),
        })
        .collect::<Vec<_>>();

    ::log::debug!("HTML parser found {} images", images.len());

    ParseResult::new(images)
}

/// Builds a `parent > child:nth-child(n)` path for an element, stopping below `<body>`
pub fn css_path(element: &ElementRef) -> String {
    let mut path = vec![path_segment(element)];

    for parent in element.ancestors().filter_map(ElementRef::wrap) {
        if parent.value().name() == "body" {
            break;
        }
        path.push(path_segment(&parent));
    }

    path.reverse();
    path.join(" > ")
}

fn path_segment(element: &ElementRef) -> String {
    let position = element
        .prev_siblings()
        .filter(|node| node.value().is_element())
        .count()
        + 1;

    let name = element.value().name();
    if position > 1 {
        format!("{}:nth-child({})", name, position)
    } else {
        name.to_string()
    }
}
