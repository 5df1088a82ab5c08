// HTML helpers - reading state out of the projector's configuration pages
use scraper::{ElementRef, Html};

/// Value of the checked radio button named `name`, if any.
///
/// The web interface only exposes current settings inside rendered
/// configuration forms, so a "get" means finding which radio input of the
/// group is marked `checked`. A checked radio without a `value` attribute
/// reports `"on"`, matching how browsers submit it.
pub fn checked_radio_value(document: &str, name: &str) -> Option<String> {
    let html = Html::parse_document(document);

    html.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "input")
        .filter(|element| element.value().attr("name") == Some(name))
        .filter(|element| {
            element
                .value()
                .attr("type")
                .map(|kind| kind.eq_ignore_ascii_case("radio"))
                .unwrap_or(false)
        })
        .find(|element| element.value().attr("checked").is_some())
        .map(|element| element.value().attr("value").unwrap_or("on").to_string())
}
