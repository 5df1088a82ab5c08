use projcom::core::communication::{RawReply, WireRequest};
use projcom::{Codec, Command, CommandName, Mode, PageMap};
use proptest::prelude::*;
use std::sync::Arc;

fn command_name() -> impl Strategy<Value = CommandName> {
    prop::sample::select(CommandName::ALL.to_vec())
}

fn settable_name() -> impl Strategy<Value = CommandName> {
    command_name().prop_filter("get-only command", |name| !name.is_get_only())
}

/// Names the default page table can read over HTTP
fn page_mapped_name() -> impl Strategy<Value = CommandName> {
    let pages = PageMap::default();
    let mapped: Vec<CommandName> = CommandName::ALL
        .iter()
        .copied()
        .filter(|name| pages.page(*name).is_some())
        .collect();
    prop::sample::select(mapped)
}

proptest! {
    #[test]
    fn line_get_returns_text_between_equals_and_cr(
        name in command_name(),
        value in "[A-Za-z0-9 =]{0,12}",
        tail in "[:\r A-Z]{0,6}",
    ) {
        let reply = RawReply::Line(format!("{}={}\r{}", name, value, tail).into_bytes());
        let decoded = Codec::Line.decode(&Command::get(name), &reply).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn line_set_succeeds_only_on_colon(name in settable_name(), reply in "[^\r]{0,10}") {
        let command = Command::set(name, "ON");
        let result = Codec::Line.decode(&command, &RawReply::Line(reply.clone().into_bytes()));
        prop_assert_eq!(result.is_ok(), reply.starts_with(':'));
    }

    #[test]
    fn line_encoding_is_one_cr_terminated_line(name in settable_name(), value in "[A-Z0-9]{1,4}") {
        let set = Codec::Line.encode(&Command::set(name, value.clone())).unwrap();
        prop_assert_eq!(set, WireRequest::Line(format!("{} {}\r", name, value)));

        let get = Codec::Line.encode(&Command::get(name)).unwrap();
        prop_assert_eq!(get, WireRequest::Line(format!("{}?\r", name)));
    }

    #[test]
    fn http_non_200_is_always_an_error(name in settable_name(), status in 100u16..600, body in ".{0,20}") {
        prop_assume!(status != 200);
        let codec = Codec::Http(Arc::new(PageMap::default()));
        let command = Command::new(name, Mode::Set("ON".to_string()));
        let reply = RawReply::Http { status, body };
        prop_assert!(codec.decode(&command, &reply).is_err());
    }

    #[test]
    fn http_get_reads_back_the_checked_radio(
        name in page_mapped_name(),
        value in "[0-9A-Z]{2}",
        before in prop::collection::vec("[0-9A-Z]{2}", 0..3),
        after in prop::collection::vec("[0-9A-Z]{2}", 0..3),
    ) {
        let pages = Arc::new(PageMap::default());
        let codec = Codec::Http(Arc::clone(&pages));
        let command = Command::get(name);

        let expected = format!("/cgi-bin/{}", pages.page(name).unwrap());
        prop_assert_eq!(
            codec.encode(&command).unwrap(),
            WireRequest::Http { target: expected }
        );

        let radio = |v: &String, checked: &str| {
            format!(r#"<input type="radio" name="{}" value="{}"{}>"#, name, v, checked)
        };
        let mut form = String::new();
        for v in &before {
            form.push_str(&radio(v, ""));
        }
        form.push_str(&radio(&value, " checked"));
        for v in &after {
            form.push_str(&radio(v, ""));
        }
        let body = format!("<html><body><form>{}</form></body></html>", form);

        let decoded = codec.decode(&command, &RawReply::Http { status: 200, body }).unwrap();
        prop_assert_eq!(decoded, value);
    }
}
