//! Minimal TwiML document builder.
//!
//! A [`Twiml`] document is an ordered list of verbs, each rendered through
//! the [`Action`] trait and wrapped in a single `<Response>` element.

mod dial;
mod say;

pub use dial::Dial;
pub use say::{Say, Voice};

/// Something that renders as a TwiML verb.
pub trait Action {
    fn as_twiml(&self) -> String;
}

#[derive(Debug, Default)]
pub struct Twiml {
    body: String,
}

impl Twiml {
    pub fn new() -> Twiml {
        Twiml::default()
    }

    pub fn add(&mut self, action: &dyn Action) -> &mut Twiml {
        self.body.push_str(&action.as_twiml());
        self
    }

    pub fn as_twiml(&self) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>{}",
            format_xml_string("Response", &[], &self.body)
        )
    }
}

/// Render `<tag attr="value" ...>inner</tag>`, or a self-closing tag when
/// `inner` is empty. Attribute values are escaped here; `inner` is expected
/// to be escaped already (text) or to be nested TwiML.
pub(crate) fn format_xml_string(tag: &str, attributes: &[(&str, &str)], inner: &str) -> String {
    let attrs: String = attributes
        .iter()
        .map(|(k, v)| format!(" {}=\"{}\"", k, escape_xml(v)))
        .collect();

    if inner.is_empty() {
        format!("<{}{}/>", tag, attrs)
    } else {
        format!("<{}{}>{}</{}>", tag, attrs, inner, tag)
    }
}

pub(crate) fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_a_bare_response() {
        assert_eq!(
            Twiml::new().as_twiml(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response/>"
        );
    }

    #[test]
    fn verbs_render_in_insertion_order() {
        let mut twiml = Twiml::new();
        twiml
            .add(&Say {
                txt: "first".to_owned(),
                voice: Voice::Woman,
                language: None,
            })
            .add(&Say {
                txt: "second".to_owned(),
                voice: Voice::Man,
                language: None,
            });

        let xml = twiml.as_twiml();
        let first = xml.find("first").unwrap();
        let second = xml.find("second").unwrap();
        assert!(first < second);
        assert!(xml.ends_with("</Response>"));
    }

    #[test]
    fn metacharacters_are_escaped() {
        assert_eq!(
            escape_xml(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &apos;Jerry&apos;&lt;/a&gt;"
        );
        assert_eq!(
            format_xml_string("Number", &[("url", "a?b=1&c=2")], "+1555"),
            "<Number url=\"a?b=1&amp;c=2\">+1555</Number>"
        );
    }
}
