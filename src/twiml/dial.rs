use super::{escape_xml, format_xml_string, Action};

/// `<Dial>` connecting the current call to a single phone number.
#[derive(Debug, Clone)]
pub struct Dial {
    pub number: String,
    pub caller_id: Option<String>,
    pub timeout_seconds: u32,
    pub record: bool,
}

impl Action for Dial {
    fn as_twiml(&self) -> String {
        let timeout_string = format!("{}", self.timeout_seconds);
        let mut attrs = Vec::new();
        if let Some(ref caller_id) = self.caller_id {
            attrs.push(("callerId", caller_id.as_str()));
        }
        attrs.push(("timeout", timeout_string.as_str()));
        attrs.push(("record", if self.record { "true" } else { "false" }));

        let number = format_xml_string("Number", &[], &escape_xml(&self.number));
        format_xml_string("Dial", &attrs, &number)
    }
}
