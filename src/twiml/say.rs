use super::{escape_xml, format_xml_string, Action};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Voice {
    Man,
    Woman,
    Custom(String),
}

impl From<&str> for Voice {
    fn from(name: &str) -> Voice {
        match name {
            "man" => Voice::Man,
            "woman" => Voice::Woman,
            other => Voice::Custom(other.to_owned()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Say {
    pub txt: String,
    pub voice: Voice,
    pub language: Option<String>,
}

impl Action for Say {
    fn as_twiml(&self) -> String {
        let voice_str = match self.voice {
            Voice::Man => "man",
            Voice::Woman => "woman",
            Voice::Custom(ref s) => s.as_ref(),
        };
        let mut attrs = vec![("voice", voice_str)];
        if let Some(ref language) = self.language {
            attrs.push(("language", language.as_str()));
        }
        format_xml_string("Say", &attrs, &escape_xml(&self.txt))
    }
}
