//! Call routing decision.
//!
//! Turns the metadata of one voice webhook into a [`RoutingInstruction`]:
//! dial the requested number when the call names a destination, otherwise
//! greet the caller.

use crate::twiml::{Dial, Say, Twiml, Voice};
use crate::CONFIG;
use std::collections::BTreeMap;

pub const DEFAULT_RING_TIMEOUT_SECONDS: u32 = 30;
pub const DEFAULT_GREETING: &str = "Hello! This call is being connected.";
pub const DEFAULT_VOICE: &str = "alice";

/// The parts of a voice webhook the routing decision looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallEvent {
    pub to_number: Option<String>,
    pub from_number: Option<String>,
}

impl CallEvent {
    /// The destination number, if one was supplied. An empty value counts as
    /// absent; anything else is dialed as given.
    pub fn destination(&self) -> Option<&str> {
        self.to_number
            .as_deref()
            .filter(|number| !number.is_empty())
    }
}

impl From<BTreeMap<String, String>> for CallEvent {
    fn from(mut params: BTreeMap<String, String>) -> CallEvent {
        CallEvent {
            to_number: params.remove("To"),
            from_number: params.remove("From"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingInstruction {
    Dial {
        target: String,
        caller_id: Option<String>,
        ring_timeout_seconds: u32,
        record: bool,
    },
    Say {
        message: String,
        voice: String,
    },
}

impl RoutingInstruction {
    /// Render the instruction as a one-verb TwiML document.
    pub fn to_twiml(&self) -> Twiml {
        let mut twiml = Twiml::new();

        match self {
            RoutingInstruction::Dial {
                target,
                caller_id,
                ring_timeout_seconds,
                record,
            } => {
                twiml.add(&Dial {
                    number: target.to_owned(),
                    caller_id: caller_id.to_owned(),
                    timeout_seconds: *ring_timeout_seconds,
                    record: *record,
                });
            }
            RoutingInstruction::Say { message, voice } => {
                twiml.add(&Say {
                    txt: message.to_owned(),
                    voice: Voice::from(voice.as_str()),
                    language: None,
                });
            }
        }

        twiml
    }
}

/// Constants that shape the routing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPolicy {
    pub ring_timeout_seconds: u32,
    pub record: bool,
    pub greeting: String,
    pub voice: String,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            ring_timeout_seconds: DEFAULT_RING_TIMEOUT_SECONDS,
            record: false,
            greeting: DEFAULT_GREETING.to_owned(),
            voice: DEFAULT_VOICE.to_owned(),
        }
    }
}

impl RoutingPolicy {
    /// Build the policy from `Config.toml`.
    pub fn from_config() -> Self {
        let ring_timeout_seconds = u32::try_from(CONFIG.settings.ring_timeout)
            .ok()
            .filter(|seconds| *seconds > 0)
            .unwrap_or_else(|| {
                log::warn!(
                    "Invalid ring timeout {} in config, using {}s",
                    CONFIG.settings.ring_timeout,
                    DEFAULT_RING_TIMEOUT_SECONDS
                );
                DEFAULT_RING_TIMEOUT_SECONDS
            });

        Self {
            ring_timeout_seconds,
            record: CONFIG.settings.record_calls,
            greeting: CONFIG.texts.greeting.to_owned(),
            voice: CONFIG.settings.voice.to_owned(),
        }
    }

    pub fn decide(&self, event: &CallEvent) -> RoutingInstruction {
        match event.destination() {
            Some(target) => RoutingInstruction::Dial {
                target: target.to_owned(),
                caller_id: event.from_number.clone(),
                ring_timeout_seconds: self.ring_timeout_seconds,
                record: self.record,
            },
            None => RoutingInstruction::Say {
                message: self.greeting.clone(),
                voice: self.voice.clone(),
            },
        }
    }
}

/// Decide how to route a call with the default policy.
pub fn decide(event: &CallEvent) -> RoutingInstruction {
    RoutingPolicy::default().decide(event)
}
