//! Command routing over a registration table.
//!
//! Handler families register themselves into a [`HandlerTable`] keyed by
//! function byte, then by subcode byte. Dispatch is two lookups and a call;
//! unknown-code handling falls out of the table misses instead of living in
//! an 18-arm match:
//!
//! - unknown **function**: local failure only, no bus response — the frame
//!   may belong to a newer device generation sharing the bus,
//! - unknown **subcode** of a known family: NAK with a descriptive message.
//!
//! Handlers are plain function pointers over the shared [`Device`] context,
//! so a family's logic stays polymorphic over one uniform contract.

use crate::device::Device;
use gatelink_core::{CommandResponse, Result};
use gatelink_hardware::DigitalOutput;
use gatelink_protocol::{ParsedCommand, WireReply};
use gatelink_storage::NvStore;
use std::collections::HashMap;

/// What a handler hands back: the wire reply plus the local result fields.
#[derive(Debug, Clone)]
pub struct HandlerReply {
    pub wire: WireReply,
    pub message: String,
    pub data: Option<String>,
}

impl HandlerReply {
    /// ACK with a local message.
    pub fn ack(message: impl Into<String>) -> Self {
        HandlerReply {
            wire: WireReply::Ack,
            message: message.into(),
            data: None,
        }
    }

    /// Data response whose payload is also echoed in the local result.
    pub fn data(
        function: u8,
        subcode: u8,
        payload: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let payload = payload.into();
        HandlerReply {
            wire: WireReply::data(function, subcode, payload.clone().into_bytes()),
            message: message.into(),
            data: Some(payload),
        }
    }

    /// Local response equivalent, for the façade layer.
    pub fn to_response(&self) -> CommandResponse {
        CommandResponse {
            success: true,
            message: self.message.clone(),
            data: self.data.clone(),
        }
    }
}

/// Uniform handler contract: mutate the device, produce a reply.
pub type Handler<S, O> = fn(&mut Device<S, O>, &ParsedCommand) -> Result<HandlerReply>;

struct Family<S: NvStore, O: DigitalOutput> {
    name: &'static str,
    handlers: HashMap<u8, Handler<S, O>>,
}

/// Registration table keyed by (function, subcode).
pub struct HandlerTable<S: NvStore, O: DigitalOutput> {
    families: HashMap<u8, Family<S, O>>,
}

/// Outcome of a table lookup. Owns everything it returns so the caller can
/// re-borrow the device mutably for the handler call.
pub enum Lookup<S: NvStore, O: DigitalOutput> {
    Found(Handler<S, O>),
    UnknownFunction,
    UnknownSubcode { family: &'static str },
}

impl<S: NvStore, O: DigitalOutput> HandlerTable<S, O> {
    pub fn new() -> Self {
        HandlerTable {
            families: HashMap::new(),
        }
    }

    /// Register a family, returning a registrar for its subcodes.
    pub fn family(&mut self, code: u8, name: &'static str) -> FamilyRegistrar<'_, S, O> {
        let family = self.families.entry(code).or_insert_with(|| Family {
            name,
            handlers: HashMap::new(),
        });
        FamilyRegistrar { family }
    }

    pub fn lookup(&self, function: u8, subcode: u8) -> Lookup<S, O> {
        match self.families.get(&function) {
            None => Lookup::UnknownFunction,
            Some(family) => match family.handlers.get(&subcode) {
                Some(handler) => Lookup::Found(*handler),
                None => Lookup::UnknownSubcode {
                    family: family.name,
                },
            },
        }
    }

    /// Registered family count (table sanity checks in tests).
    pub fn family_count(&self) -> usize {
        self.families.len()
    }
}

impl<S: NvStore, O: DigitalOutput> Default for HandlerTable<S, O> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped registrar handed out by [`HandlerTable::family`].
pub struct FamilyRegistrar<'a, S: NvStore, O: DigitalOutput> {
    family: &'a mut Family<S, O>,
}

impl<'a, S: NvStore, O: DigitalOutput> FamilyRegistrar<'a, S, O> {
    /// Register the handler for one subcode.
    pub fn on(&mut self, subcode: u8, handler: Handler<S, O>) -> &mut Self {
        self.family.handlers.insert(subcode, handler);
        self
    }
}
