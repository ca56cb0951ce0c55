//! Rule file schema.
//!
//! - `RuleEnvelope`: first pass, resolves the `type` discriminator
//! - `RuleKind`: registry of known discriminators and their decoders
//! - `RuleDefinition`: closed sum over the kind-specific shapes
//! - `RuleBase` plus one struct per kind for the fields themselves

mod base;
mod definition;
mod envelope;
mod kind;
mod variants;

pub use base::*;
pub use definition::*;
pub use envelope::*;
pub use kind::*;
pub use variants::*;
