// Communication module - Wire encoding, decoding and the transport abstraction
pub mod codec;
pub mod html;
pub mod message;
pub mod transport;

pub use codec::{Codec, PageMap};
pub use message::{RawReply, WireRequest};
pub use transport::{Transport, TransportType};
