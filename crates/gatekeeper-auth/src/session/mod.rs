//! Stateless session tokens: identity, memberships, and the codec that
//! seals them into client-held cookies.

pub mod codec;
pub mod keys;
pub mod model;

pub use codec::SessionCodec;
pub use keys::SessionKeys;
pub use model::{Memberships, Session, SessionState};
