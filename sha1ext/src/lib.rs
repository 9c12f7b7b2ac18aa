pub mod digest;
pub mod encode;
pub mod error;
pub mod forgery;

pub use digest::sha1::{padding, Digest, Sha1, Sha1Core};
pub use error::MalformedDigestError;
pub use forgery::{extend, forge_with_oracle, sign, verify, Forgery, LengthExtender};
