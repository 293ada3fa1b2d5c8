//! lazyffi runtime substrate.
//!
//! Deferred cells and forcing, cons-chain lists and tuples, reference cells,
//! tagged records, the monad shim, deep equality, and the type-directed
//! [`Codec`] that converts values across the host boundary.

mod codec;
mod equality;
mod error;
pub mod host;
pub mod list;
pub mod monad;
mod reference;
mod thunk;
mod value;

pub use codec::{Codec, DEFINED, MAX_SAFE_INTEGER, NULL, NULLABLE, UNDEFINED, WRAPPED_FIELD};
pub use equality::values_equal;
pub use error::{RuntimeError, RuntimeResult};
pub use host::{HostFunction, HostValue};
pub use reference::{new_ref, read_ref, write_ref, Reference};
pub use thunk::{force, force_no_cache, force_with, ForceMode, Thunk};
pub use value::{apply, apply_all, Cons, Function, Record, Value};
