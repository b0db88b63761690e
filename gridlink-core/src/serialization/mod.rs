//! Serialization framework turning user values into routable binary form.

mod data_input;
mod data_output;
mod routable_key;
mod traits;

pub use data_input::{DataInput, ObjectDataInput};
pub use data_output::{DataOutput, ObjectDataOutput};
pub use routable_key::RoutableKey;
pub use traits::{Deserializable, Serializable};
