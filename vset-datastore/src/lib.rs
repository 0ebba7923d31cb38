mod error;
pub mod keys;
pub mod block_datastore;
pub mod model;
pub mod models;

pub use block_datastore::BlockDatastore;
pub use error::Error;
pub use keys::RecordKind;
pub use model::Model;

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::models::{Block, Commit, CommitSig, Evidence, Validator, ValidatorSet};
    pub use crate::BlockDatastore;
    pub use crate::Model;
    pub use crate::RecordKind;
}
