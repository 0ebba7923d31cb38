pub mod block;
pub mod evidence;
pub mod validator;

pub use block::{Block, Commit, CommitSig};
pub use evidence::Evidence;
pub use validator::{Validator, ValidatorSet};
