pub mod changelog;
pub mod check;
pub mod evidence;
pub mod get_block;
pub mod index;
pub mod validator_set;
