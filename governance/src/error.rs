use nmr_types::Address;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("{0} is not a governance identity")]
    Unauthorized(Address),
}
