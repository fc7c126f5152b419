pub(crate) mod error;
pub(crate) mod health;
pub(crate) mod leaves;
pub(crate) mod unspents;
