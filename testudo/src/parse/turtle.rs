//! The Turtle parser: terminals and productions.
//!
//! The parser works statement by statement. Each successfully recognized
//! statement yields one [`crate::ast::Statement`]; expansion into canonical
//! triples happens in [`crate::eval`].

pub mod production;
pub mod terminals;

pub use self::production::statement;
