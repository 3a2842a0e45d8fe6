//! Diagen Core Types and Definitions
//!
//! This crate provides the foundational types shared by every stage of the
//! Diagen pipeline. It includes:
//!
//! - **Identifiers**: String-interned identifiers ([`identifier::Id`])
//! - **Colors**: CSS color parsing and validation ([`color::Color`])
//! - **Values**: The tagged literal type used by metadata and attributes ([`value::Value`])
//! - **Styles**: Partial style records with shallow-merge semantics ([`style`] module)
//! - **IR**: The intermediate representation produced by the parser ([`ir`] module)
//! - **Themes**: Built-in theme tables ([`theme`] module)
//! - **Model**: The mutable, indexed graph model ([`model::DiagramModel`])

pub mod color;
pub mod identifier;
pub mod ir;
pub mod model;
pub mod style;
pub mod theme;
pub mod value;
