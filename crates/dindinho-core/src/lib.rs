//! # dindinho-core
//!
//! Core types, ID prefixes, and error types for Dindinho.
//!
//! This crate provides the foundational types shared across all Dindinho crates:
//! - Entity structs for the persisted domain objects (users, accounts, invites, grants, audit)
//! - Status and permission enums with their storage strings
//! - ID prefix constants
//! - The domain error taxonomy and validation issue type
//! - API response types, including the error envelope
//! - Audit detail sub-types

pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod responses;
