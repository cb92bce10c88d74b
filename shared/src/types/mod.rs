//! Shared type definitions for the Real Deal backend
//!
//! - Open-ended documents ([`Document`], [`Value`]) used by fixtures and entity reads
//! - Object storage references ([`ObjectRef`], [`PresignedGrant`])

pub mod document;
pub mod object;

pub use document::{Document, Value};
pub use object::{
    media_object_key, ObjectRef, PresignedGrant, DEFAULT_CONTENT_TYPE, DEFAULT_PRESIGN_TTL,
};
