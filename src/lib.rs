//! class-registry: weekly class scheduling and monthly fee registration, Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
