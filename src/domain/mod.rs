// Domain layer - Core types

pub mod model;
