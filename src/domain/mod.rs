// Domain layer - Editing session and split request types

pub mod model;
