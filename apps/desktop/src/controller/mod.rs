//! Controller layer: parsing terminal input and dispatching it to the movie list.

pub mod events;
pub mod orchestration;
