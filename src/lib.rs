pub mod carousel;
pub mod config;
pub mod console;
pub mod error;
pub mod events;
pub mod markup;
pub mod page;
pub mod scheduler;
pub mod surface;
pub mod tasks {
    pub mod runner;
}

pub use carousel::{AutoplayState, Carousel, CarouselState, InertReason, Mount};
pub use error::Error;
