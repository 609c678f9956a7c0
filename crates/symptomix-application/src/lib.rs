pub mod controller;
pub mod events;
pub mod markup;

pub use controller::{
    ChatExchangeController, ControllerOptions, ExchangeHandle, ExchangeReport, Submission,
};
pub use events::{TranscriptEvent, TranscriptSurface, apply_event, drive_surface};
pub use markup::{HtmlSurface, MarkupRenderer};
