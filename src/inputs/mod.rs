pub mod line_input;

pub use line_input::{InputOutcome, LineInput};
