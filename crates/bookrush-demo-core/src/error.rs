use bookrush_data::DataLoadError;

/// Errors from the demo harness.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// The shop data failed to load or validate.
    #[error(transparent)]
    Data(#[from] DataLoadError),

    /// The tick budget ran out before the day concluded.
    #[error("the shift never reached a conclusion")]
    ShiftNeverEnded,
}
