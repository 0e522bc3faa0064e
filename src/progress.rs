// src/progress.rs
/// Progress reporting for multi-step jobs (the stage fetch and photo loops).
/// The CLI implements this to print one line per item.
pub trait Progress {
    /// Called at the start with the number of items (stages or riders) to process.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One item (stage number or rider id) finished; `rows` is how many rows it
    /// produced (0 on failure).
    fn item_done(&mut self, _item: u32, _rows: usize) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}
