/// Settings applied to the output channel of a stage or source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    buffer: usize,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel capacity. `0` (the default) makes every hand-off a rendezvous.
    pub fn buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer
    }
}
