use std::path::PathBuf;

/// Where an encoder writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// `"-"`: the encoder's default stream
    Default,
    /// `""`: no output
    Suppressed,
    File(PathBuf),
}

impl Destination {
    pub fn parse(value: &str) -> Self {
        match value {
            "-" => Destination::Default,
            "" => Destination::Suppressed,
            path => Destination::File(PathBuf::from(path)),
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Destination::Suppressed)
    }
}
