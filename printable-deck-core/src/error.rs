use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum DeckError {
    Network(reqwest::Error),
    Http { url: String, status: u16 },
    Io(std::io::Error),
    Pdf(String),
    Image(String),
    OutputExists(PathBuf),
    Input(String),
}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::Network(e) => write!(f, "Network error: {}", e),
            DeckError::Http { url, status } => write!(f, "HTTP {} from {}", status, url),
            DeckError::Io(e) => write!(f, "IO error: {}", e),
            DeckError::Pdf(e) => write!(f, "PDF generation error: {}", e),
            DeckError::Image(e) => write!(f, "Image error: {}", e),
            DeckError::OutputExists(path) => {
                write!(f, "Output directory already exists: {}", path.display())
            }
            DeckError::Input(e) => write!(f, "Invalid input: {}", e),
        }
    }
}

impl std::error::Error for DeckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeckError::Network(e) => Some(e),
            DeckError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DeckError {
    fn from(err: reqwest::Error) -> Self {
        DeckError::Network(err)
    }
}

impl From<std::io::Error> for DeckError {
    fn from(err: std::io::Error) -> Self {
        DeckError::Io(err)
    }
}
