//! Error types for reading, normalizing and writing SVG documents

use std::path::PathBuf;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    /// Reading or writing a file failed
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not well-formed XML
    #[error("XML error at byte {position}: {message}")]
    Xml { message: String, position: usize },

    /// The input has no root element at all
    #[error("document has no root element")]
    MissingRoot,

    /// End of input reached while an element was still open
    #[error("element <{name}> is never closed")]
    UnclosedElement { name: String, position: usize },

    /// A second top-level element follows the root
    #[error("unexpected second root element <{name}>")]
    MultipleRoots { name: String, position: usize },
}

impl NormalizeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn xml(message: impl Into<String>, position: usize) -> Self {
        Self::Xml {
            message: message.into(),
            position,
        }
    }

    /// Byte offset into the source, for errors raised while parsing
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Xml { position, .. }
            | Self::UnclosedElement { position, .. }
            | Self::MultipleRoots { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// Errors without a source position fall back to their `Display` text.
    pub fn format(&self, source: &str, filename: &str) -> String {
        let Some(position) = self.position() else {
            return self.to_string();
        };

        // ariadne spans count chars, quick-xml positions count bytes
        let len = source.chars().count();
        let start = source
            .char_indices()
            .take_while(|(i, _)| *i < position)
            .count()
            .min(len.saturating_sub(1));
        let end = (start + 1).min(len);
        let message = self.to_string();

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, start)
            .with_message(&message)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => message,
        }
    }
}
