// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for callers that show errors to end users.
//
// Every engine error is mapped to plain English with a clear suggestion. The
// engine never retries; `retriable` tells the caller whether re-submitting the
// same request could possibly succeed.

use crate::error::RxPdfError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Disk or filesystem hiccup; trying again may work.
    Transient,
    /// The user must supply different input (more files, a fixed page list).
    ActionRequired,
    /// The input itself cannot be processed.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether re-submitting the same request could succeed.
    pub retriable: bool,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `RxPdfError` into a `HumanError`.
pub fn humanize_error(err: &RxPdfError) -> HumanError {
    match err {
        RxPdfError::Format { .. } => HumanError {
            message: "This file doesn't look like a valid PDF or image.".into(),
            suggestion: "The file may be damaged or incomplete. Try downloading or exporting it again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        RxPdfError::EmptyDocument => HumanError {
            message: "This PDF has no pages.".into(),
            suggestion: "Choose a PDF that has at least one page.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        RxPdfError::InsufficientInputs { required, .. } => HumanError {
            message: "Not enough PDFs to merge.".into(),
            suggestion: format!("Upload at least {required} PDF files to merge."),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        RxPdfError::NoValidInputs => HumanError {
            message: "No images were uploaded.".into(),
            suggestion: "Choose one or more JPEG or PNG images.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        RxPdfError::UnsupportedColorSpace(_) => HumanError {
            message: "This PDF contains an image we can't compress.".into(),
            suggestion: "The image uses an unusual colour format. The PDF can still be merged, rotated or trimmed.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        RxPdfError::ImageTooLarge { .. } => HumanError {
            message: "The compressed images would be far too large.".into(),
            suggestion: "Choose a lower DPI; 72 keeps images at their current size.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        RxPdfError::InvalidSpec { tokens } => HumanError {
            message: "Some page numbers couldn't be understood.".into(),
            suggestion: format!(
                "Use page numbers like \"2,4\" or \"1:90,3:270\" (angles in steps of 90). Problem entries: {}",
                tokens.join(", ")
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        RxPdfError::InvalidPageOrder(_) => HumanError {
            message: "The new page order isn't complete.".into(),
            suggestion: "List every page exactly once, for example \"3,1,2\" for a three-page PDF.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        RxPdfError::Encode(_) => HumanError {
            message: "We couldn't write the new PDF.".into(),
            suggestion: "Try a lower quality setting or a different file.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        RxPdfError::Io(_) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: "Check that the file exists and that there is enough disk space, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        RxPdfError::Config(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check the configuration file is valid JSON, or remove it to use the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_shortfall_names_required_count() {
        let err = RxPdfError::InsufficientInputs {
            required: 2,
            got: 1,
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("at least 2"));
    }

    #[test]
    fn io_is_the_only_retriable_error() {
        let io = RxPdfError::Io(std::io::Error::other("disk full"));
        assert!(humanize_error(&io).retriable);
        assert!(!humanize_error(&RxPdfError::EmptyDocument).retriable);
        assert!(!humanize_error(&RxPdfError::NoValidInputs).retriable);
    }

    #[test]
    fn oversized_image_asks_for_lower_dpi() {
        let err = RxPdfError::ImageTooLarge {
            width: 100_000,
            height: 100_000,
            limit: 1 << 25,
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("lower DPI"));
    }

    #[test]
    fn invalid_spec_echoes_tokens() {
        let err = RxPdfError::InvalidSpec {
            tokens: vec!["abc".into()],
        };
        assert!(humanize_error(&err).suggestion.contains("abc"));
    }
}
