// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to one plain English message with a clear
// suggestion. Severity drives UI presentation.

use crate::error::{ExtractionError, GreenpassError};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth trying again as-is (device hiccup, storage busy).
    Transient,
    /// User must do something (pick another file, grant a permission).
    ActionRequired,
    /// Cannot be fixed by retrying: wrong kind of file, missing feature.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether trying the same action again may succeed.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `GreenpassError` into a `HumanError`.
pub fn humanize_error(err: &GreenpassError) -> HumanError {
    match err {
        GreenpassError::Extraction(extraction) => humanize_extraction_error(extraction),

        // Same outcome as an image-less document: the import just didn't work.
        GreenpassError::NoReadableCode => HumanError {
            message: "We couldn't find a pass in this PDF.".into(),
            suggestion: "Make sure you picked the PDF of your certificate, the one with the QR code on the first page.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        GreenpassError::UnrecognizedPayload => HumanError {
            message: "That QR code isn't a health certificate.".into(),
            suggestion: "Scan the QR code printed on your certificate.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        GreenpassError::InvalidTransition { .. } => HumanError {
            message: "That isn't possible right now.".into(),
            suggestion: "Finish or cancel what you're doing first, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        GreenpassError::Cancelled => HumanError {
            message: "Import cancelled.".into(),
            suggestion: "Choose the PDF again whenever you're ready.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        GreenpassError::DocumentTooLarge { .. } => HumanError {
            message: "This file is too big.".into(),
            suggestion: "Certificates are small PDFs. Check that you picked the right file.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        GreenpassError::ImageError(_) => HumanError {
            message: "There's a problem with this picture.".into(),
            suggestion: "Try again with a sharper picture of the QR code.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        GreenpassError::Database(_) => HumanError {
            message: "Your pass couldn't be saved on this device.".into(),
            suggestion: "Try again. If this keeps happening, restart the app.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        GreenpassError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to read that file.".into(),
                    suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        GreenpassError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        GreenpassError::Bridge(_) => HumanError {
            message: "A device feature didn't work.".into(),
            suggestion: "Try restarting the app.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        GreenpassError::PlatformUnavailable => HumanError {
            message: "This feature isn't available on your device.".into(),
            suggestion: "Import your certificate from a PDF instead.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

fn humanize_extraction_error(err: &ExtractionError) -> HumanError {
    match err {
        ExtractionError::MalformedDocument(_) => HumanError {
            message: "This file isn't a readable PDF.".into(),
            suggestion: "The file may be damaged. Download your certificate again and import the new copy.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
        ExtractionError::NoImageFound | ExtractionError::UnsupportedImage(_) => HumanError {
            message: "We couldn't find a pass in this PDF.".into(),
            suggestion: "Make sure you picked the PDF of your certificate, the one with the QR code on the first page.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_document_is_permanent() {
        let err = GreenpassError::from(ExtractionError::MalformedDocument("bad xref".into()));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Permanent);
        assert!(!human.retriable);
    }

    #[test]
    fn no_readable_code_matches_no_image_found() {
        let no_code = humanize_error(&GreenpassError::NoReadableCode);
        let no_image = humanize_error(&GreenpassError::from(ExtractionError::NoImageFound));
        assert_eq!(no_code.message, no_image.message);
        assert_eq!(no_code.severity, no_image.severity);
    }

    #[test]
    fn missing_file_needs_action() {
        let err = GreenpassError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn database_error_is_transient() {
        let human = humanize_error(&GreenpassError::Database("locked".into()));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }
}
