// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document import pipeline — PDF bytes to candidate payload text.
//
//   bytes ─▶ extract_first_image ─▶ normalize ─▶ QrDecoder ─▶ candidate
//
// The pipeline is synchronous. `ImportTask` runs it on the blocking pool and
// lets the caller abandon it; cancellation is checked between stages.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use greenpass_core::error::{GreenpassError, Result};
use greenpass_document::{QrDecoder, extract_first_image, normalize_sample};
use greenpass_security::hash_bytes;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Result of a successful pipeline run, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDocument {
    /// Text decoded from the first image's QR code.
    pub candidate: String,
    /// Height of the extracted image in pixels.
    pub image_height: u32,
    /// SHA-256 of the document bytes.
    pub fingerprint: String,
}

/// Run the import pipeline on `bytes`.
///
/// Returns `DocumentTooLarge` above `max_bytes`, extraction errors from the
/// PDF stage, `NoReadableCode` when no QR symbol decodes, and `Cancelled`
/// once `cancelled` is set.
#[instrument(skip_all, fields(bytes_len = bytes.len()))]
pub fn decode_document(
    bytes: &[u8],
    decoder: &dyn QrDecoder,
    max_bytes: usize,
    cancelled: &AtomicBool,
) -> Result<DecodedDocument> {
    if bytes.len() > max_bytes {
        return Err(GreenpassError::DocumentTooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }
    let fingerprint = hash_bytes(bytes);
    info!(document = %fingerprint, "importing document");

    let sample = extract_first_image(bytes)?;
    checkpoint(cancelled, "extract")?;

    let buffer = normalize_sample(&sample);
    checkpoint(cancelled, "normalize")?;

    let Some(candidate) = decoder.decode(&buffer) else {
        warn!(document = %fingerprint, "no readable code in first image");
        return Err(GreenpassError::NoReadableCode);
    };
    checkpoint(cancelled, "decode")?;

    debug!(candidate_len = candidate.len(), "document decoded");
    Ok(DecodedDocument {
        candidate,
        image_height: sample.height(),
        fingerprint,
    })
}

fn checkpoint(cancelled: &AtomicBool, stage: &'static str) -> Result<()> {
    if cancelled.load(Ordering::Acquire) {
        debug!(stage, "import cancelled");
        return Err(GreenpassError::Cancelled);
    }
    Ok(())
}

// -- Background task ----------------------------------------------------------

/// Cancels an in-flight import. Cloneable so the UI can hold one while
/// another task awaits the result.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    signal: Arc<Notify>,
}

impl CancelToken {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            signal: Arc::new(Notify::new()),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
        // notify_one keeps a permit if join() is not waiting yet.
        self.signal.notify_one();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Spawns the import pipeline off the async runtime.
pub struct ImportTask;

impl ImportTask {
    /// Start decoding `bytes` on the blocking pool. Must be called from
    /// within a Tokio runtime.
    pub fn spawn(bytes: Vec<u8>, decoder: Arc<dyn QrDecoder>, max_bytes: usize) -> ImportHandle {
        let token = CancelToken::new();
        let flag = Arc::clone(&token.flag);
        let task = tokio::task::spawn_blocking(move || {
            decode_document(&bytes, decoder.as_ref(), max_bytes, &flag)
        });
        ImportHandle { token, task }
    }
}

/// Handle to a running import.
pub struct ImportHandle {
    token: CancelToken,
    task: JoinHandle<Result<DecodedDocument>>,
}

impl ImportHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Wait for the pipeline. A cancelled import resolves to `Cancelled`
    /// straight away; whatever the blocking task produces later is dropped.
    pub async fn join(self) -> Result<DecodedDocument> {
        let Self { token, task } = self;
        tokio::select! {
            biased;

            _ = token.signal.notified() => Err(GreenpassError::Cancelled),

            joined = task => match joined {
                Ok(_) if token.is_cancelled() => Err(GreenpassError::Cancelled),
                Ok(result) => result,
                Err(err) if err.is_cancelled() => Err(GreenpassError::Cancelled),
                Err(err) => Err(GreenpassError::ImageError(format!("import task failed: {}", err))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenpass_core::{ExtractionError, ImageSample, PixelBuffer};
    use greenpass_document::RqrrDecoder;
    use greenpass_document::pdf::writer::write_image_pdf;
    use greenpass_document::PassPdfWriter;

    const LIMIT: usize = 1024 * 1024;

    fn pass_pdf(text: &str) -> Vec<u8> {
        let image = PassPdfWriter::new().render_qr(text).expect("render");
        write_image_pdf(&image, None).expect("pdf")
    }

    fn blank_pdf() -> Vec<u8> {
        let blank = ImageSample::new(vec![u8::MAX; 32 * 32 * 3], 32, 32).expect("sample");
        write_image_pdf(&blank, None).expect("pdf")
    }

    /// Decoder that blocks until released, to hold the pipeline mid-flight.
    struct GatedDecoder {
        gate: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl QrDecoder for GatedDecoder {
        fn decode(&self, _buffer: &PixelBuffer) -> Option<String> {
            let _ = self.gate.lock().ok()?.recv();
            Some("HC1:LATE".to_string())
        }
    }

    #[test]
    fn pass_pdf_decodes_to_candidate() {
        let bytes = pass_pdf("HC1:IMPORTED");
        let decoded = decode_document(&bytes, &RqrrDecoder::new(), LIMIT, &AtomicBool::new(false))
            .expect("decode");
        assert_eq!(decoded.candidate, "HC1:IMPORTED");
        assert_eq!(decoded.fingerprint, hash_bytes(&bytes));
        assert!(decoded.image_height > 0);
    }

    #[test]
    fn image_without_code_is_no_readable_code() {
        let result = decode_document(&blank_pdf(), &RqrrDecoder::new(), LIMIT, &AtomicBool::new(false));
        assert!(matches!(result, Err(GreenpassError::NoReadableCode)));
    }

    #[test]
    fn malformed_bytes_surface_extraction_error() {
        let result = decode_document(b"garbage", &RqrrDecoder::new(), LIMIT, &AtomicBool::new(false));
        assert!(matches!(
            result,
            Err(GreenpassError::Extraction(ExtractionError::MalformedDocument(_)))
        ));
    }

    #[test]
    fn oversized_document_is_refused_before_parsing() {
        let result = decode_document(&[0u8; 64], &RqrrDecoder::new(), 16, &AtomicBool::new(false));
        assert!(matches!(
            result,
            Err(GreenpassError::DocumentTooLarge { size: 64, limit: 16 })
        ));
    }

    #[test]
    fn preset_cancel_flag_stops_after_first_stage() {
        let result = decode_document(&pass_pdf("HC1:X"), &RqrrDecoder::new(), LIMIT, &AtomicBool::new(true));
        assert!(matches!(result, Err(GreenpassError::Cancelled)));
    }

    #[tokio::test]
    async fn background_import_completes() {
        let handle = ImportTask::spawn(pass_pdf("HC1:ASYNC"), Arc::new(RqrrDecoder::new()), LIMIT);
        let decoded = handle.join().await.expect("join");
        assert_eq!(decoded.candidate, "HC1:ASYNC");
    }

    #[tokio::test]
    async fn cancelled_import_resolves_to_cancelled() {
        let (release, gate) = std::sync::mpsc::channel();
        let decoder = Arc::new(GatedDecoder {
            gate: std::sync::Mutex::new(gate),
        });
        let handle = ImportTask::spawn(blank_pdf(), decoder, LIMIT);
        let token = handle.cancel_token();

        token.cancel();
        let result = handle.join().await;
        assert!(matches!(result, Err(GreenpassError::Cancelled)));

        // Let the abandoned blocking task finish.
        let _ = release.send(());
    }
}
