//! QR payload decoding and basket resolution.
//!
//! Decoding is delegated to an external recognition library behind the
//! [`SymbolDecoder`] seam; this module only routes frames through it and
//! resolves decoded payloads against the session view.

use crate::session::SessionView;

/// A single camera frame handed to the symbol decoder.
#[derive(Debug, Clone)]
pub struct ImageFrame {
    /// Raw luminance bytes, row-major
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }
}

/// External barcode/QR recognition collaborator.
///
/// Implementations return the payload of the first symbol found in the
/// frame, or `None` when no symbol is visible.
pub trait SymbolDecoder {
    fn decode_one(&self, frame: &ImageFrame, rotation_degrees: u32) -> Option<String>;
}

/// Result of resolving a scanned payload against the session view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The payload names a known basket
    Found(String),
    /// No basket with this id in the current snapshot
    NotFound,
}

/// Resolves a payload by membership in the view's current key set.
///
/// Every payload is re-resolved independently; negative results are not
/// cached. A view that is not ready has an empty key set.
pub fn resolve(payload: &str, view: &SessionView) -> ResolveOutcome {
    if view.contains(payload) {
        ResolveOutcome::Found(payload.to_string())
    } else {
        ResolveOutcome::NotFound
    }
}

/// Decodes camera frames and resolves payloads to basket ids.
pub struct ScanResolver<D> {
    decoder: D,
}

impl<D> ScanResolver<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    /// Resolves a payload against the session view; see [`resolve`].
    pub fn resolve(&self, payload: &str, view: &SessionView) -> ResolveOutcome {
        resolve(payload, view)
    }
}

impl<D: SymbolDecoder> ScanResolver<D> {
    /// Decodes at most one payload from a frame.
    ///
    /// Frames with no symbol yield `None`; that is the normal steady state
    /// while no code is in view, not an error.
    pub fn decode(&self, frame: &ImageFrame, rotation_degrees: u32) -> Option<String> {
        self.decoder.decode_one(frame, rotation_degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::BasketMap;
    use crate::models::Basket;

    struct FakeDecoder {
        payload: Option<String>,
    }

    impl SymbolDecoder for FakeDecoder {
        fn decode_one(&self, _frame: &ImageFrame, _rotation_degrees: u32) -> Option<String> {
            self.payload.clone()
        }
    }

    fn ready_view(ids: &[&str]) -> SessionView {
        let snapshot: BasketMap = ids
            .iter()
            .map(|id| (id.to_string(), Basket::new(*id)))
            .collect();
        let mut view = SessionView::new();
        view.apply_snapshot(snapshot);
        view
    }

    fn blank_frame() -> ImageFrame {
        ImageFrame::new(vec![0; 16], 4, 4)
    }

    #[test]
    fn test_decode_returns_payload() {
        let resolver = ScanResolver::new(FakeDecoder {
            payload: Some("SEPET001".into()),
        });
        assert_eq!(
            resolver.decode(&blank_frame(), 90),
            Some("SEPET001".to_string())
        );
    }

    #[test]
    fn test_frame_without_symbol_is_dropped() {
        let resolver = ScanResolver::new(FakeDecoder { payload: None });
        assert_eq!(resolver.decode(&blank_frame(), 0), None);
    }

    #[test]
    fn test_resolve_known_id_is_found() {
        let view = ready_view(&["SEPET001"]);
        assert_eq!(
            resolve("SEPET001", &view),
            ResolveOutcome::Found("SEPET001".to_string())
        );
    }

    #[test]
    fn test_resolve_unknown_id_is_not_found() {
        let view = ready_view(&["SEPET001"]);
        assert_eq!(resolve("UNKNOWN", &view), ResolveOutcome::NotFound);
    }

    #[test]
    fn test_resolve_against_loading_view_is_not_found() {
        let view = SessionView::new();
        assert_eq!(resolve("SEPET001", &view), ResolveOutcome::NotFound);
    }

    #[test]
    fn test_decode_then_resolve_flow() {
        let resolver = ScanResolver::new(FakeDecoder {
            payload: Some("SEPET001".into()),
        });
        let view = ready_view(&["SEPET001", "SEPET002"]);

        let payload = resolver.decode(&blank_frame(), 0).unwrap();
        assert_eq!(
            resolver.resolve(&payload, &view),
            ResolveOutcome::Found("SEPET001".to_string())
        );
    }
}
