use crate::config::{
    MIMETYPE_ARTICLE, MIMETYPE_AUTHORITY, MIMETYPE_ENRICHMENT, MIMETYPE_MARCXCHANGE,
};

/// Whether content of this mime type can take part in a MARC exchange collection.
pub fn is_marcxchange(mime_type: &str) -> bool {
    matches!(
        mime_type,
        MIMETYPE_AUTHORITY | MIMETYPE_ARTICLE | MIMETYPE_ENRICHMENT | MIMETYPE_MARCXCHANGE
    )
}
