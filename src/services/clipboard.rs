use tracing::debug;

use super::ServiceError;

/// Put `text` on the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<(), ServiceError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| ServiceError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_owned())
        .map_err(|e| ServiceError::Clipboard(e.to_string()))?;
    debug!(bytes = text.len(), "copied to clipboard");
    Ok(())
}
