//! Magic-byte MIME sniffing for uploaded and downloaded media.

/// Sniff a MIME type from the leading bytes of a media payload.
pub fn detect_mime(bytes: &[u8]) -> Option<&'static str> {
    let mime = match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x41, 0x56, 0x45, ..] => "audio/wav",
        [0x49, 0x44, 0x33, ..] | [0xFF, 0xFB, ..] | [0xFF, 0xF3, ..] | [0xFF, 0xF2, ..] => {
            "audio/mpeg"
        }
        [0x4F, 0x67, 0x67, 0x53, ..] => "audio/ogg",
        [0x66, 0x4C, 0x61, 0x43, ..] => "audio/flac",
        [_, _, _, _, 0x66, 0x74, 0x79, 0x70, 0x71, 0x74, ..] => "video/quicktime",
        [_, _, _, _, 0x66, 0x74, 0x79, 0x70, 0x4D, 0x34, 0x41, ..] => "audio/mp4",
        [_, _, _, _, 0x66, 0x74, 0x79, 0x70, ..] => "video/mp4",
        [0x1A, 0x45, 0xDF, 0xA3, ..] => "video/webm",
        _ => return None,
    };
    Some(mime)
}

/// Sniff a MIME type, falling back to `fallback` when the format is unknown.
pub fn detect_mime_or(bytes: &[u8], fallback: &'static str) -> &'static str {
    detect_mime(bytes).unwrap_or_else(|| {
        tracing::warn!(
            "Unrecognized media format (first 4 bytes: {:02X?}), falling back to {}",
            &bytes[..bytes.len().min(4)],
            fallback
        );
        fallback
    })
}

/// Guess a MIME type from a file extension.
pub fn mime_from_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => return None,
    };
    Some(mime)
}

/// File extension used when writing a payload of the given MIME type to disk.
pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "audio/wav" => "wav",
        "audio/mpeg" => "mp3",
        "audio/ogg" => "ogg",
        "audio/flac" => "flac",
        "audio/mp4" => "m4a",
        "video/quicktime" => "mov",
        "video/webm" => "webm",
        "video/mp4" => "mp4",
        _ => "bin",
    }
}
