use std::path::Path;

/// Audio types accepted for transcription
pub const ALLOWED_AUDIO_TYPES: &[&str] = &["audio/wav", "audio/mpeg", "audio/webm", "audio/ogg", "audio/x-m4a"];

/// Filename assumed when the client sends none
pub const DEFAULT_FILENAME: &str = "audio.wav";

const MAX_FILENAME_LEN: usize = 255;
const MAX_EXTENSION_LEN: usize = 10;

/// Check a declared MIME type against an allow-list
///
/// Parameters such as `;codecs=opus` are ignored and the comparison is
/// case-insensitive, so `audio/webm;codecs=opus` from a browser recorder
/// matches `audio/webm`.
pub fn validate_mime_type(declared: &str, allowed: &[&str]) -> bool {
    let essence = essence(declared);
    !essence.is_empty() && allowed.iter().any(|candidate| candidate.eq_ignore_ascii_case(&essence))
}

/// Produce a filesystem-safe filename from client input
///
/// Directory components are dropped, characters outside `[A-Za-z0-9._-]`
/// become `_`, and leading dots are stripped. Falls back to
/// [`DEFAULT_FILENAME`] when nothing usable is left.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_' || c == '.') {
        return DEFAULT_FILENAME.to_string();
    }

    truncate(cleaned)
}

/// Extension for the staged copy of an upload
///
/// Taken from the sanitized filename when it has a plausible one, otherwise
/// derived from the declared MIME type.
pub(crate) fn staged_extension(filename: &str, content_type: &str) -> String {
    let from_name = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= MAX_EXTENSION_LEN && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    if let Some(ext) = from_name {
        return ext.to_ascii_lowercase();
    }

    let ext = match essence(content_type).as_str() {
        "audio/wav" => "wav",
        "audio/mpeg" => "mp3",
        "audio/webm" => "webm",
        "audio/ogg" => "ogg",
        "audio/x-m4a" => "m4a",
        _ => "bin",
    };

    ext.to_string()
}

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

// Input is ASCII at this point, so byte slicing stays on char boundaries
fn truncate(name: &str) -> String {
    if name.len() <= MAX_FILENAME_LEN {
        return name.to_string();
    }

    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.len() < MAX_EXTENSION_LEN => {
            let keep = MAX_FILENAME_LEN - ext.len() - 1;
            format!("{}.{ext}", &stem[..keep.min(stem.len())])
        }
        _ => name[..MAX_FILENAME_LEN].to_string(),
    }
}
