//! Destination key derivation for both jobs.
//!
//! Every artifact the jobs write lands at a key computed only from the source
//! key and the job variant. There is no counter, timestamp, or lookup involved,
//! so reprocessing an object overwrites its previous artifact in place.
//!
//! ## Segments
//!
//! A key is split on `/` into segments. Empty segments (`a//b`, trailing `/`)
//! and `.` segments are ignored. A leading `/` counts as its own root segment.
//!
//! ## EXIF variant
//!
//! The first segment is replaced by `exif/` when the key lives under at least
//! one directory; a bare filename is placed directly under `exif/`. The
//! extension of the final segment is swapped for `.json`:
//!
//! - `uploads/2024/photo.jpg` → `exif/2024/photo.json`
//! - `photo.jpg` → `exif/photo.json`
//! - `a.b/c.tar.gz` → `exif/c.tar.json`
//!
//! ## Thumbnail variant
//!
//! Only the filename survives, extension included:
//!
//! - `a/b/photo.png` → `processed/resize/photo.png`

/// Root under which EXIF documents are written.
pub const EXIF_PREFIX: &str = "exif";

/// Root under which thumbnails are written.
pub const THUMBNAIL_PREFIX: &str = "processed/resize";

/// Split a key into its meaningful path segments.
pub fn segments(key: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    if key.starts_with('/') {
        parts.push("/");
    }
    parts.extend(
        key.split('/')
            .filter(|segment| !segment.is_empty() && *segment != "."),
    );
    parts
}

/// Final segment of a key, or the empty string if the key has none.
pub fn file_name(key: &str) -> &str {
    segments(key)
        .into_iter()
        .rev()
        .find(|segment| *segment != "/")
        .unwrap_or("")
}

/// Drop everything from the last `.` onwards. Names without a dot are kept whole.
fn strip_extension(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

/// Key of the EXIF JSON document for `source_key`.
pub fn exif_destination(source_key: &str) -> String {
    let parts = segments(source_key);
    let kept: Vec<&str> = if parts.len() > 1 {
        parts[1..].to_vec()
    } else {
        vec![file_name(source_key)]
    };

    let mut key = String::from(EXIF_PREFIX);
    if let Some((last, dirs)) = kept.split_last() {
        for dir in dirs {
            key.push('/');
            key.push_str(dir);
        }
        if !last.is_empty() {
            key.push('/');
            key.push_str(strip_extension(last));
        }
    }
    key.push_str(".json");
    key
}

/// Key of the thumbnail for `source_key`.
pub fn thumbnail_destination(source_key: &str) -> String {
    format!("{}/{}", THUMBNAIL_PREFIX, file_name(source_key))
}
